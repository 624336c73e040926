//! Page-by-page watchlist walk.
//!
//! Pages are fetched strictly in sequence starting at 1. The walk ends when a
//! page yields no records, when a page after the first returns 404, or when
//! the configured page ceiling is reached. A 404 on page 1, any other
//! non-success status, and transport failures end the walk with an error.

use std::time::Duration;

use reelid_core::{LogSink, MovieRecord};

use crate::client::{PageFetch, WatchlistClient};
use crate::error::ScraperError;
use crate::parse::extract_records;

/// Limits for one watchlist walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationSettings {
    /// Highest page number that will ever be requested.
    pub max_pages: u32,
    /// Flat pause before every page request after the first.
    pub page_delay_ms: u64,
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self {
            max_pages: 50,
            page_delay_ms: 100,
        }
    }
}

/// Why a successful walk stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationStop {
    /// `page` returned no usable records.
    EmptyPage { page: u32 },
    /// `page` (never the first) returned 404.
    NotFound { page: u32 },
    /// Every page up to the ceiling was consumed.
    MaxPages { max_pages: u32 },
}

/// Result of a complete watchlist walk.
#[derive(Debug, Clone)]
pub struct WatchlistScrape {
    /// All records in listing order; never empty.
    pub records: Vec<MovieRecord>,
    pub pages_requested: u32,
    pub unparsable: usize,
    pub stop: PaginationStop,
}

impl WatchlistClient {
    /// Walks a user's watchlist and returns every well-formed entry.
    ///
    /// Progress is appended to `log` as it happens, including the reason for
    /// any failure.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::WatchlistNotFound`]: page 1 returned 404.
    /// - [`ScraperError::UnexpectedStatus`]: any page returned a non-404 error status.
    /// - [`ScraperError::Network`]: transport failure on any page.
    /// - [`ScraperError::EmptyWatchlist`]: the walk ended without a single record.
    pub async fn fetch_watchlist(
        &self,
        username: &str,
        log: &dyn LogSink,
    ) -> Result<WatchlistScrape, ScraperError> {
        let PaginationSettings {
            max_pages,
            page_delay_ms,
        } = self.settings;

        let mut records: Vec<MovieRecord> = Vec::new();
        let mut unparsable = 0usize;
        let mut pages_requested = 0u32;
        let mut page = 1u32;

        log.append("Fetching watchlist from Letterboxd...".to_owned());

        let stop = loop {
            if page > max_pages {
                log.append(format!(
                    "Reached the {max_pages}-page limit. Ending scrape."
                ));
                break PaginationStop::MaxPages { max_pages };
            }

            if page > 1 && page_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(page_delay_ms)).await;
            }

            let url = self.page_url(username, page);
            log.append(format!("Fetching page {page}: {url}"));
            pages_requested += 1;

            let markup = match self.get_page(page, url.clone()).await {
                Ok(PageFetch::Ok(markup)) => markup,
                Ok(PageFetch::NotFound) if page == 1 => {
                    let err = ScraperError::WatchlistNotFound {
                        username: username.to_owned(),
                    };
                    log.append(format!("Error: {err}"));
                    return Err(err);
                }
                Ok(PageFetch::NotFound) => {
                    log.append("No more pages found. Ending scrape.".to_owned());
                    break PaginationStop::NotFound { page };
                }
                Ok(PageFetch::Error { status }) => {
                    let err = ScraperError::UnexpectedStatus {
                        status,
                        url: url.to_string(),
                    };
                    log.append(format!("Error: {err}"));
                    return Err(err);
                }
                Err(err) => {
                    log.append(format!("Error: {err}"));
                    return Err(err);
                }
            };

            let parsed = extract_records(&markup, &self.base_url);
            unparsable += parsed.unparsable;

            if parsed.is_empty() {
                log.append("No more movies found on this page. Ending scrape.".to_owned());
                break PaginationStop::EmptyPage { page };
            }

            log.append(format!(
                "Found {} movies on page {page}. Parsing...",
                parsed.records.len()
            ));
            for record in parsed.records {
                let record = MovieRecord::from(record);
                log.append(format!("  -> Found: {}", quoted_display(&record)));
                records.push(record);
            }

            page += 1;
        };

        tracing::info!(
            username,
            pages_requested,
            records = records.len(),
            unparsable,
            ?stop,
            "watchlist scrape finished"
        );

        if records.is_empty() {
            let err = ScraperError::EmptyWatchlist {
                username: username.to_owned(),
            };
            log.append(format!("Warning: {err}"));
            return Err(err);
        }

        if unparsable > 0 {
            log.append(format!("Skipped {unparsable} unparsable watchlist items."));
        }

        Ok(WatchlistScrape {
            records,
            pages_requested,
            unparsable,
            stop,
        })
    }
}

/// `"Title" (Year)` as shown in progress logs.
fn quoted_display(record: &MovieRecord) -> String {
    match record.year {
        Some(year) => format!("\"{}\" ({year})", record.title),
        None => format!("\"{}\"", record.title),
    }
}
