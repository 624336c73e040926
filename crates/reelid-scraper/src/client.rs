use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::ScraperError;
use crate::pagination::PaginationSettings;

const DEFAULT_BASE_URL: &str = "https://letterboxd.com/";

/// Outcome of one listing-page request.
///
/// `NotFound` is kept apart from other statuses because the pagination driver
/// reads it differently on the first page than on later ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageFetch {
    Ok(String),
    NotFound,
    Error { status: u16 },
}

/// HTTP client for public Letterboxd watchlist pages.
///
/// Sends browser-like headers (the configured `User-Agent` plus `Accept` and
/// `Accept-Language`) and never retries; a failed page fetch is reported once.
pub struct WatchlistClient {
    pub(crate) client: Client,
    pub(crate) base_url: Url,
    pub(crate) settings: PaginationSettings,
}

impl WatchlistClient {
    /// Creates a client pointed at the production listing site.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        settings: PaginationSettings,
    ) -> Result<Self, ScraperError> {
        Self::with_base_url(DEFAULT_BASE_URL, timeout_secs, user_agent, settings)
    }

    /// Creates a client with a custom listing origin (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`ScraperError::InvalidBaseUrl`] if `base_url` cannot serve as a base.
    pub fn with_base_url(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
        settings: PaginationSettings,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash so relative film links resolve against
        // the site root.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| ScraperError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ScraperError::InvalidBaseUrl {
                base_url: normalised,
                reason: "URL cannot be used as a base".to_owned(),
            });
        }

        Ok(Self {
            client,
            base_url,
            settings,
        })
    }

    #[must_use]
    pub fn settings(&self) -> PaginationSettings {
        self.settings
    }

    /// Fetches one watchlist page as raw markup.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Network`] if the request fails at the transport
    /// level. HTTP statuses are reported through [`PageFetch`], not as errors.
    pub async fn fetch_page(&self, username: &str, page: u32) -> Result<PageFetch, ScraperError> {
        let url = self.page_url(username, page);
        self.get_page(page, url).await
    }

    pub(crate) async fn get_page(&self, page: u32, url: Url) -> Result<PageFetch, ScraperError> {
        let network = |source| ScraperError::Network { page, source };

        let response = self
            .client
            .get(url)
            .header(
                reqwest::header::ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .send()
            .await
            .map_err(network)?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(PageFetch::NotFound);
        }

        if !status.is_success() {
            tracing::warn!(page, status = status.as_u16(), "listing page fetch failed");
            return Ok(PageFetch::Error {
                status: status.as_u16(),
            });
        }

        let markup = response.text().await.map_err(network)?;
        Ok(PageFetch::Ok(markup))
    }

    /// Builds `{base}/{username}/watchlist/page/{page}/`, percent-encoding the
    /// username as a single path segment.
    pub(crate) fn page_url(&self, username: &str, page: u32) -> Url {
        let mut url = self.base_url.clone();
        let page = page.to_string();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend([username, "watchlist", "page", page.as_str(), ""]);
        }
        url
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
