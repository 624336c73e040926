//! Single entry point for one watchlist conversion.

use std::sync::Arc;
use std::time::Duration;

use reelid_core::{validate_username, AppConfig, LogSink, MovieRecord, ResolutionLog};
use reelid_scraper::{PaginationSettings, WatchlistClient};
use reelid_tmdb::{LlmQueryRefiner, QueryRefiner, RetryPolicy, TmdbClient};
use serde::Serialize;

use crate::error::PipelineError;
use crate::orchestrator::{resolve_all, ResolutionSettings, ResolutionSummary};
use crate::resolver::CatalogResolver;

/// Successful run: every extracted record, resolved or not, plus the log.
#[derive(Debug, Clone, Serialize)]
pub struct WatchlistConversion {
    /// Records in listing order; never empty.
    pub movies: Vec<MovieRecord>,
    pub resolved_count: usize,
    pub pages_requested: u32,
    #[serde(skip)]
    pub summary: ResolutionSummary,
    pub logs: Vec<String>,
}

impl WatchlistConversion {
    /// Identifiers of the resolved records, in listing order.
    #[must_use]
    pub fn catalog_ids(&self) -> Vec<u64> {
        self.movies.iter().filter_map(MovieRecord::catalog_id).collect()
    }
}

/// Failed run: the terminal error and every log line written before it.
#[derive(Debug)]
pub struct PipelineFailure {
    pub error: PipelineError,
    pub logs: Vec<String>,
}

pub type PipelineResult = Result<WatchlistConversion, PipelineFailure>;

/// Listing scraper and catalog resolver wired together.
///
/// Holds no per-run state; one instance serves concurrent runs.
pub struct WatchlistPipeline {
    scraper: WatchlistClient,
    resolver: CatalogResolver,
    settings: ResolutionSettings,
}

impl WatchlistPipeline {
    #[must_use]
    pub fn new(
        scraper: WatchlistClient,
        resolver: CatalogResolver,
        settings: ResolutionSettings,
    ) -> Self {
        Self {
            scraper,
            resolver,
            settings,
        }
    }

    /// Builds every client from `config`.
    ///
    /// The refiner is optional: without an API key, titles the primary search
    /// misses simply stay unresolved.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Configuration`] if a base URL is invalid or an
    /// HTTP client cannot be constructed.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, PipelineError> {
        let scraper = WatchlistClient::with_base_url(
            &config.listing_base_url,
            config.request_timeout_secs,
            &config.scraper_user_agent,
            PaginationSettings {
                max_pages: config.max_pages,
                page_delay_ms: config.page_delay_ms,
            },
        )
        .map_err(|e| PipelineError::Configuration(e.to_string()))?;

        let tmdb = TmdbClient::with_base_url(
            &config.tmdb_api_key,
            config.request_timeout_secs,
            &config.tmdb_base_url,
            RetryPolicy::new(
                config.tmdb_max_attempts,
                Duration::from_millis(config.tmdb_retry_delay_ms),
            ),
        )
        .map_err(|e| PipelineError::Configuration(e.to_string()))?;

        let refiner: Option<Arc<dyn QueryRefiner>> = match config.refiner_api_key.as_deref() {
            Some(key) => {
                let llm = LlmQueryRefiner::new(
                    key,
                    &config.refiner_base_url,
                    &config.refiner_model,
                    config.request_timeout_secs,
                )
                .map_err(|e| PipelineError::Configuration(e.to_string()))?;
                tracing::info!(model = llm.model(), "query refinement enabled");
                let refiner: Arc<dyn QueryRefiner> = Arc::new(llm);
                Some(refiner)
            }
            None => {
                tracing::warn!("no refiner API key configured; query refinement disabled");
                None
            }
        };

        Ok(Self::new(
            scraper,
            CatalogResolver::new(tmdb, refiner),
            ResolutionSettings {
                batch_size: config.resolve_batch_size,
                batch_pause_ms: config.batch_pause_ms,
            },
        ))
    }

    /// Converts `username`'s watchlist into catalog identifiers.
    ///
    /// Partial resolution is success: records the catalog could not match
    /// are returned without an identifier.
    ///
    /// # Errors
    ///
    /// Returns a [`PipelineFailure`] carrying the log so far when the
    /// username is invalid, the watchlist is missing or private, a listing
    /// page fails, or no records could be extracted.
    pub async fn run(&self, username: &str) -> PipelineResult {
        let log = ResolutionLog::new();

        let username = match validate_username(username) {
            Ok(username) => username,
            Err(err) => {
                log.append(format!("Error: {err}"));
                return Err(fail(err.into(), &log));
            }
        };

        log.append(format!("Starting conversion for user: {username}"));

        let scrape = match self.scraper.fetch_watchlist(username, &log).await {
            Ok(scrape) => scrape,
            Err(err) => return Err(fail(err.into(), &log)),
        };
        let mut movies = scrape.records;

        log.append(format!(
            "Found a total of {} movies. Now fetching TMDB IDs...",
            movies.len()
        ));
        let summary = resolve_all(&self.resolver, &mut movies, self.settings, &log).await;

        let resolved_count = movies.iter().filter(|m| m.is_resolved()).count();
        log.append(format!(
            "Resolved {resolved_count} of {} movies to TMDB IDs.",
            movies.len()
        ));
        log.append("Conversion complete!".to_owned());

        tracing::info!(
            username,
            movies = movies.len(),
            resolved_count,
            refinement = self.resolver.has_refiner(),
            pages = scrape.pages_requested,
            "watchlist conversion finished"
        );

        Ok(WatchlistConversion {
            movies,
            resolved_count,
            pages_requested: scrape.pages_requested,
            summary,
            logs: log.rendered(),
        })
    }
}

/// The failing component has already logged the error itself.
fn fail(error: PipelineError, log: &ResolutionLog) -> PipelineFailure {
    tracing::warn!(error = %error, "watchlist conversion failed");
    PipelineFailure {
        error,
        logs: log.rendered(),
    }
}
