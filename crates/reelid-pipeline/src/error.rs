use reelid_core::CoreError;
use reelid_scraper::ScraperError;
use thiserror::Error;

/// Terminal failure of a pipeline run.
///
/// Per-record resolution failures never surface here; they are logged and
/// leave the record unresolved.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The username was missing or malformed; nothing was fetched.
    #[error("{0}")]
    Validation(#[from] CoreError),

    /// The first listing page returned 404.
    #[error("{0}")]
    NotFound(#[source] ScraperError),

    /// A listing page failed with a non-404 status or a transport error.
    #[error("{0}")]
    TransientFetch(#[source] ScraperError),

    /// The walk finished without a single well-formed record.
    #[error("{0}")]
    EmptyWatchlist(#[source] ScraperError),

    /// A client could not be built from the supplied configuration.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl PipelineError {
    /// `true` when the caller supplied bad input, as opposed to a failure
    /// while running.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<ScraperError> for PipelineError {
    fn from(err: ScraperError) -> Self {
        match err {
            ScraperError::WatchlistNotFound { .. } => Self::NotFound(err),
            ScraperError::EmptyWatchlist { .. } => Self::EmptyWatchlist(err),
            ScraperError::InvalidBaseUrl { .. } => Self::Configuration(err.to_string()),
            ScraperError::Http(_)
            | ScraperError::Network { .. }
            | ScraperError::UnexpectedStatus { .. } => Self::TransientFetch(err),
        }
    }
}
