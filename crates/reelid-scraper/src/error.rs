use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to fetch Letterboxd page {page}. Check your network connection.")]
    Network {
        page: u32,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to fetch Letterboxd watchlist. Status: {status}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("User not found or watchlist is private.")]
    WatchlistNotFound { username: String },

    #[error("Watchlist is empty or no movies could be parsed.")]
    EmptyWatchlist { username: String },

    #[error("invalid listing base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}
