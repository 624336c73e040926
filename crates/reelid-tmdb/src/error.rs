use thiserror::Error;

/// Errors returned by the TMDB search client.
#[derive(Debug, Error)]
pub enum TmdbError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// HTTP 429. `retry_after_ms` is the server's `Retry-After`, if it sent one.
    #[error("rate limited by TMDB")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("unexpected HTTP status {status}")]
    UnexpectedStatus { status: u16 },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// Every attempt allowed by the retry policy failed.
    #[error("Failed to fetch {context} after {attempts} attempts: {last}")]
    RetriesExhausted {
        context: String,
        attempts: u32,
        #[source]
        last: Box<TmdbError>,
    },

    #[error("invalid TMDB base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}
