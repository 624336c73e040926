//! HTTP client for the TMDB movie search endpoint.
//!
//! Every request goes through [`RetryingClient`], so rate limiting, error
//! statuses, and transport failures are retried uniformly. The API key is
//! sent as a query parameter and never appears in logs or error messages.

use std::time::Duration;

use reelid_core::LogSink;
use reqwest::{Client, Url};

use crate::error::TmdbError;
use crate::retry::{RetryPolicy, RetryingClient};
use crate::types::SearchResponse;

const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3/";

/// Client for TMDB `search/movie`.
///
/// Use [`TmdbClient::new`] for production or [`TmdbClient::with_base_url`]
/// to point at a mock server in tests.
#[derive(Clone)]
pub struct TmdbClient {
    http: RetryingClient,
    api_key: String,
    base_url: Url,
}

impl std::fmt::Debug for TmdbClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TmdbClient")
            .field("api_key", &"[redacted]")
            .field("base_url", &self.base_url.as_str())
            .field("policy", self.http.policy())
            .finish_non_exhaustive()
    }
}

impl TmdbClient {
    /// Creates a client pointed at the production TMDB API.
    ///
    /// # Errors
    ///
    /// Returns [`TmdbError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64, policy: RetryPolicy) -> Result<Self, TmdbError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL, policy)
    }

    /// Creates a client with a custom base URL.
    ///
    /// # Errors
    ///
    /// Returns [`TmdbError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`TmdbError::InvalidBaseUrl`] if `base_url`
    /// does not parse.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
        policy: RetryPolicy,
    ) -> Result<Self, TmdbError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("reelid/", env!("CARGO_PKG_VERSION")))
            .build()?;

        // A trailing slash keeps `join` from replacing the last path segment
        // (`/3` must survive as `/3/search/movie`).
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| TmdbError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(TmdbError::InvalidBaseUrl {
                base_url: base_url.to_owned(),
                reason: "URL cannot be used as a base".to_owned(),
            });
        }

        Ok(Self {
            http: RetryingClient::new(client, policy),
            api_key: api_key.to_owned(),
            base_url: parsed,
        })
    }

    #[must_use]
    pub fn policy(&self) -> &RetryPolicy {
        self.http.policy()
    }

    /// Searches the catalog for `query`, optionally narrowed to a primary
    /// release year.
    ///
    /// An empty `results` list is a normal "no match" answer, not an error.
    ///
    /// # Errors
    ///
    /// - [`TmdbError::RetriesExhausted`] when every attempt failed.
    /// - [`TmdbError::Deserialize`] if a 2xx body is not a search payload.
    pub async fn search_movie(
        &self,
        query: &str,
        year: Option<u16>,
        log: &dyn LogSink,
    ) -> Result<SearchResponse, TmdbError> {
        let url = self.search_url(query, year)?;
        let context = match year {
            Some(year) => format!("TMDB search for \"{query}\" ({year})"),
            None => format!("TMDB search for \"{query}\""),
        };

        let body = self.http.get_text(&url, &context, log).await?;
        let response: SearchResponse =
            serde_json::from_str(&body).map_err(|source| TmdbError::Deserialize { context, source })?;

        tracing::debug!(
            query,
            year,
            results = response.results.len(),
            "TMDB search completed"
        );
        Ok(response)
    }

    /// `{base}/search/movie?api_key=…&query=…[&primary_release_year=…]`
    fn search_url(&self, query: &str, year: Option<u16>) -> Result<Url, TmdbError> {
        let mut url = self
            .base_url
            .join("search/movie")
            .map_err(|e| TmdbError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("api_key", &self.api_key);
            pairs.append_pair("query", query);
            if let Some(year) = year {
                pairs.append_pair("primary_release_year", &year.to_string());
            }
        }
        Ok(url)
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
