//! TMDB movie search with a shared retry/backoff policy, plus the
//! query-refinement capability used when a search comes back empty.

pub mod client;
pub mod error;
pub mod refine;
pub mod retry;
pub mod types;

pub use client::TmdbClient;
pub use error::TmdbError;
pub use refine::{LlmQueryRefiner, QueryRefiner, RefinementError, RefinementRequest};
pub use retry::{RetryPolicy, RetryingClient};
pub use types::{MovieResult, SearchResponse};
