//! Watchlist ingestion and catalog-identity resolution.
//!
//! [`WatchlistPipeline::run`] walks a user's listing pages, then resolves
//! every record to a TMDB identifier in fixed-size concurrent batches,
//! falling back to query refinement for dated titles with no initial match.

pub mod error;
pub mod orchestrator;
pub mod pipeline;
pub mod resolver;

pub use error::PipelineError;
pub use orchestrator::{resolve_all, ResolutionSettings, ResolutionSummary};
pub use pipeline::{PipelineFailure, PipelineResult, WatchlistConversion, WatchlistPipeline};
pub use resolver::{CatalogResolver, MatchSource, ResolutionOutcome};
