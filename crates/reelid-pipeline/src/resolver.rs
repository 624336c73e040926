//! Resolution of one record to its TMDB identifier.
//!
//! A primary search by title (plus release year when known) is tried first
//! and its top result accepted. Only when it returns nothing and the record
//! carries a year is the refiner asked for an alternative query, which is
//! then searched without a year. No failure here ever escapes: it is logged
//! and the record stays unresolved.
//!
//! Records in a batch resolve concurrently, so every log line names its
//! record.

use std::sync::Arc;

use reelid_core::{LogSink, MovieRecord};
use reelid_tmdb::{MovieResult, QueryRefiner, RefinementRequest, TmdbClient};

/// Which query produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchSource {
    Initial,
    Refined,
}

/// Per-record result of [`CatalogResolver::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// The record already carried an identifier; no request was made.
    AlreadyResolved { id: u64 },
    Found { id: u64, via: MatchSource },
    NotFound,
    /// A search failed after exhausting the retry policy.
    Failed { reason: String },
}

pub struct CatalogResolver {
    tmdb: TmdbClient,
    refiner: Option<Arc<dyn QueryRefiner>>,
}

impl CatalogResolver {
    #[must_use]
    pub fn new(tmdb: TmdbClient, refiner: Option<Arc<dyn QueryRefiner>>) -> Self {
        Self { tmdb, refiner }
    }

    #[must_use]
    pub fn has_refiner(&self) -> bool {
        self.refiner.is_some()
    }

    /// Resolves `record` in place.
    ///
    /// The identifier is written at most once; a record that already has one
    /// is returned untouched.
    pub async fn resolve(&self, record: &mut MovieRecord, log: &dyn LogSink) -> ResolutionOutcome {
        if let Some(id) = record.catalog_id() {
            return ResolutionOutcome::AlreadyResolved { id };
        }

        let name = record.display_name();
        log.append(format!("Searching for \"{name}\""));

        let initial = match self.tmdb.search_movie(&record.title, record.year, log).await {
            Ok(resp) => resp,
            Err(err) => return failed(&name, &err.to_string(), log),
        };

        if let Some(id) = initial.first_id() {
            if record.record_catalog_id(id) {
                log.append(format!("  > Found initial match: TMDB ID {id} for \"{name}\""));
                return ResolutionOutcome::Found {
                    id,
                    via: MatchSource::Initial,
                };
            }
            // Results came back but the top id is unusable (0). Refinement is
            // reserved for empty result sets, so stop here.
            log.append(format!("  > No usable TMDB ID in results for \"{name}\"."));
            return ResolutionOutcome::NotFound;
        }

        let Some(year) = record.year else {
            log.append(format!(
                "  > No TMDB match for \"{name}\" and no release year to refine with."
            ));
            return ResolutionOutcome::NotFound;
        };

        log.append(format!(
            "  > No initial TMDB match for \"{name}\". Trying with AI refinement."
        ));
        self.resolve_refined(record, &name, year, &initial.results, log)
            .await
    }

    async fn resolve_refined(
        &self,
        record: &mut MovieRecord,
        name: &str,
        year: u16,
        initial_results: &[MovieResult],
        log: &dyn LogSink,
    ) -> ResolutionOutcome {
        let Some(refiner) = self.refiner.as_deref() else {
            log.append(format!("  > AI refinement unavailable for \"{name}\"."));
            return ResolutionOutcome::NotFound;
        };

        let request = RefinementRequest {
            title: &record.title,
            year: Some(year),
            initial_results,
        };
        let refined = match refiner.refine(&request).await {
            Ok(query) => query,
            Err(err) => {
                tracing::warn!(title = %record.title, error = %err, "query refinement failed");
                log.append(format!("  > AI refinement failed for \"{name}\": {err}"));
                return ResolutionOutcome::NotFound;
            }
        };
        log.append(format!("  > AI refined query for \"{name}\" to: \"{refined}\""));

        let resp = match self.tmdb.search_movie(&refined, None, log).await {
            Ok(resp) => resp,
            Err(err) => return failed(name, &err.to_string(), log),
        };

        match resp.first_id() {
            Some(id) if record.record_catalog_id(id) => {
                log.append(format!(
                    "  > Found match with refined query for \"{name}\": TMDB ID {id}"
                ));
                ResolutionOutcome::Found {
                    id,
                    via: MatchSource::Refined,
                }
            }
            _ => {
                log.append(format!(
                    "  > No match found for \"{name}\" even with AI refinement."
                ));
                ResolutionOutcome::NotFound
            }
        }
    }
}

fn failed(name: &str, reason: &str, log: &dyn LogSink) -> ResolutionOutcome {
    tracing::warn!(title = name, error = reason, "catalog search failed");
    log.append(format!("  > Failed to get TMDB ID for \"{name}\": {reason}"));
    ResolutionOutcome::Failed {
        reason: reason.to_owned(),
    }
}
