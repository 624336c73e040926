//! Batched, concurrent resolution of a whole record set.
//!
//! Records are split into fixed-size batches in discovery order. Each batch
//! is resolved concurrently with `join_all` on the current task, so every
//! future holds a disjoint `&mut` into the slice and no record is shared.
//! Batches run one after another with a fixed pause between them.

use std::time::Duration;

use futures::future::join_all;
use reelid_core::{LogSink, MovieRecord};

use crate::resolver::{CatalogResolver, MatchSource, ResolutionOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolutionSettings {
    /// Records resolved concurrently per batch.
    pub batch_size: usize,
    /// Pause between consecutive batches (never before the first).
    pub batch_pause_ms: u64,
}

impl Default for ResolutionSettings {
    fn default() -> Self {
        Self {
            batch_size: 10,
            batch_pause_ms: 500,
        }
    }
}

/// Tally of per-record outcomes from [`resolve_all`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolutionSummary {
    pub batches: usize,
    /// Records resolved during this call, by either query.
    pub resolved: usize,
    /// Subset of `resolved` that needed the refined query.
    pub refined: usize,
    pub already_resolved: usize,
    pub not_found: usize,
    pub failed: usize,
}

impl ResolutionSummary {
    fn record(&mut self, outcome: &ResolutionOutcome) {
        match outcome {
            ResolutionOutcome::AlreadyResolved { .. } => self.already_resolved += 1,
            ResolutionOutcome::Found { via, .. } => {
                self.resolved += 1;
                if *via == MatchSource::Refined {
                    self.refined += 1;
                }
            }
            ResolutionOutcome::NotFound => self.not_found += 1,
            ResolutionOutcome::Failed { .. } => self.failed += 1,
        }
    }
}

/// Resolves every record in `records`, mutating them in place.
///
/// Never fails: per-record errors are counted in the summary and logged by
/// the resolver.
pub async fn resolve_all(
    resolver: &CatalogResolver,
    records: &mut [MovieRecord],
    settings: ResolutionSettings,
    log: &dyn LogSink,
) -> ResolutionSummary {
    let batch_size = settings.batch_size.max(1);
    let total_batches = records.len().div_ceil(batch_size);
    let mut summary = ResolutionSummary::default();

    for (index, batch) in records.chunks_mut(batch_size).enumerate() {
        if index > 0 && settings.batch_pause_ms > 0 {
            tokio::time::sleep(Duration::from_millis(settings.batch_pause_ms)).await;
        }

        tracing::debug!(
            batch = index + 1,
            total_batches,
            size = batch.len(),
            "resolving batch"
        );

        let outcomes = join_all(batch.iter_mut().map(|record| resolver.resolve(record, log))).await;
        for outcome in &outcomes {
            summary.record(outcome);
        }
        summary.batches += 1;
    }

    tracing::info!(
        records = records.len(),
        batches = summary.batches,
        resolved = summary.resolved,
        refined = summary.refined,
        not_found = summary.not_found,
        failed = summary.failed,
        "catalog resolution finished"
    );

    summary
}
