//! Append-only, user-facing progress log for one pipeline run.
//!
//! Components receive a `&dyn LogSink` from the caller that owns the run and
//! never hold on to it past their own call. Every entry is mirrored into
//! `tracing` at `info` level so operators see the same narrative.

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};

/// Capability to append one human-readable progress message.
pub trait LogSink: Send + Sync {
    fn append(&self, message: String);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub at: DateTime<Utc>,
    pub message: String,
}

impl LogEntry {
    /// Renders as `HH:MM:SS: message`.
    #[must_use]
    pub fn render(&self) -> String {
        format!("{}: {}", self.at.format("%H:%M:%S"), self.message)
    }
}

/// In-memory [`LogSink`] shared by every component of one run.
#[derive(Debug, Default)]
pub struct ResolutionLog {
    entries: Mutex<Vec<LogEntry>>,
}

impl ResolutionLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Snapshot of all entries in append order.
    #[must_use]
    pub fn entries(&self) -> Vec<LogEntry> {
        self.lock().clone()
    }

    /// Snapshot of all entries rendered as timestamped strings.
    #[must_use]
    pub fn rendered(&self) -> Vec<String> {
        self.lock().iter().map(LogEntry::render).collect()
    }

    /// Returns `true` if any message contains `needle`.
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.lock().iter().any(|e| e.message.contains(needle))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<LogEntry>> {
        // A panic while holding the guard cannot leave a half-pushed entry.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LogSink for ResolutionLog {
    fn append(&self, message: String) {
        tracing::info!(target: "reelid::run", "{message}");
        self.lock().push(LogEntry {
            at: Utc::now(),
            message,
        });
    }
}
