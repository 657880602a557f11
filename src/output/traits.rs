//! Output traits and types
//!
//! This module defines the progress observer interface and the summary
//! values the crawl policies hand back when they finish.

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("Failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Receives periodic progress counters from a running crawl
///
/// Purely advisory: observers cannot fail the crawl or slow it down on
/// purpose, and the crawl never reads anything back from them.
pub trait ProgressObserver {
    /// Called after each entity and once more when the crawl ends
    ///
    /// # Arguments
    ///
    /// * `processed` - Entities handled so far
    /// * `produced` - Output units written so far (accepted users, scrobble rows)
    /// * `remaining` - Work items still pending
    fn report(&mut self, processed: u64, produced: u64, remaining: u64);

    /// Called once after the final report
    fn finish(&mut self) {}
}

/// Observer that ignores every report
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ProgressObserver for NoopObserver {
    fn report(&mut self, _processed: u64, _produced: u64, _remaining: u64) {}
}

/// Observer that keeps every report, in order
#[derive(Debug, Default, Clone)]
pub struct RecordingObserver {
    pub reports: Vec<(u64, u64, u64)>,
    pub finished: bool,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<(u64, u64, u64)> {
        self.reports.last().copied()
    }
}

impl ProgressObserver for RecordingObserver {
    fn report(&mut self, processed: u64, produced: u64, remaining: u64) {
        self.reports.push((processed, produced, remaining));
    }

    fn finish(&mut self) {
        self.finished = true;
    }
}

/// Outcome of a graph expansion crawl
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionSummary {
    /// Entities dequeued and expanded (successfully or not)
    pub processed: u64,

    /// Neighbors newly accepted and written to the acceptance sink
    pub accepted: u64,

    /// Neighbors seen for the first time and rejected
    pub rejected: u64,

    /// Entities whose neighbor list could not be fetched
    pub failed: u64,

    /// Entities still queued when the crawl stopped
    pub remaining: u64,

    /// Whether the crawl stopped because the accepted cap was reached
    pub cap_reached: bool,
}

/// Outcome of a batch history download
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Users whose history was written and cached
    pub users_done: u64,

    /// Users skipped because nothing could be fetched for them
    pub users_skipped: u64,

    /// Scrobble rows written
    pub records: u64,
}
