//! Output module for progress reporting and crawl results
//!
//! This module handles:
//! - Progress observers (console table, tracing log)
//! - Writing flattened histories as CSV rows
//! - Exporting a single user's history as a JSON document
//! - Printing end-of-run summaries

mod csv;
mod json;
mod log;
pub mod stats;
mod table;
mod traits;

pub use self::csv::{format_row, RecordSink, ScrobbleCsvWriter, SCROBBLE_HEADER};
pub use self::json::{default_history_path, write_history_document, HistoryDocument};
pub use self::log::LogObserver;
pub use self::table::{format_elapsed, TableObserver};
pub use stats::{print_batch_summary, print_expansion_summary};
pub use traits::{
    BatchSummary, ExpansionSummary, NoopObserver, OutputError, OutputResult, ProgressObserver,
    RecordingObserver,
};

use std::io::IsTerminal;

/// Picks the progress observer for a run
///
/// A table on an interactive stdout, periodic log lines otherwise.
pub fn observer_for(label: &'static str, headers: &[&str]) -> Box<dyn ProgressObserver> {
    if std::io::stdout().is_terminal() {
        Box::new(TableObserver::stdout(headers))
    } else {
        Box::new(LogObserver::new(label, 25))
    }
}
