//! End-of-run summaries for the operator

use crate::output::traits::{BatchSummary, ExpansionSummary};

/// Formats a graph crawl summary
///
/// # Arguments
///
/// * `summary` - Counters returned by the crawl
/// * `criterion` - Human-readable accept rule, e.g. `country == Finland`
pub fn format_expansion_summary(summary: &ExpansionSummary, criterion: &str) -> String {
    let mut text = String::new();

    text.push_str(&format!(
        "Found {} people with {}\n",
        summary.accepted, criterion
    ));
    text.push_str(&format!(
        "Found {} people where not {}\n",
        summary.rejected, criterion
    ));
    text.push_str(&format!(
        "Expanded {} people ({} failed), {} still queued\n",
        summary.processed, summary.failed, summary.remaining
    ));
    if summary.cap_reached {
        text.push_str("Stopped early: accepted cap reached\n");
    }

    text
}

/// Formats a batch history summary
pub fn format_batch_summary(summary: &BatchSummary) -> String {
    format!(
        "Wrote {} scrobbles for {} users ({} users skipped)\n",
        summary.records, summary.users_done, summary.users_skipped
    )
}

/// Prints a graph crawl summary to stdout
pub fn print_expansion_summary(summary: &ExpansionSummary, criterion: &str) {
    print!("{}", format_expansion_summary(summary, criterion));
}

/// Prints a batch history summary to stdout
pub fn print_batch_summary(summary: &BatchSummary) {
    print!("{}", format_batch_summary(summary));
}
