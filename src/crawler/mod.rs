//! Crawler module for the paginated API crawl engine
//!
//! This module contains the core crawling logic, including:
//! - A rate-limited HTTP client with failure classification
//! - Defensive JSON path lookups
//! - Pagination across a collection's pages
//! - The breadth-first frontier
//! - The graph expansion and linear history policies

mod accept;
mod client;
mod frontier;
mod graph;
mod history;
mod json_path;
mod paginate;

pub use accept::{AcceptPredicate, FieldEquals};
pub use client::{
    build_http_client, ApiRequest, JsonSource, RateLimitedClient, APP_USER_AGENT, RESERVED_PARAMS,
};
pub use frontier::Frontier;
pub use graph::{ExpansionSinks, GraphExpansion, NeighborOutcome, FRIENDS_METHOD};
pub use history::{
    pending_users, project_scrobble, HistoryBatch, LinearHistory, Scrobble, HISTORY_METHOD,
};
pub use json_path::{JsonPath, Segment};
pub use paginate::{extract_items, fetch_all, PageCollection, Pagination};

use crate::config::Config;
use crate::output::{
    write_history_document, BatchSummary, ExpansionSummary, ProgressObserver, ScrobbleCsvWriter,
};
use crate::storage::{read_line_set, read_lines, FileLineSink, ResumeState};
use crate::CrawlError;
use std::path::Path;

/// Runs a resumable friend-graph crawl with file-backed sinks
///
/// This is the main entry point for discovering users. It will:
/// 1. Load accepted and expanded entities from a previous run
/// 2. Build the frontier from the fresh seeds plus pending accepted entities
/// 3. Expand breadth-first until the frontier empties or the cap is hit
///
/// # Arguments
///
/// * `config` - The validated configuration
/// * `seeds` - Entities to start from
/// * `observer` - Receives progress counters
///
/// # Returns
///
/// * `Ok(ExpansionSummary)` - Crawl finished
/// * `Err(CrawlError)` - Startup failed or a sink could not be written
pub async fn crawl_users(
    config: &Config,
    seeds: &[String],
    observer: &mut dyn ProgressObserver,
) -> Result<ExpansionSummary, CrawlError> {
    if seeds.is_empty() {
        return Err(CrawlError::Seed(
            "either a seed name or a seed file is required".to_string(),
        ));
    }

    let accepted_path = Path::new(&config.output.names_path);
    let expanded_path = Path::new(&config.output.expanded_path);

    let resume = ResumeState::load(accepted_path, expanded_path)?;
    if !resume.expanded.is_empty() {
        tracing::info!(
            "Resuming: {} already expanded, {} accepted awaiting expansion",
            resume.expanded.len(),
            resume.pending()
        );
    }

    let mut frontier = Frontier::new(resume.seeds_with(seeds), resume.expanded.iter().cloned());
    tracing::info!("Frontier seeded with {} entities", frontier.queue_len());

    let mut accepted = FileLineSink::open(accepted_path)?;
    let mut expanded = FileLineSink::open(expanded_path)?;
    let mut client = RateLimitedClient::new(&config.api)?;

    let policy = GraphExpansion::new(
        FieldEquals::new(
            config.crawler.accept_field.as_str(),
            config.crawler.accept_value.as_str(),
        ),
        config.crawler.max_accepted,
    )
    .with_prior_accepted(resume.accepted.len() as u64);

    policy
        .run(
            &mut client,
            &mut frontier,
            ExpansionSinks {
                accepted: &mut accepted,
                expanded: &mut expanded,
            },
            observer,
        )
        .await
}

/// Downloads the histories of every user in a names file
///
/// Users listed in the done cache are skipped; each finished user is
/// appended to it, so an interrupted batch picks up where it stopped.
///
/// # Arguments
///
/// * `config` - The validated configuration
/// * `users_path` - File with one user name per line
/// * `observer` - Receives `(users done, rows written, users remaining)`
pub async fn crawl_histories(
    config: &Config,
    users_path: &Path,
    observer: &mut dyn ProgressObserver,
) -> Result<BatchSummary, CrawlError> {
    let users = read_lines(users_path)?;
    let done_path = Path::new(&config.output.done_path);
    let done_set = read_line_set(done_path)?;

    let pending = pending_users(users, &done_set);
    tracing::info!(
        "{} users pending ({} already done)",
        pending.len(),
        done_set.len()
    );

    let mut records = ScrobbleCsvWriter::open(Path::new(&config.output.scrobbles_path))?;
    let mut done = FileLineSink::open(done_path)?;
    let mut client = RateLimitedClient::new(&config.api)?;

    HistoryBatch::new(LinearHistory::from_config(&config.crawler))
        .run(&mut client, &pending, &mut records, &mut done, observer)
        .await
}

/// Exports one user's complete raw history as a JSON document
///
/// # Returns
///
/// * `Ok(usize)` - Number of history items written
/// * `Err(CrawlError)` - Nothing could be fetched, or the file could not be written
pub async fn export_history(config: &Config, user: &str, output: &Path) -> Result<usize, CrawlError> {
    let mut client = RateLimitedClient::new(&config.api)?;
    let history = LinearHistory::from_config(&config.crawler);

    let collection = match history.fetch_raw(&mut client, user).await {
        Ok(collection) => collection,
        Err(failure) => {
            tracing::error!("No tracks found for {}, check the user name ({})", user, failure);
            return Err(CrawlError::EmptyHistory {
                user: user.to_string(),
            });
        }
    };

    write_history_document(output, user, &collection.items)?;
    Ok(collection.items.len())
}
