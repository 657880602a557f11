//! Graph expansion - breadth-first crawl of the friend graph
//!
//! This module contains the main crawl loop for discovering users:
//! - Taking the next user from the frontier
//! - Fetching the user's complete friend list across pages
//! - Classifying each friend with the accept predicate
//! - Persisting accepted friends and expanded users as they happen
//! - Stopping when the frontier is empty or the accepted cap is hit

use crate::crawler::accept::AcceptPredicate;
use crate::crawler::client::{ApiRequest, JsonSource};
use crate::crawler::frontier::Frontier;
use crate::crawler::json_path::JsonPath;
use crate::crawler::paginate::{fetch_all, Pagination};
use crate::output::{ExpansionSummary, ProgressObserver};
use crate::storage::{check_line, LineSink};
use crate::CrawlError;
use serde_json::Value;

/// API operation listing a user's friends
pub const FRIENDS_METHOD: &str = "user.getfriends";

/// Where each discovered user goes once it has been seen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NeighborOutcome {
    /// New and accepted: written and queued
    Accepted,
    /// New and rejected: remembered, never expanded
    Rejected,
    /// Already visited, or without an identifier
    Ignored,
}

/// Sinks a graph crawl writes to
pub struct ExpansionSinks<'a> {
    /// Newly accepted entities
    pub accepted: &'a mut dyn LineSink,

    /// Entities whose expansion was attempted
    pub expanded: &'a mut dyn LineSink,
}

/// Breadth-first expansion policy
pub struct GraphExpansion<P> {
    predicate: P,
    max_accepted: u64,
    prior_accepted: u64,
    method: String,
    pagination: Pagination,
    id_path: JsonPath,
}

impl<P: AcceptPredicate> GraphExpansion<P> {
    /// Creates a friend-graph expansion
    ///
    /// # Arguments
    ///
    /// * `predicate` - Decides which friends are kept
    /// * `max_accepted` - Hard cap on accepted entities over the crawl's lifetime
    pub fn new(predicate: P, max_accepted: u64) -> Self {
        Self {
            predicate,
            max_accepted,
            prior_accepted: 0,
            method: FRIENDS_METHOD.to_string(),
            pagination: Pagination::new("friends.user", "friends.@attr.totalPages"),
            id_path: JsonPath::parse("name"),
        }
    }

    /// Counts entities accepted by earlier runs toward the cap
    pub fn with_prior_accepted(mut self, prior_accepted: u64) -> Self {
        self.prior_accepted = prior_accepted;
        self
    }

    /// Uses a different neighbor-listing operation and response layout
    pub fn with_endpoint(mut self, method: &str, pagination: Pagination, id_path: JsonPath) -> Self {
        self.method = method.to_string();
        self.pagination = pagination;
        self.id_path = id_path;
        self
    }

    /// Runs the crawl until the frontier is empty or the cap is reached
    ///
    /// The cap is checked before each dequeue: the page being processed when
    /// the cap is crossed is finished, but no new entity is started.
    ///
    /// # Returns
    ///
    /// * `Ok(ExpansionSummary)` - Counters for the run
    /// * `Err(CrawlError)` - A sink could not be written
    pub async fn run<S>(
        &self,
        source: &mut S,
        frontier: &mut Frontier,
        sinks: ExpansionSinks<'_>,
        observer: &mut dyn ProgressObserver,
    ) -> Result<ExpansionSummary, CrawlError>
    where
        S: JsonSource + ?Sized,
    {
        let mut summary = ExpansionSummary::default();

        loop {
            if self.prior_accepted + summary.accepted >= self.max_accepted {
                tracing::info!(
                    "Accepted cap of {} reached ({} from earlier runs) with {} entities still queued",
                    self.max_accepted,
                    self.prior_accepted,
                    frontier.queue_len()
                );
                summary.cap_reached = true;
                break;
            }

            let entity = match frontier.next() {
                Some(entity) => entity,
                None => {
                    tracing::info!("Frontier is empty, crawl complete");
                    break;
                }
            };

            summary.processed += 1;
            tracing::debug!("Expanding {}", entity);

            let template = ApiRequest::new(&self.method).user(&entity);
            match fetch_all(source, &template, &self.pagination).await {
                Ok(collection) => {
                    for neighbor in &collection.items {
                        match self.classify(neighbor, frontier, sinks.accepted)? {
                            NeighborOutcome::Accepted => summary.accepted += 1,
                            NeighborOutcome::Rejected => summary.rejected += 1,
                            NeighborOutcome::Ignored => {}
                        }
                    }
                }
                Err(failure) => {
                    tracing::warn!("Skipping {}: {}", entity, failure);
                    summary.failed += 1;
                }
            }

            sinks.expanded.append(&entity)?;
            observer.report(summary.processed, summary.accepted, frontier.queue_len() as u64);
        }

        summary.remaining = frontier.queue_len() as u64;
        observer.report(summary.processed, summary.accepted, summary.remaining);
        observer.finish();

        Ok(summary)
    }

    /// Applies the accept predicate to one neighbor and updates the frontier
    fn classify(
        &self,
        neighbor: &Value,
        frontier: &mut Frontier,
        accepted_sink: &mut dyn LineSink,
    ) -> Result<NeighborOutcome, CrawlError> {
        let id = match self.id_path.lookup_string(neighbor) {
            Some(id) if !id.is_empty() => id,
            _ => return Ok(NeighborOutcome::Ignored),
        };

        if let Err(e) = check_line(&id) {
            tracing::warn!("Ignoring neighbor with unusable name: {}", e);
            return Ok(NeighborOutcome::Ignored);
        }

        if frontier.is_visited(&id) {
            return Ok(NeighborOutcome::Ignored);
        }

        if self.predicate.accepts(neighbor) {
            accepted_sink.append(&id)?;
            frontier.offer(id);
            Ok(NeighborOutcome::Accepted)
        } else {
            frontier.mark_visited(id);
            Ok(NeighborOutcome::Rejected)
        }
    }
}
