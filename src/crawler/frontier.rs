//! Breadth-first frontier for graph expansion
//!
//! This module handles:
//! - The FIFO queue of entities waiting to be expanded
//! - The visited set that keeps every entity from being queued twice
//! - Seeding from a previous run's exclusion set

use std::collections::{HashSet, VecDeque};

/// Work queue plus visited set driving a breadth-first crawl
///
/// Invariants:
/// - every queued entity is also in the visited set
/// - the visited set never shrinks
/// - an entity is queued at most once per frontier lifetime
#[derive(Debug, Clone, Default)]
pub struct Frontier {
    /// Entities pending expansion, oldest discovery first
    queue: VecDeque<String>,

    /// Entities that are queued, expanded, rejected or excluded
    visited: HashSet<String>,
}

impl Frontier {
    /// Creates a frontier from seed entities and an exclusion set
    ///
    /// The queue holds the seeds that are not excluded, in the order given.
    /// Excluded entities (already handled by an earlier run) and the queued
    /// seeds themselves start out visited, so neither is ever offered again.
    pub fn new<I, E>(seeds: I, excluded: E) -> Self
    where
        I: IntoIterator<Item = String>,
        E: IntoIterator<Item = String>,
    {
        let mut frontier = Self {
            queue: VecDeque::new(),
            visited: excluded.into_iter().collect(),
        };

        for seed in seeds {
            frontier.offer(seed);
        }

        frontier
    }

    /// Returns true while entities remain to be expanded
    pub fn has_work(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Pops the oldest queued entity
    pub fn next(&mut self) -> Option<String> {
        self.queue.pop_front()
    }

    /// Queues an entity unless it has been seen before
    ///
    /// Returns true for a new discovery, which the caller should persist.
    pub fn offer(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if self.visited.contains(&id) {
            return false;
        }
        self.visited.insert(id.clone());
        self.queue.push_back(id);
        true
    }

    /// Records an entity as seen without queueing it
    ///
    /// Returns true if the entity had not been seen before.
    pub fn mark_visited(&mut self, id: impl Into<String>) -> bool {
        self.visited.insert(id.into())
    }

    pub fn is_visited(&self, id: &str) -> bool {
        self.visited.contains(id)
    }

    /// Number of entities waiting to be expanded
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Number of entities ever seen
    pub fn visited_len(&self) -> usize {
        self.visited.len()
    }
}
