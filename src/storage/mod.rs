//! Storage module for persisting crawl progress
//!
//! This module handles the append-only sinks the crawler writes to:
//! - Accepted entities, one per line
//! - Expanded / finished entities, read back on restart to skip done work
//! - Loading line files into seed and exclusion sets

mod file;
mod memory;
mod traits;

pub use file::{read_line_set, read_lines, read_lines_if_exists, FileLineSink};
pub use memory::MemorySink;
pub use traits::{LineSink, StorageError, StorageResult};
pub(crate) use traits::check_line;

use std::collections::HashSet;
use std::path::Path;

/// Seed and exclusion sets rebuilt from a previous graph crawl
#[derive(Debug, Clone, Default)]
pub struct ResumeState {
    /// Entities accepted by an earlier run, to be expanded if not done yet
    pub accepted: Vec<String>,

    /// Entities whose expansion an earlier run already attempted
    pub expanded: HashSet<String>,
}

impl ResumeState {
    /// Loads the acceptance sink and the expansion cache
    ///
    /// Missing files mean "first run" and load as empty.
    pub fn load(accepted_path: &Path, expanded_path: &Path) -> StorageResult<Self> {
        let accepted = read_lines_if_exists(accepted_path)?;
        let expanded = read_line_set(expanded_path)?;
        Ok(Self { accepted, expanded })
    }

    /// Combines fresh seeds with previously accepted entities
    ///
    /// Fresh seeds come first so a new crawl starts where the operator asked.
    pub fn seeds_with(&self, fresh: &[String]) -> Vec<String> {
        let mut seen = HashSet::new();
        fresh
            .iter()
            .chain(self.accepted.iter())
            .filter(|id| seen.insert(id.as_str()))
            .cloned()
            .collect()
    }

    /// Number of accepted entities still waiting for expansion
    pub fn pending(&self) -> usize {
        self.accepted
            .iter()
            .filter(|id| !self.expanded.contains(*id))
            .count()
    }
}
