//! Storage traits and error types
//!
//! This module defines the append-only sink interface the crawl policies
//! write through, and the associated error type.

use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid line: {0:?}")]
    InvalidLine(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Append-only destination for entity identifiers, one per line
///
/// Every appended line must be durable once `append` returns, because a
/// restarted crawl trusts the sink's contents to skip finished work.
pub trait LineSink {
    /// Appends one line. The line must not contain a line break.
    fn append(&mut self, line: &str) -> StorageResult<()>;
}

/// Rejects identifiers that would not read back unchanged
///
/// Sink files are read one trimmed, non-blank line per identifier, so a
/// line break, surrounding whitespace or an empty string would come back
/// as a different entity (or none) on restart.
pub(crate) fn check_line(line: &str) -> StorageResult<()> {
    if line.is_empty() || line.contains(&['\n', '\r'][..]) || line.trim() != line {
        return Err(StorageError::InvalidLine(line.to_string()));
    }
    Ok(())
}
