//! Scrobble-Ripple: a polite crawler for a paginated social music API
//!
//! This crate walks the friend graph of a rate-limited REST API breadth-first,
//! keeping the users that match an attribute filter, and downloads users'
//! complete paginated listening histories. All outbound traffic goes through
//! a single pacing gate, and every discovery is appended to plain-text sinks
//! so an interrupted crawl resumes without redoing finished work.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for Scrobble-Ripple operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchFailure),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("No seed supplied: {0}")]
    Seed(String),

    #[error("No history found for user {user}")]
    EmptyHistory { user: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Why a single API request produced no data
///
/// Failures never escape the client as panics or transport errors; the
/// caller decides whether to skip, stop or keep a partial result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchFailure {
    #[error("HTTP status {0}")]
    Status(u16),

    #[error("unreachable: {0}")]
    Unreachable(String),

    #[error("undecodable response body: {0}")]
    Decode(String),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("reserved query parameter supplied by caller: {0}")]
    ReservedParameter(String),
}

/// Result type alias for Scrobble-Ripple operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for a single API request or paginated fetch
pub type FetchResult<T> = std::result::Result<T, FetchFailure>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Frontier, JsonPath, RateLimitedClient};
pub use state::PacingGate;
