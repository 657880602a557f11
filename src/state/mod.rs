//! State module for tracking crawl pacing
//!
//! # Components
//!
//! - `PacingGate`: the single rate-limit gate every outbound request passes through

mod pacing;

pub use pacing::PacingGate;
