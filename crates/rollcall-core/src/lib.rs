//! Shared constants for the Rollcall fingerprint pipeline.
//!
//! Every crate in the workspace reads its thresholds, timeouts and device
//! signatures from [`constants`] so the placeholder values live in one place.

pub mod constants;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
