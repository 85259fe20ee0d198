//! Utility functions module
//!
//! Contains helpers for formatting sizes in status messages.

pub mod units;

// Re-export commonly used functions
pub use units::{format_bytes, kilobytes};
