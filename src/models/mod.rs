//! Data models module
//!
//! Contains the date option value type and the fixed catalog the
//! options screen offers.

pub mod option;

// Re-export commonly used types
pub use option::{catalog, DateOption};
