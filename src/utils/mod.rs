//! Utility functions and helpers
//!
//! Cancellation primitives, logging setup and application paths used
//! throughout the crate.

pub mod abort;
pub mod app_paths;
pub mod logging;
