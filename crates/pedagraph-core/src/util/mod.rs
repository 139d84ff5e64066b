//! Utility modules.
//!
//! # Modules
//!
//! - [`files`]: Crash-safe file writes
//! - [`ids`]: Node identifier normalization

pub mod files;
pub mod ids;
