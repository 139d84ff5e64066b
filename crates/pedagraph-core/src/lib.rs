//! Pedagraph Core: shared errors, identifiers, configuration traits, and
//! the reasoning client used by the edge classifier.
//!
//! This crate has no internal Pedagraph dependencies (dependency level 0).
//!
//! # Modules
//!
//! - [`error`]: Error types and Result alias
//! - [`llm`]: Text-completion provider abstraction and implementations
//! - [`traits`]: Configuration trait shared by the CLI and handlers
//! - [`util`]: Identifier normalization helpers

pub mod error;
pub mod llm;
pub mod traits;
pub mod util;

// Re-export key types at crate root for convenience
pub use error::{Error, Result};
pub use traits::{Artifact, ConfigProvider};

// Convenience re-exports from util
pub use util::ids::{clean_label, normalize_id};
