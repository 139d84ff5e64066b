//! Error types for Pedagraph operations.
//!
//! This module provides a common `Error` type and `Result<T>` alias used across
//! all Pedagraph crates. Uses `thiserror` for derive macros.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Boxed source error carried by reasoning-service failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur in Pedagraph operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error, optionally tied to a path.
    #[error("I/O error{}: {source}", path.as_ref().map(|p| format!(" at {}", p.display())).unwrap_or_default())]
    Io {
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
        /// Path involved in the failed operation, if known.
        path: Option<PathBuf>,
    },

    /// Configuration error. Fatal for batch runs.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested node or file does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed input that could not be parsed.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Reasoning service failure (transport, HTTP status, response shape).
    #[error("LLM error: {message}")]
    Llm {
        /// Human-readable description.
        message: String,
        /// Underlying cause, if any.
        #[source]
        source: Option<BoxError>,
    },

    /// The reasoning service signalled a rate limit.
    #[error("Rate limited: {0}")]
    RateLimited(String),
}

impl Error {
    /// Create an I/O error without path context.
    pub fn io(source: std::io::Error) -> Self {
        Self::Io { source, path: None }
    }

    /// Create an I/O error attributed to `path`.
    pub fn io_with_path(source: std::io::Error, path: impl AsRef<Path>) -> Self {
        Self::Io {
            source,
            path: Some(path.as_ref().to_path_buf()),
        }
    }

    /// Create a file-not-found error for `path`.
    pub fn file_not_found(path: impl AsRef<Path>) -> Self {
        Self::NotFound(format!("file {}", path.as_ref().display()))
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a not found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Create a reasoning service error.
    pub fn llm(msg: impl Into<String>) -> Self {
        Self::Llm {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a reasoning service error with an underlying cause.
    pub fn llm_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Llm {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a rate-limit error.
    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }

    /// Whether a classification attempt that failed with this error may be
    /// retried. Malformed service responses count as transient.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Llm { .. } | Self::RateLimited(_) | Self::Parse(_))
    }

    /// Whether this is an explicit rate-limit signal.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited(_))
    }

    /// Whether this error is a configuration error.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Whether this error reports a missing node or file.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Self::io(source)
    }
}

/// Result type alias using Pedagraph's Error type.
pub type Result<T> = std::result::Result<T, Error>;
