//! Error types for reportpipe.
//!
//! Library crates use [`ReportPipeError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all reportpipe operations.
#[derive(Debug, thiserror::Error)]
pub enum ReportPipeError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (schema mismatch, out-of-range value, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Bootstrap error (missing interpreter, failed subprocess).
    #[error("setup error: {0}")]
    Setup(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ReportPipeError>;

impl ReportPipeError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Create a setup error from any displayable message.
    pub fn setup(msg: impl Into<String>) -> Self {
        Self::Setup(msg.into())
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
