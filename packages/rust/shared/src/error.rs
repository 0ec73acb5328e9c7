//! Error types for apiscout.
//!
//! Library crates use [`ApiScoutError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all apiscout operations.
#[derive(Debug, thiserror::Error)]
pub enum ApiScoutError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Transport-level failure talking to a provider.
    #[error("network error: {0}")]
    Network(String),

    /// A provider answered with a non-success status.
    #[error("{service} API error {status}: {body}")]
    Api {
        service: &'static str,
        status: u16,
        body: String,
    },

    /// A provider accepted the request but reported that the work failed.
    #[error("{service} reported failure: {message}")]
    Provider {
        service: &'static str,
        message: String,
    },

    /// A provider call exceeded its deadline.
    #[error("{service} call timed out after {secs}s")]
    Timeout { service: &'static str, secs: u64 },

    /// Response decoding error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (unusable URL, empty reply, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ApiScoutError>;

impl ApiScoutError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Classify a `reqwest`-style transport failure for `service`.
    ///
    /// Timeouts become [`ApiScoutError::Timeout`] so callers can tell a slow
    /// provider from an unreachable one.
    pub fn transport(
        service: &'static str,
        secs: u64,
        is_timeout: bool,
        detail: impl std::fmt::Display,
    ) -> Self {
        if is_timeout {
            Self::Timeout { service, secs }
        } else {
            Self::Network(format!("{service}: {detail}"))
        }
    }
}
