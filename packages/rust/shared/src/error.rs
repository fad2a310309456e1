//! Error types for grantha.
//!
//! Library crates use [`GranthaError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all grantha operations.
#[derive(Debug, thiserror::Error)]
pub enum GranthaError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// The browser driver could not be started or its session broke.
    #[error("driver error: {0}")]
    Driver(String),

    /// A page failed to load (timeout or navigation error).
    #[error("navigation error: {0}")]
    Navigation(String),

    /// The requested book is not one of the supported variants.
    #[error("unknown book '{name}'. Available: {available}")]
    UnknownBook { name: String, available: String },

    /// A file or document could not be parsed.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error.
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, GranthaError>;

impl GranthaError {
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = GranthaError::config("delay must be positive");
        assert_eq!(err.to_string(), "config error: delay must be positive");

        let err = GranthaError::UnknownBook {
            name: "vedas".into(),
            available: "shivasutra, sutraani".into(),
        };
        assert!(err.to_string().contains("unknown book 'vedas'"));
        assert!(err.to_string().contains("shivasutra, sutraani"));
    }

    #[test]
    fn io_error_keeps_path() {
        let err = GranthaError::io(
            "/tmp/books/README.md",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().contains("README.md"));
    }
}
