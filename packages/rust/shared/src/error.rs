//! Error types for paperdash.
//!
//! Library crates use [`PaperDashError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.
//!
//! The parse/classify/aggregate path never produces an error: malformed input
//! degrades to absent fields or dropped rows. Errors here belong to the I/O
//! shims (config, git, HTTP, filesystem) and to loading operator rule files.

use std::path::PathBuf;

/// Top-level error type for all paperdash operations.
#[derive(Debug, thiserror::Error)]
pub enum PaperDashError {
    /// Configuration loading or validation error (includes taxonomy rule files).
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error during enrichment.
    #[error("network error: {0}")]
    Network(String),

    /// Malformed API payload (never the markdown list itself).
    #[error("parse error: {message}")]
    Parse { message: String },

    /// A git subprocess failed while syncing the source repository.
    #[error("git error: {0}")]
    Git(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Dashboard template rendering or serialization error.
    #[error("render error: {0}")]
    Render(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PaperDashError>;

impl PaperDashError {
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
        let err = PaperDashError::config("invalid pattern in rule 'Spectral'");
        assert_eq!(
            err.to_string(),
            "config error: invalid pattern in rule 'Spectral'"
        );

        let err = PaperDashError::Git("git clone exited with status 128".into());
        assert!(err.to_string().starts_with("git error:"));
    }

    #[test]
    fn io_error_carries_path() {
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = PaperDashError::io("data/papers_repo/README.md", source);
        assert!(err.to_string().contains("README.md"));
    }
}
