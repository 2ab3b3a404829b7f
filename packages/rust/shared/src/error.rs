//! Error types for marksync.
//!
//! Library crates use [`MarksyncError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all marksync operations.
#[derive(Debug, thiserror::Error)]
pub enum MarksyncError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error talking to an external service.
    #[error("network error: {0}")]
    Network(String),

    /// The primary extraction capability could not produce a record.
    ///
    /// Always recovered inside the field extractor; never reaches a caller.
    #[error("extraction unavailable: {0}")]
    Extraction(String),

    /// A source adapter failed to produce documents.
    #[error("source error: {0}")]
    Source(String),

    /// The spreadsheet locator does not look like a spreadsheet URL.
    #[error("Invalid Google Sheets URL format. Expected format: https://docs.google.com/spreadsheets/d/SPREADSHEET_ID/... (got: {url})")]
    InvalidTarget { url: String },

    /// The spreadsheet service rejected our credentials.
    #[error("authorization error: {0}")]
    Authorization(String),

    /// The spreadsheet (or its first sheet) does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A row append failed after `written` data rows were already appended.
    ///
    /// Rows already written stay in the sheet; there is no rollback.
    #[error("sync write failed after {written} row(s): {message}")]
    SyncWrite { written: usize, message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (malformed payload, unexpected shape, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, MarksyncError>;

impl MarksyncError {
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

    /// Create an invalid-target error for the given locator.
    pub fn invalid_target(url: impl Into<String>) -> Self {
        Self::InvalidTarget { url: url.into() }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Short variant name for structured log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config { .. } => "ConfigError",
            Self::Network(_) => "NetworkError",
            Self::Extraction(_) => "ExtractionUnavailable",
            Self::Source(_) => "SourceError",
            Self::InvalidTarget { .. } => "InvalidTargetError",
            Self::Authorization(_) => "AuthorizationError",
            Self::NotFound(_) => "NotFoundError",
            Self::SyncWrite { .. } => "SyncWriteError",
            Self::Io { .. } => "IoError",
            Self::Validation { .. } => "ValidationError",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = MarksyncError::config("missing credentials");
        assert_eq!(err.to_string(), "config error: missing credentials");

        let err = MarksyncError::SyncWrite {
            written: 3,
            message: "HTTP 500".into(),
        };
        assert_eq!(err.to_string(), "sync write failed after 3 row(s): HTTP 500");
    }

    #[test]
    fn invalid_target_mentions_expected_shape() {
        let err = MarksyncError::invalid_target("https://example.com/sheet");
        let msg = err.to_string();
        assert!(msg.contains("/spreadsheets/d/SPREADSHEET_ID"));
        assert!(msg.contains("https://example.com/sheet"));
        assert_eq!(err.kind(), "InvalidTargetError");
    }
}
