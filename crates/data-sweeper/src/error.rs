//! Custom error types for the sweeper pipeline.
//!
//! This module provides a single error hierarchy using `thiserror`.
//! Errors are serializable so a front end can display them without
//! knowing the Rust types, and each variant carries a stable error code.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for the sweeper pipeline.
#[derive(Error, Debug)]
pub enum SweeperError {
    /// The file extension is not one the loader understands.
    #[error("Unsupported file type: '{0}' (expected csv or xlsx)")]
    UnsupportedFormat(String),

    /// The content of a recognized format could not be parsed.
    #[error("Failed to parse '{file}': {reason}")]
    Parse { file: String, reason: String },

    /// Column was not found in the table.
    #[error("Column '{0}' not found in table")]
    UnknownColumn(String),

    /// The table exceeds the row or column limits of the export format.
    #[error(
        "Table of {rows} rows x {columns} columns exceeds the spreadsheet limit of {max_rows} rows x {max_columns} columns"
    )]
    ExportTooLarge {
        rows: usize,
        columns: usize,
        max_rows: usize,
        max_columns: usize,
    },

    /// Writing the export buffer failed.
    #[error("Export failed: {0}")]
    ExportFailed(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A session operation was called out of order.
    #[error("Operation requires stage '{expected}', but session is at '{actual}'")]
    InvalidStage {
        expected: &'static str,
        actual: &'static str,
    },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<SweeperError>,
    },
}

impl SweeperError {
    /// Build a parse error for `file` from any displayable cause.
    pub fn parse(file: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        SweeperError::Parse {
            file: file.into(),
            reason: reason.to_string(),
        }
    }

    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        SweeperError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get error code for front end handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            Self::Parse { .. } => "PARSE_ERROR",
            Self::UnknownColumn(_) => "UNKNOWN_COLUMN",
            Self::ExportTooLarge { .. } => "EXPORT_TOO_LARGE",
            Self::ExportFailed(_) => "EXPORT_FAILED",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::InvalidStage { .. } => "INVALID_STAGE",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error only affects the file being loaded.
    ///
    /// File-level errors skip the offending file; the rest of a batch
    /// keeps going.
    pub fn is_file_level(&self) -> bool {
        match self {
            Self::UnsupportedFormat(_) | Self::Parse { .. } => true,
            Self::WithContext { source, .. } => source.is_file_level(),
            _ => false,
        }
    }
}

/// Serialize implementation for front end compatibility.
///
/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for SweeperError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("SweeperError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

impl From<rust_xlsxwriter::XlsxError> for SweeperError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        SweeperError::ExportFailed(err.to_string())
    }
}

/// Result type alias for sweeper operations.
pub type Result<T> = std::result::Result<T, SweeperError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| SweeperError::Polars(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(
            SweeperError::UnsupportedFormat("txt".to_string()).error_code(),
            "UNSUPPORTED_FORMAT"
        );
        assert_eq!(
            SweeperError::UnknownColumn("age".to_string()).error_code(),
            "UNKNOWN_COLUMN"
        );
    }

    #[test]
    fn test_is_file_level() {
        assert!(SweeperError::UnsupportedFormat("txt".to_string()).is_file_level());
        assert!(SweeperError::parse("a.csv", "bad row").is_file_level());
        assert!(!SweeperError::UnknownColumn("x".to_string()).is_file_level());
        assert!(
            SweeperError::parse("a.csv", "bad row")
                .with_context("Loading batch")
                .is_file_level()
        );
    }

    #[test]
    fn test_parse_error_message_keeps_cause() {
        let error = SweeperError::parse("data.csv", "found more fields than defined");
        let message = error.to_string();
        assert!(message.contains("data.csv"));
        assert!(message.contains("found more fields"));
    }

    #[test]
    fn test_export_too_large_message() {
        let error = SweeperError::ExportTooLarge {
            rows: 2_000_000,
            columns: 3,
            max_rows: 1_048_576,
            max_columns: 16_384,
        };
        assert!(error.to_string().contains("2000000 rows"));
    }

    #[test]
    fn test_error_serialization() {
        let error = SweeperError::UnknownColumn("Age".to_string());
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("UNKNOWN_COLUMN"));
        assert!(json.contains("Age"));
    }

    #[test]
    fn test_with_context() {
        let error =
            SweeperError::UnknownColumn("test".to_string()).with_context("During projection");
        assert!(error.to_string().contains("During projection"));
        assert_eq!(error.error_code(), "UNKNOWN_COLUMN"); // Preserves original code
    }
}
