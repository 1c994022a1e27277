//! Error types module
//!
//! All errors surfaced to a user are unified under `AppError`. Each variant describes how it
//! should be presented through `ErrorMetadata` (HTTP status, machine-readable code, whether a
//! retry can help, log level).
//!
//! The `Database` variant and `From<sqlx::Error>` are gated behind the `sqlx` feature.

use std::io;

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;

use crate::constants::{MISSING_LOCATION_MESSAGE, NO_LOCATION_MESSAGE};

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "NO_LOCATION_DATA")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[source] SqlxError),

    #[cfg(not(feature = "sqlx"))]
    #[error("Database error: {0}")]
    Database(String),

    /// The image carries no usable GPS tags. An expected outcome, not a fault.
    #[error("No location data in image")]
    NoLocationData,

    /// The metadata reader could not parse the image bytes.
    #[error("Failed to read image metadata: {0}")]
    MetadataReadFailure(String),

    /// Upload attempted without an image or without coordinates.
    #[error("Missing image or location data")]
    MissingLocationData,

    #[error("Storage write failed: {0}")]
    StorageWriteFailed(String),

    #[error("Record insert failed: {0}")]
    RecordInsertFailed(String),

    /// The same bytes are already being uploaded for this session.
    #[error("Duplicate upload: {0}")]
    DuplicateUpload(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

#[cfg(feature = "sqlx")]
impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        AppError::Database(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::Database(_) => (
            500,
            "DATABASE_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::NoLocationData => (
            422,
            "NO_LOCATION_DATA",
            false,
            Some("Choose a photo taken with location services enabled"),
            false,
            LogLevel::Debug,
        ),
        AppError::MetadataReadFailure(_) => (
            400,
            "METADATA_READ_FAILURE",
            false,
            Some("Check the image format and try a different file"),
            false,
            LogLevel::Warn,
        ),
        AppError::MissingLocationData => (
            422,
            "MISSING_LOCATION_DATA",
            false,
            Some("Select an image with location data before uploading"),
            false,
            LogLevel::Debug,
        ),
        AppError::StorageWriteFailed(_) => (
            502,
            "STORAGE_WRITE_FAILED",
            true,
            Some("Retry the upload"),
            true,
            LogLevel::Error,
        ),
        AppError::RecordInsertFailed(_) => (
            500,
            "RECORD_INSERT_FAILED",
            true,
            Some("Retry the upload"),
            true,
            LogLevel::Error,
        ),
        AppError::DuplicateUpload(_) => (
            409,
            "DUPLICATE_UPLOAD",
            false,
            Some("Wait for the pending upload to finish"),
            false,
            LogLevel::Debug,
        ),
        AppError::InvalidInput(_) => (
            400,
            "INVALID_INPUT",
            false,
            Some("Check request parameters and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::NotFound(_) => (
            404,
            "NOT_FOUND",
            false,
            Some("Verify the resource ID exists"),
            false,
            LogLevel::Debug,
        ),
        AppError::PayloadTooLarge(_) => (
            413,
            "PAYLOAD_TOO_LARGE",
            false,
            Some("Reduce file size"),
            false,
            LogLevel::Debug,
        ),
        AppError::Internal(_) | AppError::InternalWithSource { .. } => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::Database(_) => "Database",
            AppError::NoLocationData => "NoLocationData",
            AppError::MetadataReadFailure(_) => "MetadataReadFailure",
            AppError::MissingLocationData => "MissingLocationData",
            AppError::StorageWriteFailed(_) => "StorageWriteFailed",
            AppError::RecordInsertFailed(_) => "RecordInsertFailed",
            AppError::DuplicateUpload(_) => "DuplicateUpload",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::NotFound(_) => "NotFound",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::Internal(_) | AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Database(_) => "Failed to access database".to_string(),
            AppError::NoLocationData => NO_LOCATION_MESSAGE.to_string(),
            AppError::MetadataReadFailure(_) => "Could not read image metadata".to_string(),
            AppError::MissingLocationData => MISSING_LOCATION_MESSAGE.to_string(),
            AppError::StorageWriteFailed(_) => "Failed to store image".to_string(),
            AppError::RecordInsertFailed(_) => "Failed to save image record".to_string(),
            AppError::DuplicateUpload(ref msg) => msg.clone(),
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::PayloadTooLarge(ref msg) => msg.clone(),
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "Internal server error".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata_database() {
        #[cfg(feature = "sqlx")]
        let err = AppError::from(sqlx::Error::PoolClosed);
        #[cfg(not(feature = "sqlx"))]
        let err = AppError::Database("pool closed".to_string());
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.error_code(), "DATABASE_ERROR");
        assert!(err.is_recoverable());
        assert_eq!(err.client_message(), "Failed to access database");
        assert!(err.is_sensitive());
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn test_error_metadata_no_location_data() {
        let err = AppError::NoLocationData;
        assert_eq!(err.http_status_code(), 422);
        assert_eq!(err.error_code(), "NO_LOCATION_DATA");
        assert!(!err.is_recoverable());
        assert_eq!(err.client_message(), NO_LOCATION_MESSAGE);
        assert!(!err.is_sensitive());
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_error_metadata_storage_write_failed_hides_backend_detail() {
        let err = AppError::StorageWriteFailed("bucket sky-images: access denied".to_string());
        assert_eq!(err.http_status_code(), 502);
        assert_eq!(err.error_code(), "STORAGE_WRITE_FAILED");
        assert!(err.is_recoverable());
        assert!(err.is_sensitive());
        assert!(!err.client_message().contains("access denied"));
        assert!(err.to_string().contains("access denied"));
    }

    #[test]
    fn test_error_metadata_duplicate_upload() {
        let err = AppError::DuplicateUpload("Upload already in progress".to_string());
        assert_eq!(err.http_status_code(), 409);
        assert_eq!(err.error_code(), "DUPLICATE_UPLOAD");
        assert_eq!(err.client_message(), "Upload already in progress");
    }

    #[test]
    fn test_detailed_message_includes_source_chain() {
        let err = AppError::from(anyhow::anyhow!("root cause").context("outer"));
        let details = err.detailed_message();
        assert!(details.contains("Internal error with source"));
        assert!(details.contains("outer"));
    }

    #[test]
    fn test_error_metadata_suggested_actions() {
        assert_eq!(
            AppError::MissingLocationData.suggested_action(),
            Some("Select an image with location data before uploading")
        );
        assert_eq!(
            AppError::NotFound("test".to_string()).suggested_action(),
            Some("Verify the resource ID exists")
        );
        assert_eq!(
            AppError::InvalidInput("test".to_string()).suggested_action(),
            Some("Check request parameters and try again")
        );
    }
}
