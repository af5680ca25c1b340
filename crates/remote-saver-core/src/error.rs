//! Error types module
//!
//! Configuration failures are the only errors that abort a whole upload batch.
//! Everything that goes wrong for a single image is converted into an
//! [`UploadResult`](crate::models::UploadResult) instead of being raised.

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

/// Metadata describing how an error should be reported.
///
/// Implemented by every error enum in the workspace so callers can pick a log
/// level and a stable code without matching on concrete variants.
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "INVALID_HEADERS_JSON")
    fn error_code(&self) -> &'static str;

    /// Whether retrying the same call could succeed
    fn is_recoverable(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

/// Batch-fatal configuration errors, raised before any network activity.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Failed to parse headers JSON: {0}")]
    InvalidHeadersJson(String),

    #[error("Failed to parse extra data JSON: {0}")]
    InvalidExtraDataJson(String),

    #[error("Invalid header {name:?}: {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("Quality must be between 1 and 100, got {0}")]
    InvalidQuality(u8),

    #[error("Unsupported image format {0:?}. Use PNG, JPEG or WEBP")]
    InvalidImageFormat(String),
}

impl ErrorMetadata for ConfigurationError {
    fn error_code(&self) -> &'static str {
        match self {
            ConfigurationError::InvalidHeadersJson(_) => "INVALID_HEADERS_JSON",
            ConfigurationError::InvalidExtraDataJson(_) => "INVALID_EXTRA_DATA_JSON",
            ConfigurationError::InvalidHeader { .. } => "INVALID_HEADER",
            ConfigurationError::InvalidQuality(_) => "INVALID_QUALITY",
            ConfigurationError::InvalidImageFormat(_) => "INVALID_IMAGE_FORMAT",
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }

    fn log_level(&self) -> LogLevel {
        LogLevel::Error
    }
}
