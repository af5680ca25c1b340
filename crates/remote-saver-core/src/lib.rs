//! Remote Saver Core Library
//!
//! This crate provides the domain models, upload configuration and error types
//! shared by the processing, client and CLI crates.

pub mod config;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{parse_extra_data, parse_headers, ImageFormat, UploadConfig, UploadOptions};
pub use error::{ConfigurationError, ErrorMetadata, LogLevel};
pub use models::{ImageBatch, RawImage, UiImages, UiResponse, UploadResult, UploadStatus};
