use std::path::PathBuf;

use remote_saver_core::{ErrorMetadata, LogLevel};

/// Errors raised while converting or encoding a single image
#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    #[error("Image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    #[error("Pixel buffer holds {actual} samples, expected {expected}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    #[error("Unsupported channel count: {0} (expected 1, 3 or 4)")]
    UnsupportedChannels(u8),

    #[error("Image is {width}x{height}, WEBP allows at most {max}x{max}")]
    DimensionsTooLarge { width: u32, height: u32, max: u32 },

    #[error("WEBP encoding failed: {0}")]
    WebpEncoding(String),

    #[error("Image codec error: {0}")]
    Codec(#[from] image::ImageError),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ErrorMetadata for ProcessingError {
    fn error_code(&self) -> &'static str {
        match self {
            ProcessingError::EmptyImage { .. } => "EMPTY_IMAGE",
            ProcessingError::BufferSizeMismatch { .. } => "BUFFER_SIZE_MISMATCH",
            ProcessingError::UnsupportedChannels(_) => "UNSUPPORTED_CHANNELS",
            ProcessingError::DimensionsTooLarge { .. } => "DIMENSIONS_TOO_LARGE",
            ProcessingError::WebpEncoding(_) => "WEBP_ENCODING_ERROR",
            ProcessingError::Codec(_) => "IMAGE_CODEC_ERROR",
            ProcessingError::Io { .. } => "IO_ERROR",
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }

    fn log_level(&self) -> LogLevel {
        match self {
            ProcessingError::Codec(_) | ProcessingError::WebpEncoding(_) => LogLevel::Error,
            _ => LogLevel::Warn,
        }
    }
}
