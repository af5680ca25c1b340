//! Image processing for remote saving
//!
//! Converts the host's floating point pixel buffers to 8-bit images and encodes
//! them in memory as PNG, JPEG or WEBP. Also decodes image files back into
//! [`RawImage`](remote_saver_core::RawImage) buffers for command-line use.

pub mod compression;
pub mod conversion;
pub mod error;
pub mod loader;

pub use compression::{encode_image, ImageEncoder};
pub use conversion::{from_dynamic_image, quantize, to_dynamic_image};
pub use error::ProcessingError;
pub use loader::{decode_bytes, decode_file};
