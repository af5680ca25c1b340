//! Decoding encoded images into host pixel buffers

use image::ImageReader;
use remote_saver_core::RawImage;
use std::io::Cursor;
use std::path::Path;

use crate::conversion::from_dynamic_image;
use crate::error::ProcessingError;

/// Decode any format the `image` crate reads into a normalized buffer.
pub fn decode_bytes(data: &[u8]) -> Result<RawImage, ProcessingError> {
    let cursor = Cursor::new(data);
    let img = ImageReader::new(cursor)
        .with_guessed_format()
        .map_err(image::ImageError::IoError)?
        .decode()?;

    Ok(from_dynamic_image(&img))
}

pub fn decode_file(path: &Path) -> Result<RawImage, ProcessingError> {
    let data = std::fs::read(path).map_err(|source| ProcessingError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let raw = decode_bytes(&data)?;
    tracing::debug!(
        path = %path.display(),
        width = raw.width,
        height = raw.height,
        channels = raw.channels,
        "Decoded image file"
    );

    Ok(raw)
}
