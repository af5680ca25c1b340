//! Float pixel buffer <-> 8-bit image conversion

use image::{DynamicImage, GrayImage, RgbImage, RgbaImage};
use remote_saver_core::RawImage;

use crate::error::ProcessingError;

/// Map one normalized sample to 8 bits: clip to `[0, 1]`, scale, round.
///
/// NaN maps to 0.
pub fn quantize(sample: f32) -> u8 {
    (sample.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Build an 8-bit image from a host pixel buffer.
pub fn to_dynamic_image(raw: &RawImage) -> Result<DynamicImage, ProcessingError> {
    let (width, height) = (raw.width, raw.height);
    if width == 0 || height == 0 {
        return Err(ProcessingError::EmptyImage { width, height });
    }

    let expected = raw.expected_len();
    if raw.data.len() != expected {
        return Err(ProcessingError::BufferSizeMismatch {
            expected,
            actual: raw.data.len(),
        });
    }

    let pixels: Vec<u8> = raw.data.iter().map(|&sample| quantize(sample)).collect();

    let img = match raw.channels {
        1 => GrayImage::from_raw(width, height, pixels).map(DynamicImage::ImageLuma8),
        3 => RgbImage::from_raw(width, height, pixels).map(DynamicImage::ImageRgb8),
        4 => RgbaImage::from_raw(width, height, pixels).map(DynamicImage::ImageRgba8),
        other => return Err(ProcessingError::UnsupportedChannels(other)),
    };

    img.ok_or(ProcessingError::BufferSizeMismatch {
        expected,
        actual: raw.data.len(),
    })
}

/// Normalize a decoded image into a host pixel buffer.
///
/// Images with alpha become RGBA, single-channel images stay grayscale,
/// everything else becomes RGB.
pub fn from_dynamic_image(img: &DynamicImage) -> RawImage {
    let (width, height) = (img.width(), img.height());
    let color = img.color();

    let (channels, bytes) = if color.has_alpha() {
        (4, img.to_rgba8().into_raw())
    } else if color.channel_count() == 1 {
        (1, img.to_luma8().into_raw())
    } else {
        (3, img.to_rgb8().into_raw())
    };

    let data = bytes.into_iter().map(|b| b as f32 / 255.0).collect();
    RawImage::new(width, height, channels, data)
}
