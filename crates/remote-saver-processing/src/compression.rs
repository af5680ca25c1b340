use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat as CodecFormat};
use remote_saver_core::{ImageFormat, RawImage};
use std::io::Cursor;

use crate::conversion::to_dynamic_image;
use crate::error::ProcessingError;

/// libwebp refuses images larger than this in either dimension
const WEBP_MAX_DIMENSION: u32 = 16383;

/// Quantize and encode one host image in the requested format.
///
/// `quality` is ignored for PNG.
pub fn encode_image(
    raw: &RawImage,
    format: ImageFormat,
    quality: u8,
) -> Result<Bytes, ProcessingError> {
    let img = to_dynamic_image(raw)?;
    ImageEncoder::encode(&img, format, quality)
}

/// In-memory encoder for the three upload formats
pub struct ImageEncoder;

impl ImageEncoder {
    pub fn encode(
        img: &DynamicImage,
        format: ImageFormat,
        quality: u8,
    ) -> Result<Bytes, ProcessingError> {
        let data = match format {
            ImageFormat::Png => Self::encode_png(img)?,
            ImageFormat::Jpeg => Self::encode_jpeg(img, quality)?,
            ImageFormat::Webp => Self::encode_webp(img, quality)?,
        };

        tracing::debug!(
            format = %format,
            quality = ?format.uses_quality().then_some(quality),
            width = img.width(),
            height = img.height(),
            bytes = data.len(),
            "Encoded image"
        );

        Ok(data)
    }

    fn encode_png(img: &DynamicImage) -> Result<Bytes, ProcessingError> {
        let mut buffer = Vec::new();
        let mut cursor = Cursor::new(&mut buffer);

        img.write_to(&mut cursor, CodecFormat::Png)?;

        Ok(Bytes::from(buffer))
    }

    /// JPEG has no alpha channel, so RGBA input is flattened to RGB first.
    fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Bytes, ProcessingError> {
        let flattened;
        let source = if img.color().has_alpha() {
            flattened = DynamicImage::ImageRgb8(img.to_rgb8());
            &flattened
        } else {
            img
        };

        let mut buffer = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
        source.write_with_encoder(encoder)?;

        Ok(Bytes::from(buffer))
    }

    /// Lossy WebP through libwebp; the `image` crate only writes lossless WebP.
    fn encode_webp(img: &DynamicImage, quality: u8) -> Result<Bytes, ProcessingError> {
        let (width, height) = (img.width(), img.height());
        if width > WEBP_MAX_DIMENSION || height > WEBP_MAX_DIMENSION {
            return Err(ProcessingError::DimensionsTooLarge {
                width,
                height,
                max: WEBP_MAX_DIMENSION,
            });
        }

        let webp_data = if img.color().has_alpha() {
            let rgba_img = img.to_rgba8();
            webp::Encoder::from_rgba(&rgba_img, width, height).encode(quality as f32)
        } else {
            let rgb_img = img.to_rgb8();
            webp::Encoder::from_rgb(&rgb_img, width, height).encode(quality as f32)
        };

        if webp_data.is_empty() {
            return Err(ProcessingError::WebpEncoding(
                "encoder produced no output".to_string(),
            ));
        }

        Ok(Bytes::copy_from_slice(&webp_data))
    }
}
