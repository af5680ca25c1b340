//! The upload operation
//!
//! Images are processed strictly in order, one request at a time. Only a
//! configuration error aborts the batch; every per-image failure (encoding,
//! transport, HTTP status) is recorded as an `"error"` result and the loop moves
//! on, so the caller always gets one result per input image.

use anyhow::Result;
use remote_saver_core::{
    ConfigurationError, ErrorMetadata, ImageFormat, LogLevel, RawImage, UiResponse, UploadConfig,
    UploadOptions, UploadResult, UploadStatus,
};
use remote_saver_processing::{encode_image, ProcessingError};
use std::sync::Arc;

use crate::response::classify_response;
use crate::transport::{HttpTransport, Transport, TransportError, UploadRequest};

/// `{prefix}_{index}.{ext}`, with a 1-based index.
pub fn build_filename(prefix: &str, index: usize, format: ImageFormat) -> String {
    format!("{}_{}.{}", prefix, index, format.extension())
}

/// Why a single image never got an HTTP response
#[derive(Debug, thiserror::Error)]
enum ImageFailure {
    #[error(transparent)]
    Encode(#[from] ProcessingError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl ImageFailure {
    fn metadata(&self) -> &dyn ErrorMetadata {
        match self {
            ImageFailure::Encode(e) => e,
            ImageFailure::Transport(e) => e,
        }
    }

    fn message(&self, index: usize) -> String {
        match self {
            ImageFailure::Encode(e) => format!("Error encoding image {}: {}", index, e),
            ImageFailure::Transport(e) => format!("Error uploading image {}: {}", index, e),
        }
    }
}

/// Uploads image batches through a [`Transport`]
#[derive(Clone)]
pub struct Uploader {
    transport: Arc<dyn Transport>,
}

impl Uploader {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Uploader over a default reqwest client.
    pub fn http() -> Result<Self> {
        Ok(Self::new(Arc::new(HttpTransport::new()?)))
    }

    /// Upload every image of the batch and return one result per image, in
    /// input order.
    ///
    /// Fails only when the configuration is invalid, in which case no request
    /// is sent.
    pub async fn upload(
        &self,
        images: &[RawImage],
        config: &UploadConfig,
    ) -> Result<Vec<UploadResult>, ConfigurationError> {
        let options = config.parse_options().inspect_err(|e| {
            tracing::error!(error = %e, error_code = e.error_code(), "Invalid upload configuration");
        })?;

        tracing::info!(
            total_images = images.len(),
            upload_url = %config.upload_url,
            "Starting image upload"
        );
        tracing::debug!(
            field_name = %config.image_field_name,
            filename_prefix = %config.filename_prefix,
            image_format = %config.image_format,
            quality = ?config.image_format.uses_quality().then_some(config.quality),
            header_count = options.headers.len(),
            form_field_count = options.form_fields.len(),
            "Upload parameters"
        );

        let mut results = Vec::with_capacity(images.len());
        for (position, image) in images.iter().enumerate() {
            let result = self.upload_one(position + 1, image, config, &options).await;
            results.push(result);
        }

        let succeeded = results.iter().filter(|r| r.is_success()).count();
        tracing::info!(
            total_images = results.len(),
            succeeded,
            failed = results.len() - succeeded,
            "All images processed"
        );

        Ok(results)
    }

    /// Same as [`upload`](Self::upload), wrapped in the host UI envelope.
    pub async fn upload_for_ui(
        &self,
        images: &[RawImage],
        config: &UploadConfig,
    ) -> Result<UiResponse, ConfigurationError> {
        self.upload(images, config).await.map(UiResponse::from)
    }

    async fn upload_one(
        &self,
        index: usize,
        image: &RawImage,
        config: &UploadConfig,
        options: &UploadOptions,
    ) -> UploadResult {
        let filename = build_filename(&config.filename_prefix, index, config.image_format);
        tracing::info!(image_index = index, filename = %filename, "Processing image");

        match self.send_image(&filename, image, config, options).await {
            Ok(response) => {
                let http_status = response.status;
                let result = classify_response(filename, response);
                let status = result.status.as_str();
                match result.status {
                    UploadStatus::Success => tracing::info!(
                        image_index = index,
                        http_status,
                        status,
                        url = ?result.url,
                        "Image uploaded successfully"
                    ),
                    UploadStatus::Error => tracing::warn!(
                        image_index = index,
                        http_status,
                        status,
                        message = %result.message,
                        "Server rejected image upload"
                    ),
                }
                result
            }
            Err(failure) => {
                let message = failure.message(index);
                log_failure(index, failure.metadata(), &message);
                UploadResult::error(filename, message)
            }
        }
    }

    async fn send_image(
        &self,
        filename: &str,
        image: &RawImage,
        config: &UploadConfig,
        options: &UploadOptions,
    ) -> Result<crate::transport::TransportResponse, ImageFailure> {
        let data = encode_image(image, config.image_format, config.quality)?;
        tracing::debug!(filename = %filename, bytes = data.len(), "Image encoded");

        let request = UploadRequest {
            url: config.upload_url.clone(),
            headers: options.headers.clone(),
            field_name: config.image_field_name.clone(),
            filename: filename.to_string(),
            mime_type: config.image_format.mime_type(),
            data,
            form_fields: options.form_fields.clone(),
        };

        Ok(self.transport.send(request).await?)
    }
}

fn log_failure(index: usize, metadata: &dyn ErrorMetadata, message: &str) {
    let error_code = metadata.error_code();
    let recoverable = metadata.is_recoverable();
    match metadata.log_level() {
        LogLevel::Debug => {
            tracing::debug!(image_index = index, error_code, recoverable, "{}", message)
        }
        LogLevel::Warn => {
            tracing::warn!(image_index = index, error_code, recoverable, "{}", message)
        }
        LogLevel::Error => {
            tracing::error!(image_index = index, error_code, recoverable, "{}", message)
        }
    }
}
