//! Remote image upload client
//!
//! Uploads a batch of generated images, one multipart POST per image, and turns
//! every server response (or failure) into an [`UploadResult`] for the host UI.
//!
//! ```no_run
//! # async fn run() -> anyhow::Result<()> {
//! use remote_saver_client::Uploader;
//! use remote_saver_core::{RawImage, UploadConfig};
//!
//! let uploader = Uploader::http()?;
//! let config = UploadConfig::new("https://example.com/upload");
//! let images = vec![RawImage::filled(64, 64, &[0.2, 0.4, 0.6])];
//!
//! let ui = uploader.upload_for_ui(&images, &config).await?;
//! println!("{}", serde_json::to_string_pretty(&ui)?);
//! # Ok(())
//! # }
//! ```

pub mod response;
pub mod transport;
pub mod upload;

pub use response::{classify_response, extract_url};
pub use transport::{HttpTransport, Transport, TransportError, TransportResponse, UploadRequest};
pub use upload::{build_filename, Uploader};

pub use remote_saver_core::{UploadResult, UploadStatus};
