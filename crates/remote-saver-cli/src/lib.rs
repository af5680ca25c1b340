//! remote-saver CLI: upload image files to an HTTP endpoint.
//!
//! Every `UploadConfig` field is available as a flag and as a `REMOTE_SAVER_*`
//! environment variable (a `.env` file is loaded first).

use anyhow::{Context, Result};
use clap::Parser;
use remote_saver_client::{HttpTransport, Uploader};
use remote_saver_core::{ImageFormat, RawImage, UiResponse, UploadConfig};
use remote_saver_processing::decode_file;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(
    name = "remote-saver",
    version,
    about = "Upload images to a remote HTTP endpoint as multipart/form-data"
)]
pub struct Args {
    /// Image files to upload, in order
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Target URL for the upload POST
    #[arg(long = "url", env = "REMOTE_SAVER_UPLOAD_URL")]
    pub upload_url: String,

    /// Multipart field name of the file part [default: file]
    #[arg(long = "field", env = "REMOTE_SAVER_FIELD_NAME")]
    pub image_field_name: Option<String>,

    /// Prefix of generated filenames [default: ComfyUI]
    #[arg(long = "prefix", env = "REMOTE_SAVER_FILENAME_PREFIX")]
    pub filename_prefix: Option<String>,

    /// PNG, JPEG or WEBP [default: PNG]
    #[arg(long = "format", env = "REMOTE_SAVER_IMAGE_FORMAT")]
    pub image_format: Option<ImageFormat>,

    /// JPEG/WEBP quality, 1-100 [default: 90]
    #[arg(long, env = "REMOTE_SAVER_QUALITY")]
    pub quality: Option<u8>,

    /// JSON object of extra request headers
    #[arg(long, env = "REMOTE_SAVER_HEADERS")]
    pub headers: Option<String>,

    /// JSON object of extra multipart text fields
    #[arg(long, env = "REMOTE_SAVER_EXTRA_DATA")]
    pub extra_data: Option<String>,

    /// Per-request timeout; no timeout when unset
    #[arg(long, env = "REMOTE_SAVER_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Emit logs as JSON lines
    #[arg(long, env = "REMOTE_SAVER_LOG_JSON")]
    pub log_json: bool,
}

impl Args {
    /// Upload configuration, with library defaults for unset options.
    pub fn to_config(&self) -> UploadConfig {
        let mut config = UploadConfig::new(self.upload_url.clone());
        if let Some(field) = &self.image_field_name {
            config.image_field_name = field.clone();
        }
        if let Some(prefix) = &self.filename_prefix {
            config.filename_prefix = prefix.clone();
        }
        if let Some(format) = self.image_format {
            config.image_format = format;
        }
        if let Some(quality) = self.quality {
            config.quality = quality;
        }
        config.headers_json = self.headers.clone();
        config.extra_data_json = self.extra_data.clone();
        config
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Initialize tracing for the CLI. Logs go to stderr so stdout stays valid JSON.
pub fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Decode every input file, failing on the first unreadable one.
pub fn load_images(paths: &[PathBuf]) -> Result<Vec<RawImage>> {
    paths
        .iter()
        .map(|path| {
            decode_file(path).with_context(|| format!("Failed to load image {}", path.display()))
        })
        .collect()
}

/// Load the files and upload them, returning the UI envelope.
pub async fn run(args: &Args) -> Result<UiResponse> {
    let images = load_images(&args.files)?;
    let config = args.to_config();

    let transport = HttpTransport::with_timeout(args.timeout())?;
    let uploader = Uploader::new(Arc::new(transport));

    uploader
        .upload_for_ui(&images, &config)
        .await
        .context("Invalid upload configuration")
}
