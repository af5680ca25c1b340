use serde::{Deserialize, Serialize};

/// Type tag the host UI uses to tell remote results from local files
pub const REMOTE_RESULT_TYPE: &str = "remote";

/// Outcome of one image upload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Success,
    Error,
}

impl UploadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadStatus::Success => "success",
            UploadStatus::Error => "error",
        }
    }
}

/// Per-image record rendered by the host UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResult {
    pub filename: String,
    /// Always empty: remote images have no local subfolder
    pub subfolder: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// URL reported by the server, when one was found in its response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub status: UploadStatus,
    pub message: String,
}

impl UploadResult {
    pub fn success(filename: impl Into<String>, url: Option<String>, message: String) -> Self {
        Self::new(filename.into(), url, UploadStatus::Success, message)
    }

    pub fn error(filename: impl Into<String>, message: String) -> Self {
        Self::new(filename.into(), None, UploadStatus::Error, message)
    }

    fn new(filename: String, url: Option<String>, status: UploadStatus, message: String) -> Self {
        Self {
            filename,
            subfolder: String::new(),
            kind: REMOTE_RESULT_TYPE.to_string(),
            url,
            status,
            message,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == UploadStatus::Success
    }
}

/// `{ "ui": { "images": [...] } }` envelope returned to the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiResponse {
    pub ui: UiImages,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiImages {
    pub images: Vec<UploadResult>,
}

impl From<Vec<UploadResult>> for UiResponse {
    fn from(images: Vec<UploadResult>) -> Self {
        Self {
            ui: UiImages { images },
        }
    }
}
