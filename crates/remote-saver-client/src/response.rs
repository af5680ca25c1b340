//! Server response handling
//!
//! Upload endpoints disagree on where they report the stored file's URL. Two
//! shapes are recognized, in this order:
//!
//! 1. `{"url": "..."}`
//! 2. `{"data": {"url": "..."}}`
//!
//! The nested shape is only looked at when the body has no top-level `url`
//! key. A successful response without a recognizable URL (or without JSON at all)
//! still counts as a successful upload; the raw body becomes the message.

use remote_saver_core::UploadResult;
use serde_json::Value;

use crate::transport::TransportResponse;

/// Find the uploaded file's URL in a parsed response body.
///
/// A top-level `url` key decides the lookup on its own: `data.url` is only
/// consulted when that key is missing. Only non-empty string values count.
pub fn extract_url(response: &Value) -> Option<String> {
    let object = response.as_object()?;

    let url = match object.get("url") {
        Some(top_level) => Some(top_level),
        None => object.get("data")?.as_object()?.get("url"),
    };

    non_empty_str(url).map(str::to_string)
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Turn a completed HTTP exchange into the image's result record.
pub fn classify_response(filename: String, response: TransportResponse) -> UploadResult {
    if response.is_failure() {
        let message = if response.body.is_empty() {
            response.status_line()
        } else {
            response.body
        };
        return UploadResult::error(filename, message);
    }

    let url = match serde_json::from_str::<Value>(&response.body) {
        Ok(json) => extract_url(&json),
        Err(e) => {
            tracing::debug!(error = %e, "Response is not JSON, keeping raw text");
            None
        }
    };

    UploadResult::success(filename, url, response.body)
}
