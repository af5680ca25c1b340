//! Configuration module
//!
//! `UploadConfig` is the immutable configuration of one upload invocation. The
//! two free-form JSON options (`headers_json`, `extra_data_json`) are parsed
//! exactly once per invocation into [`UploadOptions`]; any problem there is a
//! [`ConfigurationError`] and aborts the invocation before the first request.

use std::fmt;
use std::str::FromStr;

use http::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ConfigurationError;

const DEFAULT_IMAGE_FIELD_NAME: &str = "file";
const DEFAULT_FILENAME_PREFIX: &str = "ComfyUI";
const DEFAULT_QUALITY: u8 = 90;
const MIN_QUALITY: u8 = 1;
const MAX_QUALITY: u8 = 100;

/// Output encoding for uploaded images
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", rename_all = "UPPERCASE")]
pub enum ImageFormat {
    #[default]
    Png,
    Jpeg,
    Webp,
}

impl ImageFormat {
    pub fn parse(s: &str) -> Result<Self, ConfigurationError> {
        match s.trim().to_lowercase().as_str() {
            "png" => Ok(ImageFormat::Png),
            "jpeg" | "jpg" => Ok(ImageFormat::Jpeg),
            "webp" => Ok(ImageFormat::Webp),
            _ => Err(ConfigurationError::InvalidImageFormat(s.to_string())),
        }
    }

    /// File extension used in generated filenames
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Webp => "webp",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Webp => "image/webp",
        }
    }

    /// PNG is lossless; only JPEG and WEBP honor the quality setting.
    pub fn uses_quality(self) -> bool {
        !matches!(self, ImageFormat::Png)
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImageFormat::Png => "PNG",
            ImageFormat::Jpeg => "JPEG",
            ImageFormat::Webp => "WEBP",
        };
        f.write_str(name)
    }
}

impl FromStr for ImageFormat {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ImageFormat {
    type Error = ConfigurationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

fn default_image_field_name() -> String {
    DEFAULT_IMAGE_FIELD_NAME.to_string()
}

fn default_filename_prefix() -> String {
    DEFAULT_FILENAME_PREFIX.to_string()
}

fn default_quality() -> u8 {
    DEFAULT_QUALITY
}

/// Configuration applied uniformly to every image of one batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Target URL for the multipart POST
    pub upload_url: String,
    /// Multipart field name of the file part
    #[serde(default = "default_image_field_name")]
    pub image_field_name: String,
    /// Filenames are generated as `{filename_prefix}_{index}.{ext}`
    #[serde(default = "default_filename_prefix")]
    pub filename_prefix: String,
    #[serde(default)]
    pub image_format: ImageFormat,
    /// JSON object of extra request headers
    #[serde(default)]
    pub headers_json: Option<String>,
    /// JSON object of extra multipart text fields
    #[serde(default)]
    pub extra_data_json: Option<String>,
    /// 1-100, used only for JPEG and WEBP
    #[serde(default = "default_quality")]
    pub quality: u8,
}

impl UploadConfig {
    /// Configuration with every optional field at its default.
    pub fn new(upload_url: impl Into<String>) -> Self {
        Self {
            upload_url: upload_url.into(),
            image_field_name: default_image_field_name(),
            filename_prefix: default_filename_prefix(),
            image_format: ImageFormat::default(),
            headers_json: None,
            extra_data_json: None,
            quality: default_quality(),
        }
    }

    /// Validate scalar settings and parse the JSON options.
    pub fn parse_options(&self) -> Result<UploadOptions, ConfigurationError> {
        if !(MIN_QUALITY..=MAX_QUALITY).contains(&self.quality) {
            return Err(ConfigurationError::InvalidQuality(self.quality));
        }

        let headers = parse_headers(self.headers_json.as_deref())?;
        let form_fields = parse_extra_data(self.extra_data_json.as_deref())?;

        Ok(UploadOptions {
            headers,
            form_fields,
        })
    }
}

/// Parsed form of the JSON options, shared by every request of a batch
#[derive(Debug, Clone, Default)]
pub struct UploadOptions {
    pub headers: HeaderMap,
    /// Extra multipart text fields, in document order
    pub form_fields: Vec<(String, String)>,
}

/// Parse `headers_json` into a header map.
///
/// Missing, blank or `null` input yields an empty map. Values must be JSON
/// strings that are valid header values.
pub fn parse_headers(text: Option<&str>) -> Result<HeaderMap, ConfigurationError> {
    let Some(object) = parse_json_object(text).map_err(ConfigurationError::InvalidHeadersJson)?
    else {
        return Ok(HeaderMap::new());
    };

    let mut headers = HeaderMap::with_capacity(object.len());
    for (name, value) in object {
        let value = match value {
            Value::String(value) => value,
            other => {
                return Err(ConfigurationError::InvalidHeader {
                    reason: format!("expected a string value, got {}", json_kind(&other)),
                    name,
                })
            }
        };

        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| ConfigurationError::InvalidHeader {
                name: name.clone(),
                reason: e.to_string(),
            })?;
        let header_value =
            HeaderValue::from_str(&value).map_err(|e| ConfigurationError::InvalidHeader {
                name: name.clone(),
                reason: e.to_string(),
            })?;

        headers.insert(header_name, header_value);
    }

    Ok(headers)
}

/// Parse `extra_data_json` into multipart text fields.
///
/// Strings are sent verbatim; numbers and booleans are sent in their JSON
/// spelling. Nested values and `null` are rejected.
pub fn parse_extra_data(text: Option<&str>) -> Result<Vec<(String, String)>, ConfigurationError> {
    let Some(object) =
        parse_json_object(text).map_err(ConfigurationError::InvalidExtraDataJson)?
    else {
        return Ok(Vec::new());
    };

    object
        .into_iter()
        .map(|(name, value)| match value {
            Value::String(s) => Ok((name, s)),
            Value::Number(n) => Ok((name, n.to_string())),
            Value::Bool(b) => Ok((name, b.to_string())),
            other => Err(ConfigurationError::InvalidExtraDataJson(format!(
                "field {:?} must be a string, number or boolean, got {}",
                name,
                json_kind(&other)
            ))),
        })
        .collect()
}

fn parse_json_object(text: Option<&str>) -> Result<Option<Map<String, Value>>, String> {
    let text = match text.map(str::trim) {
        Some(t) if !t.is_empty() => t,
        _ => return Ok(None),
    };

    match serde_json::from_str::<Value>(text).map_err(|e| e.to_string())? {
        Value::Object(map) => Ok(Some(map)),
        Value::Null => Ok(None),
        other => Err(format!("expected a JSON object, got {}", json_kind(&other))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
