//! Transport abstraction
//!
//! The upload loop talks to the network only through [`Transport`], so the
//! response handling can be exercised without a server. [`HttpTransport`] is
//! the reqwest-backed implementation used in production.

use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use remote_saver_core::{ErrorMetadata, LogLevel};
use reqwest::header::HeaderMap;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use std::error::Error as StdError;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::time::Duration;

/// Everything needed to send one image
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub url: String,
    pub headers: HeaderMap,
    /// Multipart field name of the file part
    pub field_name: String,
    pub filename: String,
    pub mime_type: &'static str,
    pub data: Bytes,
    /// Extra multipart text fields, sent before the file part
    pub form_fields: Vec<(String, String)>,
}

/// Status and body of a completed HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    /// Canonical reason phrase, when the status code has one
    pub reason: Option<&'static str>,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        let reason = reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|code| code.canonical_reason());

        Self {
            status,
            reason,
            body: body.into(),
        }
    }

    /// Any status of 400 or above counts as a failed upload.
    pub fn is_failure(&self) -> bool {
        self.status >= 400
    }

    /// e.g. `"500 Internal Server Error"`
    pub fn status_line(&self) -> String {
        match self.reason {
            Some(reason) => format!("{} {}", self.status, reason),
            None => self.status.to_string(),
        }
    }
}

/// Failures before a complete HTTP response was received
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error(
        "Request timed out{}",
        .0.map(|secs| format!(" after {} seconds", secs)).unwrap_or_default()
    )]
    Timeout(Option<u64>),

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Failed to read response body: {0}")]
    Body(String),
}

impl ErrorMetadata for TransportError {
    fn error_code(&self) -> &'static str {
        match self {
            TransportError::Timeout(_) => "TIMEOUT",
            TransportError::Connect(_) => "CONNECTION_FAILED",
            TransportError::InvalidRequest(_) => "INVALID_REQUEST",
            TransportError::Body(_) => "RESPONSE_BODY_ERROR",
        }
    }

    fn is_recoverable(&self) -> bool {
        !matches!(self, TransportError::InvalidRequest(_))
    }

    fn log_level(&self) -> LogLevel {
        LogLevel::Error
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: UploadRequest) -> Result<TransportResponse, TransportError>;
}

/// reqwest-backed transport
pub struct HttpTransport {
    client: Client,
    timeout: Option<Duration>,
}

impl Debug for HttpTransport {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("HttpTransport")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl HttpTransport {
    /// Transport without a request timeout of its own.
    pub fn new() -> Result<Self> {
        Self::with_timeout(None)
    }

    pub fn with_timeout(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .context("Failed to create HTTP client for uploads")?;

        Ok(Self { client, timeout })
    }

    fn build_form(
        field_name: String,
        filename: String,
        mime_type: &str,
        data: Bytes,
        form_fields: Vec<(String, String)>,
    ) -> Result<Form, TransportError> {
        let part = Part::bytes(data.to_vec())
            .file_name(filename)
            .mime_str(mime_type)
            .map_err(|e| TransportError::InvalidRequest(describe(&e)))?;

        let form = form_fields
            .into_iter()
            .fold(Form::new(), |form, (name, value)| form.text(name, value));

        Ok(form.part(field_name, part))
    }

    fn classify_error(&self, err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout(self.timeout.map(|t| t.as_secs()))
        } else if err.is_builder() {
            TransportError::InvalidRequest(describe(&err))
        } else {
            TransportError::Connect(describe(&err))
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: UploadRequest) -> Result<TransportResponse, TransportError> {
        let UploadRequest {
            url,
            headers,
            field_name,
            filename,
            mime_type,
            data,
            form_fields,
        } = request;

        let form = Self::build_form(field_name, filename, mime_type, data, form_fields)?;

        let response = self
            .client
            .post(&url)
            .headers(headers)
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.classify_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout(self.timeout.map(|t| t.as_secs()))
            } else {
                TransportError::Body(describe(&e))
            }
        })?;

        Ok(TransportResponse {
            status: status.as_u16(),
            reason: status.canonical_reason(),
            body,
        })
    }
}

/// Error message with its source chain, e.g.
/// `error sending request for url (...): client error (Connect): Connection refused`.
fn describe(err: &dyn StdError) -> String {
    let mut details = err.to_string();
    let mut source = err.source();
    let mut depth = 0;

    while let Some(cause) = source {
        depth += 1;
        if depth > 5 {
            break;
        }
        let cause_text = cause.to_string();
        if !details.contains(&cause_text) {
            details.push_str(": ");
            details.push_str(&cause_text);
        }
        source = cause.source();
    }

    details
}
