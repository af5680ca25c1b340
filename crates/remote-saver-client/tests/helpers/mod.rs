//! Shared fixtures for upload tests

use async_trait::async_trait;
use remote_saver_client::{Transport, TransportError, TransportResponse, UploadRequest};
use remote_saver_core::RawImage;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Transport that records every request and replays scripted outcomes.
///
/// Once the script runs out every further call gets a `200 {"status":"ok"}`.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    requests: Arc<Mutex<Vec<UploadRequest>>>,
    script: Arc<Mutex<VecDeque<Result<TransportResponse, TransportError>>>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, status: u16, body: &str) -> Self {
        self.push(Ok(TransportResponse::new(status, body)))
    }

    pub fn fail(self, error: TransportError) -> Self {
        self.push(Err(error))
    }

    fn push(self, outcome: Result<TransportResponse, TransportError>) -> Self {
        self.script.lock().unwrap().push_back(outcome);
        self
    }

    pub fn requests(&self) -> Vec<UploadRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: UploadRequest) -> Result<TransportResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(TransportResponse::new(200, r#"{"status":"ok"}"#)))
    }
}

/// Small RGB test batch of `count` distinct flat-color images.
pub fn rgb_batch(count: usize) -> Vec<RawImage> {
    (0..count)
        .map(|i| {
            let shade = (i as f32 + 1.0) / (count as f32 + 1.0);
            RawImage::filled(8, 8, &[shade, 0.25, 0.75])
        })
        .collect()
}
