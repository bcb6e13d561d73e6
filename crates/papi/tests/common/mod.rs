#![allow(dead_code)]

use async_trait::async_trait;
use papi::{Result, Transport, TransportRequest, TransportResponse};
use parking_lot::Mutex;
use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::{Value, json};
use std::sync::Arc;

type Responder = Box<dyn Fn(&TransportRequest) -> Value + Send + Sync>;

/// In-memory transport: records every request and answers with JSON from a responder.
pub struct MockTransport {
    requests: Mutex<Vec<TransportRequest>>,
    respond: Responder,
}

impl MockTransport {
    /// Answers `{"method": ..., "url": ...}` for every request.
    pub fn echo() -> Arc<Self> {
        Self::responding(|req| json!({ "method": req.method.as_str(), "url": req.url }))
    }

    pub fn responding(f: impl Fn(&TransportRequest) -> Value + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            respond: Box::new(f),
        })
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.requests
            .lock()
            .iter()
            .map(|r| (r.method.to_string(), r.url.clone()))
            .collect()
    }

    pub fn last(&self) -> Option<TransportRequest> {
        self.requests.lock().last().cloned()
    }

    pub fn count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse> {
        let body = (self.respond)(&request);
        self.requests.lock().push(request);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(TransportResponse::new(
            StatusCode::OK,
            headers,
            serde_json::to_vec(&body)?,
        ))
    }
}
