//! HTTP transport seam and response decoding.
//!
//! The engine needs one primitive: send a request, get back a response whose body can be decoded
//! as JSON, text, bytes, a typed blob, or form pairs. [`ReqwestTransport`] is the default
//! implementation; tests and embedders can supply their own [`Transport`].

use crate::config::ParseMode;
use crate::error::{PapiError, Result};
use async_trait::async_trait;
use mime::Mime;
use reqwest::header::{CONTENT_TYPE, HeaderMap};
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

/// A fully assembled outbound request.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    /// Final URL, query string included, exactly as the caller assembled it.
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
    pub timeout: Option<Duration>,
    pub signal: Option<CancellationToken>,
}

/// A buffered response. Status and headers are carried for decoders and embedders; the engine
/// itself never inspects the status.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

/// A decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Bytes(Vec<u8>),
    Blob {
        mime_type: Option<String>,
        bytes: Vec<u8>,
    },
    Form(Vec<(String, String)>),
    Json(Value),
    Text(String),
}

impl Decoded {
    #[must_use]
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Decoded::Json(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_json(self) -> Option<Value> {
        match self {
            Decoded::Json(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Decoded::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Decoded::Bytes(b) | Decoded::Blob { bytes: b, .. } => Some(b),
            _ => None,
        }
    }
}

impl TransportResponse {
    #[must_use]
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    /// # Errors
    ///
    /// Returns [`PapiError::Decode`] if the body is not valid JSON.
    pub fn json(&self) -> Result<Value> {
        serde_json::from_slice(&self.body)
            .map_err(|e| PapiError::Decode(format!("invalid JSON body: {e}")))
    }

    /// Body as UTF-8 text; invalid sequences are replaced.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    #[must_use]
    pub fn array_buffer(&self) -> Vec<u8> {
        self.body.clone()
    }

    #[must_use]
    pub fn blob(&self) -> (Option<String>, Vec<u8>) {
        (self.content_type().map(str::to_string), self.body.clone())
    }

    /// Decode an `application/x-www-form-urlencoded` body into ordered pairs.
    ///
    /// # Errors
    ///
    /// Returns [`PapiError::Decode`] for any other content type (multipart bodies included).
    pub fn form_data(&self) -> Result<Vec<(String, String)>> {
        let ct = self.content_type();
        let parsed = ct.and_then(|c| c.parse::<Mime>().ok());
        match parsed {
            Some(m) if m.essence_str() == mime::APPLICATION_WWW_FORM_URLENCODED.essence_str() => {
                Ok(url::form_urlencoded::parse(&self.body)
                    .into_owned()
                    .collect())
            }
            Some(m) if m.essence_str() == mime::MULTIPART_FORM_DATA.essence_str() => Err(
                PapiError::Decode("multipart form bodies are not supported".to_string()),
            ),
            _ => Err(PapiError::Decode(format!(
                "expected a form content type, got '{}'",
                ct.unwrap_or("none")
            ))),
        }
    }

    /// Decode the body with the given mode.
    ///
    /// # Errors
    ///
    /// Returns [`PapiError::Decode`] when the body does not fit the mode.
    pub fn decode(&self, mode: ParseMode) -> Result<Decoded> {
        Ok(match mode {
            ParseMode::ArrayBuffer => Decoded::Bytes(self.array_buffer()),
            ParseMode::Blob => {
                let (mime_type, bytes) = self.blob();
                Decoded::Blob { mime_type, bytes }
            }
            ParseMode::FormData => Decoded::Form(self.form_data()?),
            ParseMode::Json => Decoded::Json(self.json()?),
            ParseMode::Text => Decoded::Text(self.text()),
        })
    }
}

/// Sends one request and buffers its response.
#[async_trait]
pub trait Transport: Send + Sync {
    /// # Errors
    ///
    /// Returns [`PapiError::Transport`] for network-level failures and [`PapiError::Cancelled`]
    /// when the request's signal fires first.
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse>;
}

/// Default transport backed by `reqwest`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse> {
        let url = Url::parse(&request.url)
            .map_err(|e| PapiError::Transport(format!("Invalid URL: {e}")))?;

        let mut builder = self
            .client
            .request(request.method, url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }
        if let Some(t) = request.timeout {
            builder = builder.timeout(t);
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;
        Ok(TransportResponse::new(status, headers, body.to_vec()))
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, mut request: TransportRequest) -> Result<TransportResponse> {
        let Some(signal) = request.signal.take() else {
            return self.execute(request).await;
        };
        tokio::select! {
            biased;
            () = signal.cancelled() => Err(PapiError::Cancelled),
            res = self.execute(request) => res,
        }
    }
}

/// Drop credentials, query and fragment from a URL so it can be logged.
#[must_use]
pub fn redact_url(url: &Url) -> String {
    let mut u = url.clone();
    let _ = u.set_username("");
    let _ = u.set_password(None);
    u.set_query(None);
    u.set_fragment(None);
    u.to_string()
}

/// Same as [`redact_url`] for unparsed URLs; unparseable input is returned without its query.
#[must_use]
pub fn redact_url_str(url: &str) -> String {
    match Url::parse(url) {
        Ok(u) => redact_url(&u),
        Err(_) => url.split(['?', '#']).next().unwrap_or_default().to_string(),
    }
}

#[must_use]
pub fn sanitize_reqwest_error(e: &reqwest::Error) -> String {
    let mut msg = e.to_string();
    if let Some(u) = e.url() {
        msg = msg.replace(u.as_str(), &redact_url(u));
    }
    msg
}
