//! Request caller: the terminal operation bound to a verb at a URL.

use crate::config::{CallConfig, ParseMode};
use crate::dispatch::Binding;
use crate::error::Result;
use crate::markers::Verb;
use crate::transport::{Decoded, TransportRequest, redact_url_str};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Issues one HTTP call per [`Caller::call`].
#[derive(Clone)]
pub struct Caller {
    url: String,
    verb: Verb,
    binding: Arc<Binding>,
}

impl fmt::Debug for Caller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Caller")
            .field("url", &self.url)
            .field("verb", &self.verb)
            .finish_non_exhaustive()
    }
}

impl Caller {
    pub(crate) fn new(url: String, verb: Verb, binding: Arc<Binding>) -> Self {
        Self { url, verb, binding }
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn verb(&self) -> Verb {
        self.verb
    }

    /// Perform the call and decode the response with `cfg.parse`.
    ///
    /// The decoded value is returned as-is: the status code is not inspected and declared error
    /// shapes are not matched.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the handle's lease has expired (before any I/O)
    /// - the transport fails or the call is cancelled
    /// - the body does not decode under the selected parse mode
    pub async fn call(&self, cfg: CallConfig) -> Result<Decoded> {
        if let Some(lease) = &self.binding.lease {
            lease.refresh()?;
        }

        let (request, parse) = self.prepare(cfg)?;
        let redacted = redact_url_str(&request.url);
        debug!(method = %self.verb, url = %redacted, "sending request");

        let response = self.binding.transport.send(request).await?;
        debug!(
            method = %self.verb,
            url = %redacted,
            status = response.status.as_u16(),
            "received response"
        );

        response.decode(parse)
    }

    /// Assemble the outbound request without sending it.
    pub(crate) fn prepare(&self, cfg: CallConfig) -> Result<(TransportRequest, ParseMode)> {
        let CallConfig {
            query,
            data,
            parse,
            headers,
            timeout,
            signal,
        } = cfg;

        let query = build_query_string(&query);
        let url = if query.is_empty() {
            self.url.clone()
        } else {
            format!("{}?{query}", self.url)
        };

        let body = data.as_ref().map(serde_json::to_vec).transpose()?;

        let mut merged = HeaderMap::new();
        if body.is_some() {
            merged.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        merged.extend(self.binding.headers.clone());
        merged.extend(headers);

        Ok((
            TransportRequest {
                method: self.verb.method(),
                url,
                headers: merged,
                body,
                timeout,
                signal,
            },
            parse,
        ))
    }
}

/// Join `name=value` pairs with `&`, in order. Names and values are not percent-encoded.
#[must_use]
pub fn build_query_string(params: &[(String, Value)]) -> String {
    params
        .iter()
        .map(|(name, value)| format!("{name}={}", value_to_string(value)))
        .collect::<Vec<_>>()
        .join("&")
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(items) => items
            .iter()
            .map(value_to_string)
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => value.to_string(),
    }
}
