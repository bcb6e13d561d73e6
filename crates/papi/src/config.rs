//! Build-time and per-call configuration.

use crate::error::PapiError;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Lease life used by [`LeaseConfig::default`] (5 minutes).
pub const DEFAULT_LEASE_LIFE: Duration = Duration::from_millis(300_000);

/// Configuration for a handle without a lease.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PlainConfig {
    /// Sent as `Authorization: Bearer <apiKey>` on every call.
    #[serde(default)]
    pub api_key: Option<String>,
}

/// Configuration for a leased handle.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LeaseConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    /// Inactivity period after which the handle is revoked (milliseconds on the wire).
    #[serde(with = "duration_ms")]
    pub life: Duration,
}

impl LeaseConfig {
    #[must_use]
    pub fn new(life: Duration) -> Self {
        Self { api_key: None, life }
    }

    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}

impl Default for LeaseConfig {
    fn default() -> Self {
        Self::new(DEFAULT_LEASE_LIFE)
    }
}

/// How to build a handle. The presence of `life` selects a leased handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum BuildConfig {
    Leased(LeaseConfig),
    Plain(PlainConfig),
}

impl<'de> Deserialize<'de> for BuildConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = Map::<String, Value>::deserialize(deserializer)?;
        // A malformed `life` is an error, never a silent fallback to an unleased handle.
        if map.contains_key("life") {
            LeaseConfig::deserialize(Value::Object(map))
                .map(BuildConfig::Leased)
                .map_err(D::Error::custom)
        } else {
            PlainConfig::deserialize(Value::Object(map))
                .map(BuildConfig::Plain)
                .map_err(D::Error::custom)
        }
    }
}

impl BuildConfig {
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        match self {
            BuildConfig::Leased(c) => c.api_key.as_deref(),
            BuildConfig::Plain(c) => c.api_key.as_deref(),
        }
    }

    #[must_use]
    pub fn lease_life(&self) -> Option<Duration> {
        match self {
            BuildConfig::Leased(c) => Some(c.life),
            BuildConfig::Plain(_) => None,
        }
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        BuildConfig::Plain(PlainConfig::default())
    }
}

impl From<PlainConfig> for BuildConfig {
    fn from(c: PlainConfig) -> Self {
        BuildConfig::Plain(c)
    }
}

impl From<LeaseConfig> for BuildConfig {
    fn from(c: LeaseConfig) -> Self {
        BuildConfig::Leased(c)
    }
}

/// Response decoding mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ParseMode {
    /// Raw bytes.
    ArrayBuffer,
    /// Raw bytes tagged with the response content type.
    Blob,
    /// `application/x-www-form-urlencoded` pairs.
    FormData,
    #[default]
    Json,
    Text,
}

impl ParseMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ParseMode::ArrayBuffer => "arrayBuffer",
            ParseMode::Blob => "blob",
            ParseMode::FormData => "formData",
            ParseMode::Json => "json",
            ParseMode::Text => "text",
        }
    }
}

impl FromStr for ParseMode {
    type Err = PapiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        [
            ParseMode::ArrayBuffer,
            ParseMode::Blob,
            ParseMode::FormData,
            ParseMode::Json,
            ParseMode::Text,
        ]
        .into_iter()
        .find(|m| m.as_str().eq_ignore_ascii_case(name))
        .ok_or_else(|| PapiError::Config(format!("Invalid parse mode '{name}'")))
    }
}

/// Per-invocation options for a [`crate::Caller`].
///
/// `query`, `data` and `parse` are interpreted by the caller; `headers`, `timeout` and `signal`
/// are passed through to the transport.
#[derive(Debug, Clone, Default)]
pub struct CallConfig {
    /// Query parameters, serialized in this order.
    pub query: Vec<(String, Value)>,
    /// Request payload, sent as a JSON body.
    pub data: Option<Value>,
    pub parse: ParseMode,
    pub headers: HeaderMap,
    pub timeout: Option<Duration>,
    /// Cancels the in-flight request when triggered.
    pub signal: Option<CancellationToken>,
}

impl CallConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a query parameter. Setting a name again replaces its value in place.
    #[must_use]
    pub fn query(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.query.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.query.push((name, value)),
        }
        self
    }

    #[must_use]
    pub fn data(mut self, data: impl Into<Value>) -> Self {
        self.data = Some(data.into());
        self
    }

    #[must_use]
    pub fn parse(mut self, mode: ParseMode) -> Self {
        self.parse = mode;
        self
    }

    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn signal(mut self, signal: CancellationToken) -> Self {
        self.signal = Some(signal);
        self
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
