//! Error types for `papi`.

use crate::markers::Verb;
use thiserror::Error;

/// Main error type for handle navigation, calls and configuration.
#[derive(Error, Debug)]
pub enum PapiError {
    /// Navigation matched neither a declared child path nor a wildcard.
    #[error("no route for segment '{segment}' under '{url}'")]
    DeadEnd { url: String, segment: String },

    /// A verb was read on a node that does not declare it.
    #[error("{verb} is not declared for '{url}'")]
    UndeclaredVerb { url: String, verb: Verb },

    /// The handle's lease expired; the handle is permanently unusable.
    #[error("handle revoked: lease expired after inactivity")]
    Revoked,

    /// The HTTP transport failed (network, TLS, invalid URL, timeout).
    #[error("transport error: {0}")]
    Transport(String),

    /// The caller's cancellation signal fired before the response arrived.
    #[error("request cancelled")]
    Cancelled,

    /// The response body could not be decoded with the selected parse mode.
    #[error("decode error: {0}")]
    Decode(String),

    /// Invalid build-time configuration (base URL, API key, verb names).
    #[error("config error: {0}")]
    Config(String),

    /// A tree document could not be read or parsed.
    #[error("document error: failed to load '{location}': {message}")]
    Document { location: String, message: String },

    /// JSON serialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PapiError {
    /// True for failures raised synchronously by navigation or lease checks, before any I/O.
    #[must_use]
    pub fn is_access_error(&self) -> bool {
        matches!(
            self,
            Self::DeadEnd { .. } | Self::UndeclaredVerb { .. } | Self::Revoked
        )
    }
}

/// Result type alias for `papi` operations.
pub type Result<T> = std::result::Result<T, PapiError>;

impl From<reqwest::Error> for PapiError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport(crate::transport::sanitize_reqwest_error(&value))
    }
}
