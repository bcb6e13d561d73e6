//! Marker vocabulary.
//!
//! Markers annotate description nodes (verbs, body, error, query, wildcard). They live in their own
//! key space: a [`Key`] is either a user path segment or a marker, so no path name can ever
//! collide with a marker.

use crate::error::PapiError;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// HTTP verbs a node can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verb {
    Delete,
    Get,
    Patch,
    Post,
    Put,
}

impl Verb {
    pub const ALL: [Verb; 5] = [Verb::Delete, Verb::Get, Verb::Patch, Verb::Post, Verb::Put];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Verb::Delete => "DELETE",
            Verb::Get => "GET",
            Verb::Patch => "PATCH",
            Verb::Post => "POST",
            Verb::Put => "PUT",
        }
    }

    #[must_use]
    pub fn method(self) -> Method {
        match self {
            Verb::Delete => Method::DELETE,
            Verb::Get => Method::GET,
            Verb::Patch => Method::PATCH,
            Verb::Post => Method::POST,
            Verb::Put => Method::PUT,
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verb {
    type Err = PapiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Verb::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| PapiError::Config(format!("Invalid HTTP verb '{name}'")))
    }
}

/// Distinguished, non-path keys of a description node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Marker {
    Verb(Verb),
    Body,
    Error,
    Query,
    Wildcard,
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Marker::Verb(v) => write!(f, "${v}"),
            Marker::Body => f.write_str("$body"),
            Marker::Error => f.write_str("$error"),
            Marker::Query => f.write_str("$query"),
            Marker::Wildcard => f.write_str("$slug"),
        }
    }
}

impl From<Verb> for Marker {
    fn from(v: Verb) -> Self {
        Marker::Verb(v)
    }
}

/// A description-node key: a path segment or a marker.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Key {
    Path(String),
    Marker(Marker),
}

impl Key {
    #[must_use]
    pub fn path(name: impl Into<String>) -> Self {
        Key::Path(name.into())
    }

    #[must_use]
    pub fn is_marker(&self) -> bool {
        matches!(self, Key::Marker(_))
    }
}

impl From<Marker> for Key {
    fn from(m: Marker) -> Self {
        Key::Marker(m)
    }
}

impl From<Verb> for Key {
    fn from(v: Verb) -> Self {
        Key::Marker(Marker::Verb(v))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Path(p) => f.write_str(p),
            Key::Marker(m) => m.fmt(f),
        }
    }
}
