//! Dispatch engine: lazily navigable handles over a description tree.
//!
//! Navigation rules for `handle.at(p)` on a handle over node `N`:
//! 1. `N` has a literal child `p`: the next handle is over that child, with the child's own
//!    wildcard entries merged underneath its own entries (own entries win).
//! 2. Otherwise `N` declares a wildcard: `p` is a slug value and the next handle is over the
//!    wildcard node.
//! 3. Otherwise navigation fails with [`PapiError::DeadEnd`].
//!
//! Either way the next URL is `url + "/" + p`. Nothing is precomputed: each step builds exactly one
//! handle.

use crate::caller::Caller;
use crate::config::{BuildConfig, CallConfig};
use crate::error::{PapiError, Result};
use crate::lease::Lease;
use crate::markers::Verb;
use crate::transport::{Decoded, ReqwestTransport, Transport};
use crate::tree::{Node, Shape};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// State shared by every handle and caller derived from one build.
pub(crate) struct Binding {
    pub(crate) transport: Arc<dyn Transport>,
    /// Bound-time headers (authorization).
    pub(crate) headers: HeaderMap,
    pub(crate) lease: Option<Arc<Lease>>,
}

/// Chainable entry point: a base URL plus the root description node.
#[derive(Debug, Clone)]
pub struct ApiBuilder {
    base_url: String,
    root: Node,
}

impl ApiBuilder {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_root(base_url, Node::new())
    }

    /// Start from an already assembled root node.
    #[must_use]
    pub fn with_root(base_url: impl Into<String>, root: Node) -> Self {
        Self {
            base_url: base_url.into(),
            root,
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn root(&self) -> &Node {
        &self.root
    }

    #[must_use]
    pub fn path(mut self, name: impl Into<String>, build: impl FnOnce(Node) -> Node) -> Self {
        self.root = self.root.path(name, build);
        self
    }

    #[must_use]
    pub fn slug(mut self, build: impl FnOnce(Node) -> Node) -> Self {
        self.root = self.root.slug(build);
        self
    }

    #[must_use]
    pub fn endpoint(mut self, verb: Verb, response: impl Into<Shape>) -> Self {
        self.root = self.root.endpoint(verb, response);
        self
    }

    #[must_use]
    pub fn body(mut self, shape: impl Into<Shape>) -> Self {
        self.root = self.root.body(shape);
        self
    }

    #[must_use]
    pub fn error(mut self, shape: impl Into<Shape>) -> Self {
        self.root = self.root.error(shape);
        self
    }

    #[must_use]
    pub fn query(mut self, params: impl Into<Shape>) -> Self {
        self.root = self.root.query(params);
        self
    }

    #[must_use]
    pub fn query_with(mut self, params: impl Into<Shape>, build: impl FnOnce(Node) -> Node) -> Self {
        self.root = self.root.query_with(params, build);
        self
    }

    /// Build a handle that talks HTTP through `reqwest`.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is not an absolute URL or the API key is not a valid
    /// header value.
    pub fn build(&self, cfg: impl Into<BuildConfig>) -> Result<Handle> {
        self.build_with_transport(cfg, Arc::new(ReqwestTransport::new()))
    }

    /// Build a handle over a custom transport.
    ///
    /// # Errors
    ///
    /// Same as [`ApiBuilder::build`].
    pub fn build_with_transport(
        &self,
        cfg: impl Into<BuildConfig>,
        transport: Arc<dyn Transport>,
    ) -> Result<Handle> {
        let cfg = cfg.into();
        Url::parse(&self.base_url).map_err(|e| {
            PapiError::Config(format!("Invalid base URL '{}': {e}", self.base_url))
        })?;

        let mut headers = HeaderMap::new();
        if let Some(key) = cfg.api_key() {
            let mut value = HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|_| PapiError::Config("Invalid apiKey: not a valid header value".into()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let lease = cfg.lease_life().map(|life| {
            debug!(life_ms = %life.as_millis(), "building leased handle");
            Arc::new(Lease::new(life))
        });

        Ok(Handle {
            node: Arc::new(self.root.clone()),
            url: self.base_url.trim_end_matches('/').to_string(),
            binding: Arc::new(Binding {
                transport,
                headers,
                lease,
            }),
        })
    }
}

/// A navigable view of one tree level at an accumulated URL.
#[derive(Clone)]
pub struct Handle {
    node: Arc<Node>,
    url: String,
    binding: Arc<Binding>,
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("url", &self.url)
            .field("leased", &self.binding.lease.is_some())
            .finish_non_exhaustive()
    }
}

impl Handle {
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn node(&self) -> &Node {
        &self.node
    }

    #[must_use]
    pub fn lease(&self) -> Option<&Lease> {
        self.binding.lease.as_deref()
    }

    /// Navigate one segment. Numbers and other displayable values are accepted as slugs.
    ///
    /// # Errors
    ///
    /// Returns [`PapiError::Revoked`] if the lease has expired and [`PapiError::DeadEnd`] if the
    /// segment matches neither a child nor a wildcard.
    pub fn at(&self, segment: impl fmt::Display) -> Result<Handle> {
        self.check_lease()?;
        let segment = segment.to_string();

        let node = if let Some(child) = self.node.child(&segment) {
            match child.wildcard() {
                Some(wildcard) => Arc::new(child.overlay(wildcard)),
                None => Arc::clone(child),
            }
        } else if let Some(wildcard) = self.node.wildcard() {
            Arc::clone(wildcard)
        } else {
            return Err(PapiError::DeadEnd {
                url: self.url.clone(),
                segment,
            });
        };

        Ok(Handle {
            node,
            url: format!("{}/{segment}", self.url),
            binding: Arc::clone(&self.binding),
        })
    }

    /// Navigate a `/`-separated path; empty segments are skipped.
    ///
    /// # Errors
    ///
    /// Same as [`Handle::at`], for the first failing segment.
    pub fn path(&self, path: &str) -> Result<Handle> {
        self.check_lease()?;
        path.split('/')
            .filter(|s| !s.is_empty())
            .try_fold(self.clone(), |h, segment| h.at(segment))
    }

    /// Bind a caller for a verb declared at this level.
    ///
    /// # Errors
    ///
    /// Returns [`PapiError::Revoked`] if the lease has expired and [`PapiError::UndeclaredVerb`]
    /// if this level does not declare `verb`.
    pub fn verb(&self, verb: Verb) -> Result<Caller> {
        self.check_lease()?;
        if !self.node.declares(verb) {
            return Err(PapiError::UndeclaredVerb {
                url: self.url.clone(),
                verb,
            });
        }
        Ok(Caller::new(self.url.clone(), verb, Arc::clone(&self.binding)))
    }

    /// Shorthand for `self.verb(verb)?.call(cfg)`.
    ///
    /// # Errors
    ///
    /// See [`Handle::verb`] and [`Caller::call`].
    pub async fn call(&self, verb: Verb, cfg: CallConfig) -> Result<Decoded> {
        self.verb(verb)?.call(cfg).await
    }

    fn check_lease(&self) -> Result<()> {
        match &self.binding.lease {
            Some(lease) => lease.check(),
            None => Ok(()),
        }
    }
}
