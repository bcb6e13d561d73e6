//! Description tree.
//!
//! A [`Node`] is an immutable description of one API level: child path segments, declared verbs
//! with their response shapes, and the optional body / error / query / wildcard annotations.
//! Every builder method consumes the node and returns a new one.
//!
//! Shapes are advisory. They document what an endpoint accepts or returns and are never checked
//! against real traffic.

use crate::markers::{Key, Marker, Verb};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Advisory payload shape (example value, JSON-schema fragment, or anything else useful to a
/// reader). Never validated at runtime.
pub type Shape = Value;

/// Query annotation of a node.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QuerySpec {
    /// Shape of the accepted query parameters.
    pub params: Shape,
    /// Alternate per-verb responses when query parameters are supplied.
    pub alternate: Option<Arc<Node>>,
}

/// Borrowed view of the value stored under a [`Key`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Entry<'a> {
    /// A child path or the wildcard node.
    Node(&'a Node),
    /// A verb response, body or error shape.
    Shape(&'a Shape),
    Query(&'a QuerySpec),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Node {
    children: BTreeMap<String, Arc<Node>>,
    verbs: BTreeMap<Verb, Shape>,
    body: Option<Shape>,
    error: Option<Shape>,
    query: Option<QuerySpec>,
    wildcard: Option<Arc<Node>>,
}

impl Node {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Chainable builder
    // ------------------------------------------------------------------

    /// Declare `verb` at this level with the shape of its response.
    #[must_use]
    pub fn endpoint(mut self, verb: Verb, response: impl Into<Shape>) -> Self {
        self.verbs.insert(verb, response.into());
        self
    }

    /// Declare the shape of request bodies accepted at this level.
    #[must_use]
    pub fn body(mut self, shape: impl Into<Shape>) -> Self {
        self.body = Some(shape.into());
        self
    }

    /// Declare the shape of error responses at this level.
    #[must_use]
    pub fn error(mut self, shape: impl Into<Shape>) -> Self {
        self.error = Some(shape.into());
        self
    }

    /// Declare accepted query parameters.
    #[must_use]
    pub fn query(mut self, params: impl Into<Shape>) -> Self {
        self.query = Some(QuerySpec {
            params: params.into(),
            alternate: None,
        });
        self
    }

    /// Declare accepted query parameters along with the responses returned when they are used.
    #[must_use]
    pub fn query_with(mut self, params: impl Into<Shape>, build: impl FnOnce(Node) -> Node) -> Self {
        self.query = Some(QuerySpec {
            params: params.into(),
            alternate: Some(Arc::new(build(Node::new()))),
        });
        self
    }

    /// Declare the level reachable through any caller-supplied segment (`/items/{id}`).
    #[must_use]
    pub fn slug(self, build: impl FnOnce(Node) -> Node) -> Self {
        self.with_wildcard(build(Node::new()))
    }

    /// Declare a literal child path.
    #[must_use]
    pub fn path(self, name: impl Into<String>, build: impl FnOnce(Node) -> Node) -> Self {
        self.with_child(name, build(Node::new()))
    }

    #[must_use]
    pub fn with_child(mut self, name: impl Into<String>, child: Node) -> Self {
        self.children.insert(name.into(), Arc::new(child));
        self
    }

    #[must_use]
    pub fn with_wildcard(mut self, wildcard: Node) -> Self {
        self.wildcard = Some(Arc::new(wildcard));
        self
    }

    #[must_use]
    pub fn with_query_spec(mut self, spec: QuerySpec) -> Self {
        self.query = Some(spec);
        self
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Arc<Node>> {
        self.children.get(name)
    }

    #[must_use]
    pub fn wildcard(&self) -> Option<&Arc<Node>> {
        self.wildcard.as_ref()
    }

    #[must_use]
    pub fn declares(&self, verb: Verb) -> bool {
        self.verbs.contains_key(&verb)
    }

    #[must_use]
    pub fn shape(&self, verb: Verb) -> Option<&Shape> {
        self.verbs.get(&verb)
    }

    pub fn verbs(&self) -> impl Iterator<Item = Verb> + '_ {
        self.verbs.keys().copied()
    }

    #[must_use]
    pub fn body_shape(&self) -> Option<&Shape> {
        self.body.as_ref()
    }

    #[must_use]
    pub fn error_shape(&self) -> Option<&Shape> {
        self.error.as_ref()
    }

    #[must_use]
    pub fn query_spec(&self) -> Option<&QuerySpec> {
        self.query.as_ref()
    }

    #[must_use]
    pub fn get(&self, key: &Key) -> Option<Entry<'_>> {
        match key {
            Key::Path(name) => self.children.get(name).map(|n| Entry::Node(n.as_ref())),
            Key::Marker(Marker::Verb(v)) => self.verbs.get(v).map(Entry::Shape),
            Key::Marker(Marker::Body) => self.body.as_ref().map(Entry::Shape),
            Key::Marker(Marker::Error) => self.error.as_ref().map(Entry::Shape),
            Key::Marker(Marker::Query) => self.query.as_ref().map(Entry::Query),
            Key::Marker(Marker::Wildcard) => self.wildcard.as_deref().map(Entry::Node),
        }
    }

    /// Every declared key: markers first, then child paths in name order.
    #[must_use]
    pub fn keys(&self) -> Vec<Key> {
        let mut out: Vec<Key> = self.verbs.keys().map(|v| Key::from(*v)).collect();
        if self.body.is_some() {
            out.push(Marker::Body.into());
        }
        if self.error.is_some() {
            out.push(Marker::Error.into());
        }
        if self.query.is_some() {
            out.push(Marker::Query.into());
        }
        if self.wildcard.is_some() {
            out.push(Marker::Wildcard.into());
        }
        out.extend(self.children.keys().cloned().map(Key::Path));
        out
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys().is_empty()
    }

    /// Shallow per-key merge: start from `base`, then apply every entry of `self` on top.
    #[must_use]
    pub fn overlay(&self, base: &Node) -> Node {
        let mut children = base.children.clone();
        children.extend(self.children.iter().map(|(k, v)| (k.clone(), Arc::clone(v))));
        let mut verbs = base.verbs.clone();
        verbs.extend(self.verbs.iter().map(|(k, v)| (*k, v.clone())));

        Node {
            children,
            verbs,
            body: self.body.clone().or_else(|| base.body.clone()),
            error: self.error.clone().or_else(|| base.error.clone()),
            query: self.query.clone().or_else(|| base.query.clone()),
            wildcard: self.wildcard.clone().or_else(|| base.wildcard.clone()),
        }
    }

    /// Declared `(verb, route template)` pairs under this node. Wildcard levels render as
    /// `{slug}`; the node itself is `/`.
    #[must_use]
    pub fn routes(&self) -> Vec<(Verb, String)> {
        let mut out = Vec::new();
        self.collect_routes("", &mut out);
        out.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)));
        out
    }

    fn collect_routes(&self, prefix: &str, out: &mut Vec<(Verb, String)>) {
        let here = if prefix.is_empty() { "/" } else { prefix };
        for verb in self.verbs.keys() {
            out.push((*verb, here.to_string()));
        }
        for (name, child) in &self.children {
            child.collect_routes(&format!("{prefix}/{name}"), out);
        }
        if let Some(w) = &self.wildcard {
            w.collect_routes(&format!("{prefix}/{{slug}}"), out);
        }
    }
}
