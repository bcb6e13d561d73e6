//! Tree documents: description trees stored as YAML or JSON.
//!
//! ```yaml
//! baseUrl: https://jsonplaceholder.typicode.com
//! life: 300000          # optional, milliseconds; makes the handle leased
//! tree:
//!   paths:
//!     albums:
//!       get: [{ id: 0, title: "" }]
//!       query:
//!         params: { userId: 0 }
//!       slug:
//!         get: { id: 0, title: "" }
//!         paths:
//!           photos:
//!             get: []
//! ```
//!
//! Child paths live under `paths`, so a path may be called `get` or `slug` without clashing with
//! the marker keys.

use crate::config::{BuildConfig, LeaseConfig, PlainConfig};
use crate::dispatch::ApiBuilder;
use crate::error::{PapiError, Result};
use crate::markers::Verb;
use crate::tree::{Node, QuerySpec};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NodeDocument {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub paths: BTreeMap<String, NodeDocument>,

    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub get: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub post: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub put: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub patch: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub delete: Option<Value>,

    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<QueryDocument>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<Box<NodeDocument>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct QueryDocument {
    #[serde(default)]
    pub params: Value,
    /// Responses returned when query parameters are supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responses: Option<Box<NodeDocument>>,
}

/// A declared key maps to `Some`, even when its shape is `null`.
fn present<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Option<Value>, D::Error> {
    Value::deserialize(d).map(Some)
}

impl From<NodeDocument> for Node {
    fn from(doc: NodeDocument) -> Self {
        let verbs = [
            (Verb::Get, doc.get),
            (Verb::Post, doc.post),
            (Verb::Put, doc.put),
            (Verb::Patch, doc.patch),
            (Verb::Delete, doc.delete),
        ];

        let mut node = Node::new();
        for (verb, shape) in verbs {
            if let Some(shape) = shape {
                node = node.endpoint(verb, shape);
            }
        }
        if let Some(body) = doc.body {
            node = node.body(body);
        }
        if let Some(error) = doc.error {
            node = node.error(error);
        }
        if let Some(query) = doc.query {
            node = node.with_query_spec(QuerySpec {
                params: query.params,
                alternate: query.responses.map(|r| Arc::new(Node::from(*r))),
            });
        }
        if let Some(slug) = doc.slug {
            node = node.with_wildcard(Node::from(*slug));
        }
        for (name, child) in doc.paths {
            node = node.with_child(name, Node::from(child));
        }
        node
    }
}

/// A complete API description: base URL, build options, and tree.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ApiDocument {
    pub base_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Lease life in milliseconds; absent means no lease.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub life: Option<u64>,
    #[serde(default)]
    pub tree: NodeDocument,
}

impl ApiDocument {
    /// Load a document; `.yaml`/`.yml` files are read as YAML, anything else as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`PapiError::Document`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let location = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|e| PapiError::Document {
            location: location.clone(),
            message: e.to_string(),
        })?;

        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));
        if is_yaml {
            Self::from_yaml_str(&text, &location)
        } else {
            Self::from_json_str(&text, &location)
        }
    }

    /// # Errors
    ///
    /// Returns [`PapiError::Document`] if `text` is not a valid document.
    pub fn from_yaml_str(text: &str, location: &str) -> Result<Self> {
        serde_yaml::from_str(text).map_err(|e| PapiError::Document {
            location: location.to_string(),
            message: e.to_string(),
        })
    }

    /// # Errors
    ///
    /// Returns [`PapiError::Document`] if `text` is not a valid document.
    pub fn from_json_str(text: &str, location: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| PapiError::Document {
            location: location.to_string(),
            message: e.to_string(),
        })
    }

    #[must_use]
    pub fn build_config(&self) -> BuildConfig {
        match self.life {
            Some(ms) => BuildConfig::Leased(LeaseConfig {
                api_key: self.api_key.clone(),
                life: Duration::from_millis(ms),
            }),
            None => BuildConfig::Plain(PlainConfig {
                api_key: self.api_key.clone(),
            }),
        }
    }

    #[must_use]
    pub fn into_builder(self) -> ApiBuilder {
        ApiBuilder::with_root(self.base_url, Node::from(self.tree))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const YAML: &str = r#"
baseUrl: https://jsonplaceholder.typicode.com
apiKey: k
life: 1000
tree:
  paths:
    albums:
      get: [{ id: 0 }]
      delete: ~
      query:
        params: { userId: 0 }
        responses:
          get: [{ id: 0, userId: 0 }]
      slug:
        get: { id: 0 }
        paths:
          photos:
            get: []
    get:
      post: {}
"#;

    #[test]
    fn yaml_document_builds_tree() {
        let doc = ApiDocument::from_yaml_str(YAML, "inline").expect("doc");
        assert_eq!(
            doc.build_config(),
            BuildConfig::Leased(LeaseConfig {
                api_key: Some("k".to_string()),
                life: Duration::from_millis(1000),
            })
        );

        let builder = doc.into_builder();
        let root = builder.root();
        let albums = root.child("albums").expect("albums");
        assert_eq!(albums.shape(Verb::Get), Some(&json!([{"id": 0}])));
        // `delete: ~` still declares the verb.
        assert_eq!(albums.shape(Verb::Delete), Some(&Value::Null));
        let query = albums.query_spec().expect("query");
        assert_eq!(query.params, json!({"userId": 0}));
        assert!(query.alternate.as_ref().is_some_and(|n| n.declares(Verb::Get)));
        let slug = albums.wildcard().expect("slug");
        assert!(slug.child("photos").is_some_and(|p| p.declares(Verb::Get)));

        // A path called `get` is a path, not a verb.
        assert!(!root.declares(Verb::Get));
        assert!(root.child("get").is_some_and(|n| n.declares(Verb::Post)));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = ApiDocument::from_json_str(
            r#"{"baseUrl": "https://x.test", "tree": {"albums": {}}}"#,
            "inline.json",
        )
        .unwrap_err();
        assert!(matches!(err, PapiError::Document { ref location, .. } if location == "inline.json"));
    }

    #[test]
    fn load_picks_format_from_extension() {
        let dir = tempfile::tempdir().expect("tempdir");
        let yaml = dir.path().join("api.yml");
        std::fs::write(&yaml, YAML).expect("write");
        let doc = ApiDocument::load(&yaml).expect("yaml doc");
        assert_eq!(doc.life, Some(1000));

        let json_path = dir.path().join("api.json");
        std::fs::write(
            &json_path,
            r#"{"baseUrl": "https://x.test", "tree": {"get": [0]}}"#,
        )
        .expect("write");
        let doc = ApiDocument::load(&json_path).expect("json doc");
        assert_eq!(doc.build_config(), BuildConfig::default());
        assert!(Node::from(doc.tree).declares(Verb::Get));

        let missing = ApiDocument::load(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(missing, PapiError::Document { .. }));
    }
}
