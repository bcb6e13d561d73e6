//! Description-driven HTTP API client handles.
//!
//! A [`tree::Node`] describes the routes, verbs and (advisory) payload shapes of an API. Building
//! it through [`dispatch::ApiBuilder`] yields a [`dispatch::Handle`] that navigates the tree one
//! path segment at a time and issues HTTP calls at verb-bearing nodes:
//!
//! ```no_run
//! # async fn demo() -> papi::error::Result<()> {
//! use papi::{ApiBuilder, BuildConfig, CallConfig, Verb};
//! use serde_json::json;
//!
//! let api = ApiBuilder::new("https://jsonplaceholder.typicode.com")
//!     .path("albums", |albums| {
//!         albums
//!             .endpoint(Verb::Get, json!([{ "id": 0, "title": "" }]))
//!             .slug(|id| id.path("photos", |p| p.endpoint(Verb::Get, json!([]))))
//!     })
//!     .build(BuildConfig::default())?;
//!
//! let photos = api.path("albums/3/photos")?.call(Verb::Get, CallConfig::new()).await?;
//! # let _ = photos;
//! # Ok(())
//! # }
//! ```
//!
//! Handles may be leased ([`config::LeaseConfig`]): every call refreshes the lease, and a handle
//! left idle for the whole lease life is revoked for good.

pub mod caller;
pub mod config;
pub mod dispatch;
pub mod document;
pub mod error;
pub mod lease;
pub mod markers;
pub mod transport;
pub mod tree;

pub use caller::Caller;
pub use config::{BuildConfig, CallConfig, LeaseConfig, ParseMode, PlainConfig};
pub use dispatch::{ApiBuilder, Handle};
pub use error::{PapiError, Result};
pub use lease::{Lease, LeaseStatus};
pub use markers::{Key, Marker, Verb};
pub use transport::{Decoded, ReqwestTransport, Transport, TransportRequest, TransportResponse};
pub use tree::{Node, QuerySpec, Shape};
