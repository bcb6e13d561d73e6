mod common;

use common::MockTransport;
use papi::{ApiBuilder, CallConfig, PapiError, PlainConfig, Verb};
use serde_json::json;
use std::sync::Arc;

const BASE: &str = "https://jsonplaceholder.typicode.com";

fn albums_api() -> ApiBuilder {
    let album = json!({ "userId": 0, "id": 0, "title": "" });
    let photo = json!({ "albumId": 0, "id": 0, "title": "", "url": "", "thumbnailUrl": "" });

    ApiBuilder::new(BASE).path("albums", |albums| {
        albums
            .body(album.clone())
            .endpoint(Verb::Get, json!([album.clone()]))
            .endpoint(Verb::Post, album.clone())
            .error(json!({}))
            .query_with(album.clone(), |q| q.endpoint(Verb::Get, json!([album.clone()])))
            .slug(|id| {
                id.body(album.clone())
                    .endpoint(Verb::Get, album.clone())
                    .endpoint(Verb::Delete, json!({}))
                    .endpoint(Verb::Patch, album.clone())
                    .endpoint(Verb::Put, album.clone())
                    .path("photos", |p| p.endpoint(Verb::Get, json!([photo])))
            })
    })
}

#[tokio::test]
async fn get_on_literal_path_returns_decoded_array() {
    let transport = MockTransport::responding(|_| json!([{ "userId": 1, "id": 1, "title": "a" }]));
    let api = albums_api()
        .build_with_transport(PlainConfig::default(), transport.clone())
        .expect("handle");

    let albums = api
        .at("albums")
        .expect("albums")
        .call(Verb::Get, CallConfig::new())
        .await
        .expect("call")
        .into_json()
        .expect("json");

    assert_eq!(albums, json!([{ "userId": 1, "id": 1, "title": "a" }]));
    assert_eq!(
        transport.sent(),
        vec![("GET".to_string(), format!("{BASE}/albums"))]
    );
}

#[tokio::test]
async fn slug_then_nested_path_issues_nested_get() {
    let transport = MockTransport::echo();
    let api = albums_api()
        .build_with_transport(PlainConfig::default(), transport.clone())
        .expect("handle");

    let photos = api
        .at("albums")
        .and_then(|h| h.at(3))
        .and_then(|h| h.at("photos"))
        .expect("photos");
    let out = photos
        .call(Verb::Get, CallConfig::new())
        .await
        .expect("call");

    assert_eq!(
        out.as_json(),
        Some(&json!({ "method": "GET", "url": format!("{BASE}/albums/3/photos") }))
    );
    assert_eq!(transport.count(), 1);
}

#[tokio::test]
async fn every_declared_verb_on_a_slug_uses_its_method() {
    let transport = MockTransport::echo();
    let api = albums_api()
        .build_with_transport(PlainConfig::default(), transport.clone())
        .expect("handle");
    let album = api.path("albums/7").expect("album");

    for verb in [Verb::Get, Verb::Delete, Verb::Patch, Verb::Put] {
        album.call(verb, CallConfig::new()).await.expect("call");
    }
    assert!(matches!(
        album.verb(Verb::Post),
        Err(PapiError::UndeclaredVerb { verb: Verb::Post, .. })
    ));

    let methods: Vec<String> = transport.sent().into_iter().map(|(m, _)| m).collect();
    assert_eq!(methods, ["GET", "DELETE", "PATCH", "PUT"]);
    assert!(transport.sent().iter().all(|(_, u)| u == &format!("{BASE}/albums/7")));
}

#[tokio::test]
async fn query_and_body_reach_the_transport() {
    let transport = MockTransport::echo();
    let api = albums_api()
        .build_with_transport(
            PlainConfig {
                api_key: Some("t0k".to_string()),
            },
            transport.clone(),
        )
        .expect("handle");
    let albums = api.at("albums").expect("albums");

    albums
        .call(Verb::Get, CallConfig::new().query("a", 1).query("b", "x"))
        .await
        .expect("get");
    let req = transport.last().expect("request");
    assert_eq!(req.url, format!("{BASE}/albums?a=1&b=x"));
    assert!(req.body.is_none());
    assert_eq!(req.headers["authorization"], "Bearer t0k");

    albums
        .call(Verb::Post, CallConfig::new().data(json!({ "title": "Loudest Hits" })))
        .await
        .expect("post");
    let req = transport.last().expect("request");
    assert_eq!(req.url, format!("{BASE}/albums"));
    let body: serde_json::Value =
        serde_json::from_slice(req.body.as_deref().expect("body")).expect("json body");
    assert_eq!(body, json!({ "title": "Loudest Hits" }));
}

#[tokio::test]
async fn literal_child_shadows_parent_wildcard_for_same_verb() {
    let transport = MockTransport::echo();
    let api = ApiBuilder::new("https://api.test")
        .path("items", |items| {
            items
                .endpoint(Verb::Get, json!([0]))
                .path("special", |s| s.endpoint(Verb::Get, json!("literal")))
                .slug(|id| id.endpoint(Verb::Get, json!("wildcard")))
        })
        .build_with_transport(PlainConfig::default(), transport.clone())
        .expect("handle");

    let items = api.at("items").expect("items");
    let special = items.at("special").expect("special");
    assert_eq!(special.node().shape(Verb::Get), Some(&json!("literal")));
    let other = items.at("other").expect("slug");
    assert_eq!(other.node().shape(Verb::Get), Some(&json!("wildcard")));

    special.call(Verb::Get, CallConfig::new()).await.expect("call");
    assert_eq!(
        transport.sent(),
        vec![("GET".to_string(), "https://api.test/items/special".to_string())]
    );
}

#[test]
fn dead_end_fails_before_any_io() {
    let transport = MockTransport::echo();
    let api = albums_api()
        .build_with_transport(PlainConfig::default(), transport.clone())
        .expect("handle");

    for seg in ["users", "posts", "0"] {
        assert!(matches!(api.at(seg), Err(PapiError::DeadEnd { .. })));
    }
    assert_eq!(transport.count(), 0);
}

#[test]
fn handles_are_cheap_to_share() {
    let api = albums_api()
        .build_with_transport(PlainConfig::default(), MockTransport::echo())
        .expect("handle");
    let shared = Arc::new(api);
    let a = shared.at("albums").expect("albums");
    let b = shared.at("albums").expect("albums");
    assert_eq!(a.url(), b.url());
    assert_eq!(shared.url(), BASE);
}
