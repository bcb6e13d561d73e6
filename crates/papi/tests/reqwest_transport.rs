use papi::{ApiBuilder, CallConfig, Decoded, Handle, PapiError, ParseMode, PlainConfig, Verb};
use papi_test_support::EchoServer;
use reqwest::header::{HeaderName, HeaderValue};
use serde_json::{Value, json};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn api(base_url: &str, api_key: Option<&str>) -> Handle {
    ApiBuilder::new(base_url)
        .path("anything", |a| {
            a.endpoint(Verb::Get, json!({}))
                .endpoint(Verb::Post, json!({}))
                .slug(|id| id.endpoint(Verb::Put, json!({})))
        })
        .path("form", |p| p.endpoint(Verb::Get, json!({})))
        .path("bytes", |p| p.endpoint(Verb::Get, json!({})))
        .path("text", |p| p.endpoint(Verb::Get, json!({})))
        .path("status", |p| p.slug(|code| code.endpoint(Verb::Get, json!({}))))
        .build(PlainConfig {
            api_key: api_key.map(str::to_string),
        })
        .expect("handle")
}

#[tokio::test]
async fn get_sends_query_and_bearer_header() -> anyhow::Result<()> {
    let server = EchoServer::spawn().await?;
    let api = api(server.base_url(), Some("secret"));

    let echoed = api
        .at("anything")?
        .call(
            Verb::Get,
            CallConfig::new()
                .query("a", 1)
                .query("ids", json!([1, 2]))
                .header(
                    HeaderName::from_static("x-trace"),
                    HeaderValue::from_static("t-1"),
                ),
        )
        .await?
        .into_json()
        .expect("json");

    assert_eq!(echoed["method"], "GET");
    assert_eq!(echoed["path"], "/anything");
    assert_eq!(echoed["query"], "a=1&ids=1,2");
    assert_eq!(echoed["headers"]["authorization"], "Bearer secret");
    assert_eq!(echoed["headers"]["x-trace"], "t-1");

    server.shutdown().await
}

#[tokio::test]
async fn put_on_slug_sends_json_body() -> anyhow::Result<()> {
    let server = EchoServer::spawn().await?;
    let api = api(server.base_url(), None);

    let echoed = api
        .path("anything/42")?
        .call(Verb::Put, CallConfig::new().data(json!({ "title": "t" })))
        .await?
        .into_json()
        .expect("json");

    assert_eq!(echoed["method"], "PUT");
    assert_eq!(echoed["path"], "/anything/42");
    assert_eq!(echoed["query"], Value::Null);
    assert_eq!(echoed["headers"]["content-type"], "application/json");
    assert!(echoed["headers"].get("authorization").is_none());
    let body: Value = serde_json::from_str(echoed["body"].as_str().expect("body"))?;
    assert_eq!(body, json!({ "title": "t" }));

    server.shutdown().await
}

#[tokio::test]
async fn parse_modes_decode_each_body_kind() -> anyhow::Result<()> {
    let server = EchoServer::spawn().await?;
    let api = api(server.base_url(), None);

    let text = api
        .at("text")?
        .call(Verb::Get, CallConfig::new().parse(ParseMode::Text))
        .await?;
    assert_eq!(text, Decoded::Text("hello".to_string()));

    let form = api
        .at("form")?
        .call(Verb::Get, CallConfig::new().parse(ParseMode::FormData))
        .await?;
    assert_eq!(
        form,
        Decoded::Form(vec![
            ("a".to_string(), "1".to_string()),
            ("b".to_string(), "two".to_string()),
        ])
    );

    let blob = api
        .at("bytes")?
        .call(Verb::Get, CallConfig::new().parse(ParseMode::Blob))
        .await?;
    assert_eq!(
        blob,
        Decoded::Blob {
            mime_type: Some("image/png".to_string()),
            bytes: vec![0, 1, 2, 3],
        }
    );

    let raw = api
        .at("bytes")?
        .call(Verb::Get, CallConfig::new().parse(ParseMode::ArrayBuffer))
        .await?;
    assert_eq!(raw, Decoded::Bytes(vec![0, 1, 2, 3]));

    let err = api
        .at("text")?
        .call(Verb::Get, CallConfig::new())
        .await
        .unwrap_err();
    assert!(matches!(err, PapiError::Decode(_)));

    server.shutdown().await
}

#[tokio::test]
async fn error_statuses_are_decoded_like_any_other_response() -> anyhow::Result<()> {
    let server = EchoServer::spawn().await?;
    let api = api(server.base_url(), None);

    let out = api
        .path("status/404")?
        .call(Verb::Get, CallConfig::new())
        .await?;
    assert_eq!(out, Decoded::Json(json!({ "status": 404 })));

    server.shutdown().await
}

#[tokio::test]
async fn transport_failures_and_cancellation_surface_to_the_caller() -> anyhow::Result<()> {
    let server = EchoServer::spawn().await?;
    let base = server.base_url().to_string();
    server.shutdown().await?;

    let api = api(&base, None);
    let err = api
        .at("text")?
        .call(
            Verb::Get,
            CallConfig::new()
                .parse(ParseMode::Text)
                .timeout(Duration::from_secs(5)),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, PapiError::Transport(_)));

    let signal = CancellationToken::new();
    signal.cancel();
    let err = api
        .at("text")?
        .call(Verb::Get, CallConfig::new().signal(signal))
        .await
        .unwrap_err();
    assert!(matches!(err, PapiError::Cancelled));
    Ok(())
}
