//! Subcommand execution and output rendering.

use crate::cli::{CallArgs, Cli};
use anyhow::Context as _;
use base64::Engine as _;
use owo_colors::OwoColorize as _;
use papi::document::ApiDocument;
use papi::{ApiBuilder, BuildConfig, CallConfig, Decoded};
use reqwest::header::{HeaderName, HeaderValue};
use std::io::Write;
use std::time::Duration;
use tracing::debug;

/// Load the document named by `cli` and apply command-line overrides.
pub fn load(cli: &Cli) -> anyhow::Result<(ApiBuilder, BuildConfig)> {
    let mut doc = ApiDocument::load(&cli.file)?;
    if let Some(base) = &cli.base_url {
        doc.base_url.clone_from(base);
    }
    if let Some(key) = &cli.api_key {
        doc.api_key = Some(key.clone());
    }
    if let Some(life) = cli.life {
        doc.life = Some(life);
    }
    let cfg = doc.build_config();
    Ok((doc.into_builder(), cfg))
}

pub fn routes(builder: &ApiBuilder, color: bool, out: &mut impl Write) -> anyhow::Result<()> {
    for (verb, route) in builder.root().routes() {
        let verb = format!("{:<6}", verb.as_str());
        if color {
            writeln!(out, "{} {route}", verb.bold())?;
        } else {
            writeln!(out, "{verb} {route}")?;
        }
    }
    Ok(())
}

pub async fn call(
    builder: &ApiBuilder,
    cfg: BuildConfig,
    args: CallArgs,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    debug!(verb = %args.verb, path = %args.path, "calling");
    let handle = builder.build(cfg)?;
    let target = handle
        .path(&args.path)
        .with_context(|| format!("navigate to '{}'", args.path))?;

    let mut call_cfg = args
        .query
        .into_iter()
        .fold(CallConfig::new().parse(args.parse), |cfg, (name, value)| {
            cfg.query(name, value)
        });
    call_cfg.data = args.data;
    if let Some(secs) = args.timeout {
        call_cfg = call_cfg.timeout(Duration::from_secs(secs));
    }
    for (name, value) in args.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .with_context(|| format!("invalid header name '{name}'"))?;
        let value = HeaderValue::from_str(&value)
            .with_context(|| format!("invalid value for header '{name}'"))?;
        call_cfg.headers.append(name, value);
    }

    let decoded = target
        .call(args.verb, call_cfg)
        .await
        .with_context(|| format!("{} {}", args.verb, target.url()))?;
    render(&decoded, out)
}

fn render(decoded: &Decoded, out: &mut impl Write) -> anyhow::Result<()> {
    match decoded {
        Decoded::Json(v) => writeln!(out, "{}", serde_json::to_string_pretty(v)?)?,
        Decoded::Text(s) => writeln!(out, "{s}")?,
        Decoded::Bytes(b) | Decoded::Blob { bytes: b, .. } => {
            writeln!(out, "{}", base64::engine::general_purpose::STANDARD.encode(b))?;
        }
        Decoded::Form(pairs) => {
            for (k, v) in pairs {
                writeln!(out, "{k}={v}")?;
            }
        }
    }
    Ok(())
}
