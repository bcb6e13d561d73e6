//! Command-line arguments.

use anyhow::{Context as _, anyhow};
use clap::{Parser, Subcommand};
use papi::{ParseMode, Verb};
use serde_json::Value;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "papi", version, about = "Call HTTP APIs described by papi tree documents")]
pub struct Cli {
    /// Tree document (`.yaml`/`.yml` for YAML, JSON otherwise).
    #[arg(long, short = 'f', env = "PAPI_FILE")]
    pub file: PathBuf,

    /// Override the document's base URL.
    #[arg(long)]
    pub base_url: Option<String>,

    /// Bearer token sent with every call (overrides the document's `apiKey`).
    #[arg(long, env = "PAPI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Lease life in milliseconds (overrides the document's `life`).
    #[arg(long)]
    pub life: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List every declared route.
    Routes,
    /// Navigate to PATH and call VERB there.
    Call(CallArgs),
}

#[derive(clap::Args, Debug)]
pub struct CallArgs {
    /// HTTP verb (GET, POST, PUT, PATCH, DELETE).
    #[arg(value_parser = parse_verb)]
    pub verb: Verb,

    /// `/`-separated path below the base URL, e.g. `albums/3/photos`.
    #[arg(default_value = "")]
    pub path: String,

    /// Query parameter `name=value`; values that parse as JSON are sent as such. Repeatable.
    #[arg(long = "query", short = 'q', value_parser = parse_query_pair)]
    pub query: Vec<(String, Value)>,

    /// Request body as JSON.
    #[arg(long, value_parser = parse_json)]
    pub data: Option<Value>,

    /// Response decoding: json, text, arrayBuffer, blob, formData.
    #[arg(long, default_value = "json", value_parser = parse_mode)]
    pub parse: ParseMode,

    /// Extra request header `name:value`. Repeatable.
    #[arg(long = "header", short = 'H', value_parser = parse_header_pair)]
    pub headers: Vec<(String, String)>,

    /// Request timeout in seconds.
    #[arg(long)]
    pub timeout: Option<u64>,
}

fn parse_verb(s: &str) -> anyhow::Result<Verb> {
    Ok(s.parse::<Verb>()?)
}

fn parse_mode(s: &str) -> anyhow::Result<ParseMode> {
    Ok(s.parse::<ParseMode>()?)
}

fn parse_json(s: &str) -> anyhow::Result<Value> {
    serde_json::from_str(s).context("--data must be valid JSON")
}

pub fn parse_query_pair(s: &str) -> anyhow::Result<(String, Value)> {
    let (name, raw) = s
        .split_once('=')
        .ok_or_else(|| anyhow!("expected name=value, got '{s}'"))?;
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((name.to_string(), value))
}

pub fn parse_header_pair(s: &str) -> anyhow::Result<(String, String)> {
    let (name, value) = s
        .split_once(':')
        .ok_or_else(|| anyhow!("expected name:value, got '{s}'"))?;
    Ok((name.trim().to_string(), value.trim().to_string()))
}
