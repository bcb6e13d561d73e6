mod cli;
mod commands;

use clap::Parser as _;
use cli::{Cli, Command};
use std::io::IsTerminal as _;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let (builder, cfg) = commands::load(&cli)?;

    let stdout = std::io::stdout();
    let color = stdout.is_terminal();
    let mut out = stdout.lock();
    match cli.command {
        Command::Routes => commands::routes(&builder, color, &mut out),
        Command::Call(args) => commands::call(&builder, cfg, args, &mut out).await,
    }
}
