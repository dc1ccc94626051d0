//! Repurpose - rewrite one piece of content for many social platforms,
//! with a daily free allowance and per-user history.

mod cli;
mod commands;
mod identity;
mod provider;
mod service;
mod store;
mod types;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Controlled by RUST_LOG
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let cli = Cli::parse();
    cli.command.execute().await
}
