//! CLI argument definitions.

use clap::{Parser, Subcommand};

use crate::commands::{ConfigCmd, HistoryCmd, QuotaCmd, ServeCmd, TierCmd};

#[derive(Parser)]
#[command(name = "repurpose")]
#[command(about = "Repurpose - rewrite one piece of content for many platforms")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP service
    Serve(ServeCmd),

    /// Show a user's daily quota
    Quota(QuotaCmd),

    /// Change a user's tier
    Tier(TierCmd),

    /// List or delete a user's generations
    History(HistoryCmd),

    /// Manage configuration (API keys, etc.)
    Config(ConfigCmd),
}

impl Command {
    pub async fn execute(&self) -> anyhow::Result<()> {
        match self {
            Command::Serve(cmd) => cmd.run().await,
            Command::Quota(cmd) => cmd.run().await,
            Command::Tier(cmd) => cmd.run().await,
            Command::History(cmd) => cmd.run().await,
            Command::Config(cmd) => cmd.run().await,
        }
    }
}
