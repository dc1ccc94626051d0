//! History command - inspect or prune a user's generations.

use anyhow::{Context, Result, bail};
use clap::{Args, Subcommand};
use uuid::Uuid;

use crate::store::{self, HistoryStore, ServiceConfig};
use crate::types::DataError;

#[derive(Args)]
pub struct HistoryCmd {
    #[command(subcommand)]
    pub command: HistorySubCmd,
}

#[derive(Subcommand)]
pub enum HistorySubCmd {
    /// List a user's generations, newest first
    List(ListCmd),

    /// Delete one generation owned by a user
    Delete(DeleteCmd),
}

#[derive(Args)]
pub struct ListCmd {
    /// User id
    pub user: Uuid,

    /// Print full generated text instead of a summary
    #[arg(long)]
    pub full: bool,
}

#[derive(Args)]
pub struct DeleteCmd {
    /// Owning user id
    pub user: Uuid,

    /// Generation id
    pub id: Uuid,
}

impl HistoryCmd {
    pub async fn run(&self) -> Result<()> {
        let config = ServiceConfig::load()?;
        let history = HistoryStore::new(store::open_configured(&config).await?);

        match &self.command {
            HistorySubCmd::List(cmd) => {
                let records = history.list(cmd.user).await?;

                if records.is_empty() {
                    println!("No generations for {}.", cmd.user);
                    return Ok(());
                }

                for record in &records {
                    let targets: Vec<_> = record.platforms.iter().map(|t| t.id()).collect();
                    println!(
                        "{}  {}  {:<12} [{}]",
                        record.id,
                        record.created_at.format("%Y-%m-%d %H:%M:%S"),
                        record.tone,
                        targets.join(", ")
                    );

                    if cmd.full {
                        for (target, text) in record.results.iter() {
                            println!("  -- {}", target.label());
                            for line in text.lines() {
                                println!("     {}", line);
                            }
                        }
                        println!();
                    }
                }

                println!("\n{} generation(s)", records.len());
            }
            HistorySubCmd::Delete(cmd) => match history.delete(cmd.user, cmd.id).await {
                Ok(()) => println!("Deleted {}", cmd.id),
                Err(DataError::NotFound(_)) => {
                    bail!("No generation {} owned by {}", cmd.id, cmd.user)
                }
                Err(e) => return Err(e).context("Failed to delete generation"),
            },
        }

        Ok(())
    }
}
