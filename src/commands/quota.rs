//! Quota command - show a user's daily budget.

use anyhow::Result;
use clap::{Args, Subcommand};
use uuid::Uuid;

use crate::store::{self, QuotaLedger, ServiceConfig};

#[derive(Args)]
pub struct QuotaCmd {
    #[command(subcommand)]
    pub command: QuotaSubCmd,
}

#[derive(Subcommand)]
pub enum QuotaSubCmd {
    /// Show tier, today's count and what is left
    Show(ShowCmd),
}

#[derive(Args)]
pub struct ShowCmd {
    /// User id
    pub user: Uuid,
}

impl QuotaCmd {
    pub async fn run(&self) -> Result<()> {
        let config = ServiceConfig::load()?;
        let ledger = QuotaLedger::new(store::open_configured(&config).await?);

        match &self.command {
            QuotaSubCmd::Show(cmd) => {
                let state = ledger.state(cmd.user).await?;
                let today = ledger.today();

                println!("user:       {}", state.user_id);
                println!("tier:       {}", state.tier);
                println!(
                    "today:      {} of {}",
                    state.effective_count(today),
                    ledger.limit()
                );
                println!("remaining:  {}", state.remaining(today, ledger.limit()));
                match state.last_generation_date {
                    Some(date) => println!("last used:  {}", date),
                    None => println!("last used:  never"),
                }
            }
        }

        Ok(())
    }
}
