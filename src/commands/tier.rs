//! Tier command - flip an account between free and unlimited.

use anyhow::Result;
use clap::{Args, Subcommand};
use uuid::Uuid;

use crate::store::{self, ServiceConfig};
use crate::types::Tier;

#[derive(Args)]
pub struct TierCmd {
    #[command(subcommand)]
    pub command: TierSubCmd,
}

#[derive(Subcommand)]
pub enum TierSubCmd {
    /// Set the tier for a user
    Set(SetCmd),
}

#[derive(Args)]
pub struct SetCmd {
    /// User id
    pub user: Uuid,

    #[arg(value_enum)]
    pub tier: Tier,
}

impl TierCmd {
    pub async fn run(&self) -> Result<()> {
        let config = ServiceConfig::load()?;
        let db = store::open_configured(&config).await?;

        match &self.command {
            TierSubCmd::Set(cmd) => {
                db.set_tier(cmd.user, cmd.tier).await?;
                println!("{} is now on the {} tier", cmd.user, cmd.tier);
            }
        }

        Ok(())
    }
}
