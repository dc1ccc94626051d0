//! Relational store - profiles with daily counters, and generation history.
//!
//! Backed by a single SQLite file:
//! - `profiles` - tier flag, `generations_today`, `last_generation_date`
//! - `generations` - one row per successful request

mod config;
mod db;
mod history;
mod ledger;
mod models;

pub use config::ServiceConfig;
pub use db::Database;
pub use history::HistoryStore;
pub use ledger::{Clock, QuotaCheck, QuotaLedger, Reservation, SystemClock};

#[cfg(test)]
pub use ledger::MockClock;

use anyhow::{Context, Result};

/// Open the database the config points at.
pub async fn open_configured(config: &ServiceConfig) -> Result<Database> {
    let path = config.resolved_database_path()?;
    Database::open(&path)
        .await
        .with_context(|| format!("Failed to open database at {}", path.display()))
}
