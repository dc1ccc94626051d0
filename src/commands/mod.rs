//! CLI command implementations.

mod config;
mod history;
mod quota;
mod serve;
mod tier;

pub use config::ConfigCmd;
pub use history::HistoryCmd;
pub use quota::QuotaCmd;
pub use serve::ServeCmd;
pub use tier::TierCmd;
