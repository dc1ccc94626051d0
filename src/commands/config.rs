//! Config command - manage service configuration.

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::store::ServiceConfig;

#[derive(Args)]
pub struct ConfigCmd {
    #[command(subcommand)]
    pub command: ConfigSubCmd,
}

#[derive(Subcommand)]
pub enum ConfigSubCmd {
    /// Set the API key for the generation provider
    SetKey(SetKeyCmd),

    /// Set the provider base URL (default: https://openrouter.ai/api/v1)
    SetUrl(SetUrlCmd),

    /// Set the generation model (default: google/gemini-2.5-flash-preview)
    SetModel(SetModelCmd),

    /// Set the identity service URL and optional project key
    SetIdentity(SetIdentityCmd),

    /// Show current configuration
    Show,
}

#[derive(Args)]
pub struct SetKeyCmd {
    /// API key (OpenRouter or any OpenAI-compatible provider)
    pub key: String,
}

#[derive(Args)]
pub struct SetUrlCmd {
    /// API base URL (e.g., https://openrouter.ai/api/v1)
    pub url: String,
}

#[derive(Args)]
pub struct SetModelCmd {
    /// Model name (e.g., google/gemini-2.5-flash-preview)
    pub model: String,
}

#[derive(Args)]
pub struct SetIdentityCmd {
    /// Identity service base URL (e.g., https://project.example.co/auth/v1)
    pub url: String,

    /// Key sent as the `apikey` header
    #[arg(long)]
    pub api_key: Option<String>,
}

impl ConfigCmd {
    pub async fn run(&self) -> Result<()> {
        match &self.command {
            ConfigSubCmd::SetKey(cmd) => {
                let mut config = ServiceConfig::load()?;
                config.set_provider_key(cmd.key.clone());
                config.save()?;
                println!("API key saved.");
            }
            ConfigSubCmd::SetUrl(cmd) => {
                let mut config = ServiceConfig::load()?;
                config.provider_base_url = cmd.url.clone();
                config.save()?;
                println!("Base URL set to: {}", cmd.url);
            }
            ConfigSubCmd::SetModel(cmd) => {
                let mut config = ServiceConfig::load()?;
                config.model = cmd.model.clone();
                config.save()?;
                println!("Model set to: {}", cmd.model);
            }
            ConfigSubCmd::SetIdentity(cmd) => {
                let mut config = ServiceConfig::load()?;
                config.identity_url = Some(cmd.url.clone());
                if let Some(key) = &cmd.api_key {
                    config.identity_api_key = Some(key.clone());
                }
                config.save()?;
                println!("Identity service set to: {}", cmd.url);
            }
            ConfigSubCmd::Show => {
                let config = ServiceConfig::load()?;
                let set = |present: bool| if present { "(set)" } else { "(not set)" };

                println!("Config: {}", ServiceConfig::config_path()?.display());
                println!();
                println!("api_key:       {}", set(config.has_provider_key()));
                println!("base_url:      {}", config.provider_base_url);
                println!("model:         {}", config.model);
                println!("max_tokens:    {}", config.max_tokens);
                println!("temperature:   {}", config.temperature);
                println!(
                    "identity_url:  {}",
                    config.identity_url.as_deref().unwrap_or("(not set)")
                );
                println!("identity_key:  {}", set(config.identity_api_key.is_some()));
                println!("database:      {}", config.resolved_database_path()?.display());
                println!("bind:          {}", config.bind);
            }
        }
        Ok(())
    }
}
