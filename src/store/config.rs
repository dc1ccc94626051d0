//! Service configuration management.
//!
//! Config is stored at `~/.config/repurpose/config.toml` and contains:
//! - generation provider credentials and sampling settings
//! - identity service location
//! - database path and listen address

use std::path::PathBuf;

use anyhow::{Context, Result};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

const CONFIG_DIR: &str = "repurpose";
const CONFIG_FILE: &str = "config.toml";
const DATABASE_FILE: &str = "repurpose.sqlite";

/// Service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// API key for the generation provider.
    #[serde(default)]
    pub provider_api_key: Option<String>,

    /// Base URL for an OpenAI-compatible chat completions API.
    #[serde(default = "default_provider_base_url")]
    pub provider_base_url: String,

    /// Model used for every rewrite.
    #[serde(default = "default_model")]
    pub model: String,

    /// Output-length hint sent with each call.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Per-call timeout; a timeout counts as a provider failure.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Sent as `HTTP-Referer` so the provider can attribute traffic.
    #[serde(default)]
    pub app_referer: Option<String>,

    /// Sent as `X-Title`.
    #[serde(default)]
    pub app_title: Option<String>,

    /// Base URL of the identity service (token -> user id).
    #[serde(default)]
    pub identity_url: Option<String>,

    /// Project key the identity service expects alongside user tokens.
    #[serde(default)]
    pub identity_api_key: Option<String>,

    /// SQLite database file. Defaults to the platform data directory.
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_provider_base_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_model() -> String {
    "google/gemini-2.5-flash-preview".to_string()
}

fn default_max_tokens() -> u32 {
    1000
}

fn default_temperature() -> f32 {
    0.7
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            provider_api_key: None,
            provider_base_url: default_provider_base_url(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            request_timeout_secs: default_request_timeout_secs(),
            app_referer: None,
            app_title: None,
            identity_url: None,
            identity_api_key: None,
            database_path: None,
            bind: default_bind(),
        }
    }
}

impl ServiceConfig {
    /// Load config from the default location.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path).context("Failed to read config file")?;

        toml::from_str(&content).context("Failed to parse config file")
    }

    /// Save config to the default location.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(&path, content).context("Failed to write config file")
    }

    /// Get the provider API key as a SecretString.
    pub fn provider_api_key_secret(&self) -> Option<SecretString> {
        self.provider_api_key
            .clone()
            .filter(|k| !k.is_empty())
            .map(SecretString::from)
    }

    /// Get the identity service key as a SecretString.
    pub fn identity_api_key_secret(&self) -> Option<SecretString> {
        self.identity_api_key
            .clone()
            .filter(|k| !k.is_empty())
            .map(SecretString::from)
    }

    pub fn has_provider_key(&self) -> bool {
        self.provider_api_key
            .as_ref()
            .map(|k| !k.is_empty())
            .unwrap_or(false)
    }

    pub fn set_provider_key(&mut self, key: String) {
        self.provider_api_key = Some(key);
    }

    /// Resolve the database file, falling back to the platform data directory.
    pub fn resolved_database_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.database_path {
            return Ok(path.clone());
        }

        let data_dir = dirs::data_dir().context("Could not determine data directory")?;

        Ok(data_dir.join(CONFIG_DIR).join(DATABASE_FILE))
    }

    /// Get the config file path.
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not determine config directory")?;

        Ok(config_dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }
}
