//! Serve command - run the HTTP service.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::identity::HttpIdentityVerifier;
use crate::provider::{GatewaySettings, ProviderGateway};
use crate::service::{GenerationOrchestrator, router};
use crate::store::{self, HistoryStore, QuotaLedger, ServiceConfig};

#[derive(Args)]
pub struct ServeCmd {
    /// Listen address (overrides config)
    #[arg(long, env = "REPURPOSE_BIND")]
    pub bind: Option<String>,

    /// SQLite database file (overrides config)
    #[arg(long, env = "REPURPOSE_DATABASE")]
    pub database: Option<PathBuf>,

    /// Generation provider API key (overrides config)
    #[arg(long, env = "REPURPOSE_PROVIDER_KEY", hide_env_values = true)]
    pub provider_key: Option<String>,
}

impl ServeCmd {
    pub async fn run(&self) -> Result<()> {
        let mut config = ServiceConfig::load()?;
        if let Some(bind) = &self.bind {
            config.bind = bind.clone();
        }
        if let Some(path) = &self.database {
            config.database_path = Some(path.clone());
        }
        if let Some(key) = &self.provider_key {
            config.set_provider_key(key.clone());
        }

        if !config.has_provider_key() {
            warn!("No provider API key configured; every generation will fail");
        }

        let identity_url = config
            .identity_url
            .as_deref()
            .context("No identity service configured. Run `repurpose config set-identity <url>`")?;
        let identity = HttpIdentityVerifier::new(identity_url, config.identity_api_key_secret())
            .context("Invalid identity service URL")?;

        let gateway = ProviderGateway::new(GatewaySettings::from(&config))
            .context("Failed to build provider client")?;

        let db = store::open_configured(&config).await?;
        let orchestrator = GenerationOrchestrator::new(
            gateway,
            identity,
            QuotaLedger::new(db.clone()),
            HistoryStore::new(db),
        );

        let app = router(Arc::new(orchestrator));
        let listener = TcpListener::bind(&config.bind)
            .await
            .with_context(|| format!("Failed to bind {}", config.bind))?;

        info!(addr = %listener.local_addr()?, model = %config.model, "listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("Server error")
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
