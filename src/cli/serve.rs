//! `multitool serve`: load config, build the gateway, serve HTTP.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use multitool::api::{start_server, AppState};
use multitool::config::{self, Config};
use multitool::Gateway;

pub async fn cmd_serve(
    config_path: Option<PathBuf>,
    port: Option<u16>,
    bind: Option<String>,
) -> Result<()> {
    let mut config = Config::load(config_path.as_deref()).context("Failed to load config")?;
    if let Some(port) = port {
        config.server.port = port;
    }
    if let Some(bind) = bind {
        config.server.bind = bind;
    }

    let api_key = config::api_key().context("Gemini API key is required to start the gateway")?;

    let gateway = Gateway::from_config(&config, &api_key)
        .await
        .context("Failed to initialise gateway")?;
    info!(
        model = %config.gemini.model,
        cache_dir = %config.storage.cache_dir.display(),
        "Gateway ready"
    );

    start_server(&config, AppState::new(Arc::new(gateway)))
        .await
        .map_err(|e| anyhow::anyhow!("Gateway server error: {e}"))?;

    Ok(())
}
