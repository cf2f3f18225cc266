//! notekeep server binary

use anyhow::Context;
use notekeep_core::auth::timing;
use notekeep_engine::StorageEngine;
use notekeep_server::{AppState, NotekeepServer, ServerConfig};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env()?;
    init_tracing(config.log_json);

    info!("Starting notekeep server {}", env!("CARGO_PKG_VERSION"));
    info!("Data directory: {}", config.data_dir.display());
    info!("Bind address: {}", config.bind);

    if !config.data_dir.exists() {
        std::fs::create_dir_all(&config.data_dir).with_context(|| {
            format!("failed to create data directory {}", config.data_dir.display())
        })?;
        info!("Created data directory: {}", config.data_dir.display());
    }

    let engine = StorageEngine::new(&config.data_dir)
        .context("failed to initialize storage engine")?;
    info!("Storage engine initialized");

    let tokens = config.token_service()?;
    if let Err(e) = timing::warm_up() {
        warn!("Could not prepare login timing equalization: {}", e);
    }
    let state = AppState::from_engine(&engine, tokens);

    let server = NotekeepServer::new(state);
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {}", e);
        }
    };

    server
        .serve(config.bind, shutdown)
        .await
        .context("server error")?;

    engine.persist().context("failed to flush storage on shutdown")?;
    info!("Server shutdown gracefully");

    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
