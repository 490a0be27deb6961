mod auth;
mod config;
mod db;
mod provider;
mod routes;
mod services;
mod state;

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use crate::config::{Config, ConfigError};
use crate::provider::{PgAuthProvider, ProviderConfig};

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("database init failed: {0}")]
    Database(#[from] sqlx::Error),
    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,gatekeeper=debug")))
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "gatekeeper failed to start");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), StartupError> {
    // Config errors abort before any socket or pool exists.
    let config = Config::from_env()?;

    let pool = db::init_pool(&config.database_url, config.db_max_connections).await?;
    tracing::info!(max_connections = config.db_max_connections, "database ready");

    let _sweeper = services::session::spawn_session_sweeper(
        pool.clone(),
        Duration::from_secs(config.session_sweep_interval_secs),
    );

    let provider = PgAuthProvider::new(pool, ProviderConfig::from_config(&config));
    let state = state::AppState::new(Arc::new(provider)).with_allowed_origins(config.cors_allowed_origins.clone());
    let app = routes::app(state);

    let bind_addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(
        addr = %bind_addr,
        auth_base_path = %config.auth_base_path,
        cors_origins = config.cors_allowed_origins.len(),
        "gatekeeper listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::warn!("received SIGINT, shutting down"),
        Err(e) => tracing::error!(error = %e, "failed to listen for SIGINT"),
    }
}
