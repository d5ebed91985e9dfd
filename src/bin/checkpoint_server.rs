//! Checkpoint service HTTP server.
//!
//! Loads `.env`, initializes structured logging, loads configuration,
//! connects the database pool, and serves the axum application with
//! graceful shutdown.

use anyhow::Context;
use tracing::info;

use checkpoint_core::config::ConfigManager;
use checkpoint_core::database::DatabaseConnection;
use checkpoint_core::logging::init_structured_logging;
use checkpoint_core::web::{create_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_structured_logging();

    let config_manager = ConfigManager::load().context("Failed to load configuration")?;

    info!(
        environment = %config_manager.environment(),
        "Starting checkpoint server"
    );

    let db = DatabaseConnection::from_config(&config_manager)
        .await
        .context("Failed to connect to the checkpoint database")?;

    let state = AppState::new(config_manager.clone(), db.pool().clone())
        .context("Failed to build application state")?;

    let app = create_app(state);

    let bind_address = config_manager.config().web.effective_bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {bind_address}"))?;

    info!(bind_address = %bind_address, "Checkpoint server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Checkpoint server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install ctrl-c handler");
        return;
    }
    info!("Shutdown signal received");
}
