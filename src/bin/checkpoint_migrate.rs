//! Standalone migrator for the checkpoint database.
//!
//! Connects using `DATABASE_URL` and applies any outstanding migrations
//! from `migrations/`. Safe to run repeatedly; applied versions are
//! tracked in `checkpoint_schema_migrations`.

use anyhow::Context;
use tracing::info;

use checkpoint_core::database::{DatabaseConnection, DatabaseMigrations};
use checkpoint_core::logging::init_structured_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_structured_logging();

    let db = DatabaseConnection::new()
        .await
        .context("Failed to connect to the checkpoint database")?;

    let discovered = DatabaseMigrations::discover_migrations()
        .context("Failed to discover migration files")?;
    info!(count = discovered.len(), "Discovered migrations");

    DatabaseMigrations::run_all(db.pool())
        .await
        .context("Migration run failed")?;

    info!("Checkpoint database is up to date");

    db.close().await;
    Ok(())
}
