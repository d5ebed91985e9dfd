//! # Database Operations
//!
//! Database layer for the checkpoint store: connection pooling plus the
//! embedded schema migration system.
//!
//! ## Key Components
//!
//! - [`connection`] - Connection management and pooling
//! - [`migrations`] - Schema migration discovery and application
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use checkpoint_core::config::ConfigManager;
//! use checkpoint_core::database::{DatabaseConnection, DatabaseMigrations};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config_manager = ConfigManager::load()?;
//! let db = DatabaseConnection::from_config(&config_manager).await?;
//! DatabaseMigrations::run_all(db.pool()).await?;
//! # Ok(())
//! # }
//! ```

pub mod connection;
pub mod migrations;

pub use connection::DatabaseConnection;
pub use migrations::{DatabaseMigrations, Migration};
