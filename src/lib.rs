//! # Checkpoint Core
//!
//! Rust core for the gameplay checkpoint service: an HTTP+JSON API over
//! PostgreSQL that stores opaque player progress blobs and scopes every
//! operation to the caller's role.
//!
//! ## Architecture
//!
//! The crate is organized around a single design decision: the
//! access-scoped checkpoint repository. A session token resolves to an
//! [`AccessIdentity`](services::AccessIdentity) per request; administrators
//! operate on all rows, players only on rows whose `owner_id` matches their
//! resolved subject. The ownership predicate is pushed into every query so
//! "not owned" and "does not exist" are indistinguishable at the store.
//!
//! - [`models`] - the `Checkpoint` entity and its sqlx persistence
//! - [`scopes`] - chainable query scopes for composing the ownership filter
//! - [`services`] - the access-scoped service and store contract
//! - [`web`] - axum handlers, middleware, and session verification
//! - [`config`] - environment-aware YAML configuration
//! - [`database`] - connection pooling and embedded migrations
//! - [`logging`] - structured tracing initialization
//!
//! ## Usage
//!
//! ```rust,no_run
//! use checkpoint_core::config::ConfigManager;
//! use checkpoint_core::database::DatabaseConnection;
//! use checkpoint_core::web::{create_app, state::AppState};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config_manager = ConfigManager::load()?;
//! let db = DatabaseConnection::from_config(&config_manager).await?;
//! let state = AppState::new(config_manager.clone(), db.pool().clone())?;
//! let app = create_app(state);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod database;
pub mod logging;
pub mod models;
pub mod scopes;
pub mod services;
pub mod web;

// Re-export core types at the crate root
pub use models::checkpoint::{Checkpoint, CheckpointChanges, NewCheckpoint};
pub use services::checkpoint_service::{
    CheckpointPatch, CheckpointService, CheckpointServiceError, CheckpointStore,
    PgCheckpointStore,
};
pub use services::identity::AccessIdentity;
