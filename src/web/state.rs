//! # Web Application State
//!
//! Shared state for the axum application: loaded configuration, the
//! connection pool, the session verifier, and the access-scoped checkpoint
//! service. Everything here is immutable after startup; anything that varies
//! per request (the resolved identity in particular) travels on request
//! extensions instead.

use sqlx::PgPool;
use std::sync::Arc;

use crate::config::ConfigManager;
use crate::services::CheckpointService;
use crate::web::auth::{SessionAuthError, SessionVerifier};

/// Shared application state for web handlers
#[derive(Clone)]
pub struct AppState {
    pub config_manager: Arc<ConfigManager>,
    pub pool: PgPool,
    pub verifier: SessionVerifier,
    pub service: CheckpointService,
}

impl AppState {
    /// Build the application state from loaded configuration and a pool
    pub fn new(config_manager: Arc<ConfigManager>, pool: PgPool) -> Result<Self, SessionAuthError> {
        let verifier = SessionVerifier::from_config(&config_manager.config().web.auth)?;
        let service = CheckpointService::with_pool(pool.clone());

        Ok(Self {
            config_manager,
            pool,
            verifier,
            service,
        })
    }

    /// Whether session authentication is enabled
    pub fn auth_enabled(&self) -> bool {
        self.config_manager.config().web.auth.enabled
    }
}
