//! # Route Definitions
//!
//! Route groups for the checkpoint web API, split into the public surface
//! and the protected `/v1` checkpoint routes.

use axum::routing::get;
use axum::Router;

use crate::web::handlers;
use crate::web::state::AppState;

/// Public site routes: greeting and favicon
pub fn site_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::site::greeting))
        .route("/favicon.ico", get(handlers::site::favicon))
}

/// Public health routes (deploy probes, never authenticated)
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

/// Protected checkpoint CRUD routes under /v1
pub fn checkpoint_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/checkpoints",
            get(handlers::checkpoints::list_checkpoints)
                .post(handlers::checkpoints::create_checkpoint),
        )
        .route(
            "/v1/checkpoints/{id}",
            get(handlers::checkpoints::get_checkpoint)
                .put(handlers::checkpoints::update_checkpoint)
                .delete(handlers::checkpoints::delete_checkpoint),
        )
}
