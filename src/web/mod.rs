//! # Checkpoint Web API
//!
//! The axum transport layer: routing, middleware, session verification, and
//! the JSON error envelope. The checkpoint routes sit behind the session
//! middleware, which resolves each request's bearer credential into the
//! [`AccessIdentity`](crate::services::AccessIdentity) consumed by the
//! handlers.

use axum::http::{HeaderName, HeaderValue, Method};
use axum::Router;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

pub mod auth;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response_types;
pub mod routes;
pub mod state;

pub use response_types::{ApiError, ApiResult};
pub use state::AppState;

use crate::config::CorsConfig;

/// Create the checkpoint web application with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    let web_config = state.config_manager.config().web.clone();

    let common_middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_millis(
            web_config.request_timeout_ms,
        )));

    // Public routes - never require auth (deploy probes, greeting, favicon)
    let public_routes = routes::site_routes().merge(routes::health_routes());

    // Protected routes - session middleware resolves the caller identity
    let protected_routes = routes::checkpoint_routes().layer(
        axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::authenticate_request,
        ),
    );

    let mut app = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(axum::middleware::from_fn(
            middleware::request_id::add_request_id,
        ))
        .layer(common_middleware);

    if web_config.cors.enabled {
        app = app.layer(build_cors_layer(&web_config.cors));
    }

    info!("Checkpoint web application created with all routes and middleware");
    app.with_state(state)
}

/// Build the CORS layer from the configured allow-lists
fn build_cors_layer(cors: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = cors
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    let methods: Vec<Method> = cors
        .allowed_methods
        .iter()
        .filter_map(|method| method.parse().ok())
        .collect();
    let headers: Vec<HeaderName> = cors
        .allowed_headers
        .iter()
        .filter_map(|header| header.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::list(methods))
        .allow_headers(AllowHeaders::list(headers))
}
