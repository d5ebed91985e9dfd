//! # Site Handlers
//!
//! The small public surface that is not the checkpoint API: a plaintext
//! greeting used as a liveness smoke endpoint and the favicon.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

/// Greeting endpoint: GET /
pub async fn greeting() -> &'static str {
    "Gameplay checkpoint service is running\n"
}

/// Favicon endpoint: GET /favicon.ico
///
/// Serves `static/favicon.ico` when present, 404 otherwise.
pub async fn favicon() -> Response {
    match tokio::fs::read("static/favicon.ico").await {
        Ok(bytes) => ([(header::CONTENT_TYPE, "image/x-icon")], bytes).into_response(),
        Err(_) => StatusCode::NOT_FOUND.into_response(),
    }
}
