//! # Health Check Handler
//!
//! Unauthenticated health endpoint for deploy probes: reports service
//! liveness plus a database round-trip check.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::collections::HashMap;
use tracing::error;

use crate::web::state::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    timestamp: String,
    checks: HashMap<String, HealthCheck>,
}

/// Individual health check result
#[derive(Serialize)]
pub struct HealthCheck {
    status: String,
    message: Option<String>,
    duration_ms: u64,
}

/// Health check endpoint: GET /health
///
/// Always responds 200; the body carries the per-check detail so probes can
/// distinguish a degraded service from a dead one.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let mut checks = HashMap::new();

    let database_check = check_database_health(&state.pool).await;
    let overall_healthy = database_check.status == "healthy";
    checks.insert("database".to_string(), database_check);

    Json(HealthResponse {
        status: if overall_healthy { "ok" } else { "degraded" }.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        checks,
    })
}

async fn check_database_health(pool: &sqlx::PgPool) -> HealthCheck {
    let start = std::time::Instant::now();

    match sqlx::query("SELECT 1").fetch_one(pool).await {
        Ok(_) => HealthCheck {
            status: "healthy".to_string(),
            message: None,
            duration_ms: start.elapsed().as_millis() as u64,
        },
        Err(e) => {
            error!(error = %e, "Database health check failed");
            HealthCheck {
                status: "unhealthy".to_string(),
                message: Some("Database connection failed".to_string()),
                duration_ms: start.elapsed().as_millis() as u64,
            }
        }
    }
}
