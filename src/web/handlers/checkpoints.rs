//! # Checkpoint Handlers
//!
//! HTTP handlers for the five checkpoint operations. Each handler receives
//! the resolved identity through the [`AuthenticatedCaller`] extractor and
//! hands it to the access-scoped service; no handler ever consults shared
//! role state or applies ownership logic itself.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::models::checkpoint::{Checkpoint, NewCheckpoint};
use crate::services::CheckpointPatch;
use crate::web::extractors::{AuthenticatedCaller, RequestContext};
use crate::web::response_types::ApiResult;
use crate::web::state::AppState;

/// Request body for creating or updating a checkpoint
///
/// `owner_id` is honored only for admin creates; a player's create always
/// binds the record to their resolved subject. `id` is accepted on updates
/// purely so a mismatch with the path can be rejected.
#[derive(Debug, Deserialize)]
pub struct CheckpointRequest {
    pub owner_name: String,
    pub payload: String,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub id: Option<i64>,
}

/// Checkpoint list response
#[derive(Debug, Serialize)]
pub struct CheckpointListResponse {
    pub checkpoints: Vec<Checkpoint>,
    pub total: usize,
}

/// Acknowledgment for update and delete operations
#[derive(Debug, Serialize)]
pub struct CheckpointStatusResponse {
    pub id: i64,
    pub status: String,
}

/// Create a new checkpoint: POST /v1/checkpoints
pub async fn create_checkpoint(
    State(state): State<AppState>,
    AuthenticatedCaller { identity }: AuthenticatedCaller,
    context: RequestContext,
    Json(request): Json<CheckpointRequest>,
) -> ApiResult<(StatusCode, Json<Checkpoint>)> {
    debug!(
        request_id = %context.request_id,
        owner_name = %request.owner_name,
        "Creating checkpoint"
    );

    let record = NewCheckpoint {
        owner_name: request.owner_name,
        payload: request.payload,
        owner_id: request.owner_id,
    };

    let checkpoint = state.service.create(&identity, record).await?;

    info!(
        checkpoint_id = checkpoint.id,
        request_id = %context.request_id,
        "Checkpoint created"
    );

    Ok((StatusCode::CREATED, Json(checkpoint)))
}

/// List checkpoints visible to the caller: GET /v1/checkpoints
pub async fn list_checkpoints(
    State(state): State<AppState>,
    AuthenticatedCaller { identity }: AuthenticatedCaller,
) -> ApiResult<Json<CheckpointListResponse>> {
    let checkpoints = state.service.list(&identity).await?;
    let total = checkpoints.len();

    Ok(Json(CheckpointListResponse { checkpoints, total }))
}

/// Get a single checkpoint: GET /v1/checkpoints/{id}
pub async fn get_checkpoint(
    State(state): State<AppState>,
    AuthenticatedCaller { identity }: AuthenticatedCaller,
    Path(id): Path<i64>,
) -> ApiResult<Json<Checkpoint>> {
    let checkpoint = state.service.get(&identity, id).await?;

    Ok(Json(checkpoint))
}

/// Update a checkpoint: PUT /v1/checkpoints/{id}
pub async fn update_checkpoint(
    State(state): State<AppState>,
    AuthenticatedCaller { identity }: AuthenticatedCaller,
    Path(id): Path<i64>,
    Json(request): Json<CheckpointRequest>,
) -> ApiResult<Json<CheckpointStatusResponse>> {
    let patch = CheckpointPatch {
        id: request.id,
        owner_name: Some(request.owner_name),
        payload: Some(request.payload),
    };

    state.service.update(&identity, id, patch).await?;

    Ok(Json(CheckpointStatusResponse {
        id,
        status: "updated".to_string(),
    }))
}

/// Delete a checkpoint: DELETE /v1/checkpoints/{id}
pub async fn delete_checkpoint(
    State(state): State<AppState>,
    AuthenticatedCaller { identity }: AuthenticatedCaller,
    Path(id): Path<i64>,
) -> ApiResult<Json<CheckpointStatusResponse>> {
    state.service.delete(&identity, id).await?;

    Ok(Json(CheckpointStatusResponse {
        id,
        status: "deleted".to_string(),
    }))
}
