//! # Access-Scoped Checkpoint Service
//!
//! The core of the crate: one implementation per CRUD operation, each
//! consuming an [`AccessIdentity`] and conditionally adding the ownership
//! predicate. There are no separate admin/player code paths to drift apart;
//! the role only decides whether `owner_filter()` yields a predicate.
//!
//! The filter is always applied inside the store statement. Zero matched
//! rows is therefore indistinguishable between "does not exist" and "exists
//! but not owned", which is what keeps a player from probing other players'
//! checkpoint ids.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::logging::log_checkpoint_operation;
use crate::models::checkpoint::{Checkpoint, CheckpointChanges, NewCheckpoint};
use crate::services::identity::AccessIdentity;

/// Error taxonomy for checkpoint operations
#[derive(Debug, Error)]
pub enum CheckpointServiceError {
    /// Malformed or self-contradictory input; the store is never touched
    #[error("Invalid checkpoint input: {0}")]
    Validation(String),

    /// Credential missing, invalid, or unverifiable
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Zero rows matched the (possibly ownership-filtered) predicate
    #[error("Checkpoint not found")]
    NotFound,

    /// Backend failure; the underlying cause is logged, not surfaced verbatim
    #[error("Checkpoint store operation failed")]
    Store(#[source] sqlx::Error),
}

/// Requested changes for an update operation
///
/// `id`, when present, must match the target id; it exists only so callers
/// that echo the id in the body get a validation error instead of a silent
/// mismatch. `None` fields leave the column untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckpointPatch {
    pub id: Option<i64>,
    pub owner_name: Option<String>,
    pub payload: Option<String>,
}

/// Persistence contract for checkpoint records
///
/// Pure storage with an optional equality filter on `owner_id` so the
/// service can push scoping into the query. Implementations never perform
/// authorization logic themselves.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    async fn insert(&self, record: NewCheckpoint) -> Result<Checkpoint, sqlx::Error>;

    async fn fetch(&self, id: i64, owner: Option<&str>)
        -> Result<Option<Checkpoint>, sqlx::Error>;

    /// All matching rows ordered by id ascending
    async fn fetch_all(&self, owner: Option<&str>) -> Result<Vec<Checkpoint>, sqlx::Error>;

    /// Returns `None` when zero rows matched the filtered update
    async fn apply_changes(
        &self,
        id: i64,
        changes: CheckpointChanges,
        owner: Option<&str>,
    ) -> Result<Option<Checkpoint>, sqlx::Error>;

    /// Returns whether a row was actually removed
    async fn remove(&self, id: i64, owner: Option<&str>) -> Result<bool, sqlx::Error>;
}

/// PostgreSQL-backed checkpoint store
#[derive(Debug, Clone)]
pub struct PgCheckpointStore {
    pool: PgPool,
}

impl PgCheckpointStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CheckpointStore for PgCheckpointStore {
    async fn insert(&self, record: NewCheckpoint) -> Result<Checkpoint, sqlx::Error> {
        Checkpoint::create(&self.pool, record).await
    }

    async fn fetch(
        &self,
        id: i64,
        owner: Option<&str>,
    ) -> Result<Option<Checkpoint>, sqlx::Error> {
        Checkpoint::find_by_id(&self.pool, id, owner).await
    }

    async fn fetch_all(&self, owner: Option<&str>) -> Result<Vec<Checkpoint>, sqlx::Error> {
        Checkpoint::list(&self.pool, owner).await
    }

    async fn apply_changes(
        &self,
        id: i64,
        changes: CheckpointChanges,
        owner: Option<&str>,
    ) -> Result<Option<Checkpoint>, sqlx::Error> {
        Checkpoint::update(&self.pool, id, changes, owner).await
    }

    async fn remove(&self, id: i64, owner: Option<&str>) -> Result<bool, sqlx::Error> {
        Checkpoint::delete(&self.pool, id, owner).await
    }
}

/// Service enforcing the admin/player split over the checkpoint store
#[derive(Clone)]
pub struct CheckpointService {
    store: Arc<dyn CheckpointStore>,
}

impl CheckpointService {
    /// Create a service over any store implementation
    pub fn new(store: Arc<dyn CheckpointStore>) -> Self {
        Self { store }
    }

    /// Create a service backed by PostgreSQL
    pub fn with_pool(pool: PgPool) -> Self {
        Self::new(Arc::new(PgCheckpointStore::new(pool)))
    }

    /// Create a checkpoint
    ///
    /// A player's record is always attributed to their resolved subject; any
    /// caller-supplied `owner_id` is overwritten for that path. An admin may
    /// attribute an explicit owner or leave the record unowned.
    pub async fn create(
        &self,
        identity: &AccessIdentity,
        mut record: NewCheckpoint,
    ) -> Result<Checkpoint, CheckpointServiceError> {
        Self::require_resolved_subject(identity)?;
        Self::validate_required("owner_name", &record.owner_name)?;
        Self::validate_required("payload", &record.payload)?;

        if identity.is_admin() {
            if record.owner_id.as_deref() == Some("") {
                return Err(CheckpointServiceError::Validation(
                    "owner_id cannot be empty when provided".to_string(),
                ));
            }
        } else {
            record.owner_id = Some(identity.subject().to_string());
        }

        let checkpoint = self
            .store
            .insert(record)
            .await
            .map_err(|e| self.store_failure("create", e))?;

        log_checkpoint_operation(
            "create",
            Some(checkpoint.id),
            Some(identity.subject()),
            identity.is_admin(),
            "ok",
        );

        Ok(checkpoint)
    }

    /// Fetch a single checkpoint visible to the caller
    pub async fn get(
        &self,
        identity: &AccessIdentity,
        id: i64,
    ) -> Result<Checkpoint, CheckpointServiceError> {
        Self::require_resolved_subject(identity)?;

        let checkpoint = self
            .store
            .fetch(id, identity.owner_filter())
            .await
            .map_err(|e| self.store_failure("get", e))?
            .ok_or(CheckpointServiceError::NotFound)?;

        debug!(
            checkpoint_id = id,
            subject = %identity.subject(),
            admin = identity.is_admin(),
            "Checkpoint fetched"
        );

        Ok(checkpoint)
    }

    /// List every checkpoint visible to the caller, ordered by id ascending
    ///
    /// An empty result is a success, not an error.
    pub async fn list(
        &self,
        identity: &AccessIdentity,
    ) -> Result<Vec<Checkpoint>, CheckpointServiceError> {
        Self::require_resolved_subject(identity)?;

        let checkpoints = self
            .store
            .fetch_all(identity.owner_filter())
            .await
            .map_err(|e| self.store_failure("list", e))?;

        debug!(
            count = checkpoints.len(),
            subject = %identity.subject(),
            admin = identity.is_admin(),
            "Checkpoints listed"
        );

        Ok(checkpoints)
    }

    /// Update a checkpoint visible to the caller
    ///
    /// Refreshes `last_edited_at`; never touches `id`, `created_at`, or
    /// `owner_id`.
    pub async fn update(
        &self,
        identity: &AccessIdentity,
        id: i64,
        patch: CheckpointPatch,
    ) -> Result<Checkpoint, CheckpointServiceError> {
        Self::require_resolved_subject(identity)?;

        if let Some(patch_id) = patch.id {
            if patch_id != id {
                return Err(CheckpointServiceError::Validation(format!(
                    "checkpoint id mismatch: path says {id}, body says {patch_id}"
                )));
            }
        }

        if let Some(owner_name) = &patch.owner_name {
            Self::validate_required("owner_name", owner_name)?;
        }
        if let Some(payload) = &patch.payload {
            Self::validate_required("payload", payload)?;
        }

        let changes = CheckpointChanges {
            owner_name: patch.owner_name,
            payload: patch.payload,
        };

        let checkpoint = self
            .store
            .apply_changes(id, changes, identity.owner_filter())
            .await
            .map_err(|e| self.store_failure("update", e))?
            .ok_or(CheckpointServiceError::NotFound)?;

        log_checkpoint_operation(
            "update",
            Some(id),
            Some(identity.subject()),
            identity.is_admin(),
            "ok",
        );

        Ok(checkpoint)
    }

    /// Delete a checkpoint visible to the caller
    ///
    /// Permanent; deleting an absent or foreign id is `NotFound`.
    pub async fn delete(
        &self,
        identity: &AccessIdentity,
        id: i64,
    ) -> Result<(), CheckpointServiceError> {
        Self::require_resolved_subject(identity)?;

        let removed = self
            .store
            .remove(id, identity.owner_filter())
            .await
            .map_err(|e| self.store_failure("delete", e))?;

        if !removed {
            warn!(
                checkpoint_id = id,
                subject = %identity.subject(),
                "Delete matched no rows"
            );
            return Err(CheckpointServiceError::NotFound);
        }

        log_checkpoint_operation(
            "delete",
            Some(id),
            Some(identity.subject()),
            identity.is_admin(),
            "ok",
        );

        Ok(())
    }

    /// A player identity with an empty subject is a resolver failure, never
    /// a fall-through into an unscoped or empty-scoped query
    fn require_resolved_subject(identity: &AccessIdentity) -> Result<(), CheckpointServiceError> {
        if !identity.is_admin() && identity.subject().is_empty() {
            return Err(CheckpointServiceError::Authentication(
                "resolved player identity has an empty subject".to_string(),
            ));
        }
        Ok(())
    }

    fn validate_required(field: &str, value: &str) -> Result<(), CheckpointServiceError> {
        if value.is_empty() {
            return Err(CheckpointServiceError::Validation(format!(
                "{field} cannot be empty"
            )));
        }
        Ok(())
    }

    fn store_failure(&self, operation: &str, error: sqlx::Error) -> CheckpointServiceError {
        error!(
            operation = operation,
            error = %error,
            "Checkpoint store failure"
        );
        CheckpointServiceError::Store(error)
    }
}
