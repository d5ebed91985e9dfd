use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

/// Checkpoint represents a stored gameplay progress record.
/// Maps to the `gameplay_checkpoints` table.
///
/// The `payload` column is an opaque serialized game-state blob; the store
/// never interprets it. `owner_id` is the authenticated subject that created
/// the record and is nullable for admin-created and legacy rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Checkpoint {
    pub id: i64,
    pub owner_name: String,
    pub payload: String,
    pub created_at: NaiveDateTime,
    pub last_edited_at: NaiveDateTime,
    pub owner_id: Option<String>,
}

/// New Checkpoint for creation (without generated fields)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCheckpoint {
    pub owner_name: String,
    pub payload: String,
    pub owner_id: Option<String>,
}

/// Column changes for an update; `None` leaves the column untouched.
///
/// `id`, `created_at`, and `owner_id` are deliberately absent: none of them
/// is mutable through an update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckpointChanges {
    pub owner_name: Option<String>,
    pub payload: Option<String>,
}

pub(crate) const CHECKPOINT_COLUMNS: &str =
    "id, owner_name, payload, created_at, last_edited_at, owner_id";

impl Checkpoint {
    /// Insert a new checkpoint and return the stored row
    pub async fn create(pool: &PgPool, new: NewCheckpoint) -> Result<Checkpoint, sqlx::Error> {
        let sql = format!(
            "INSERT INTO gameplay_checkpoints (owner_name, payload, owner_id) \
             VALUES ($1, $2, $3) \
             RETURNING {CHECKPOINT_COLUMNS}"
        );

        sqlx::query_as::<_, Checkpoint>(&sql)
            .bind(new.owner_name)
            .bind(new.payload)
            .bind(new.owner_id)
            .fetch_one(pool)
            .await
    }

    /// Find a checkpoint by id, optionally restricted to an owner
    pub async fn find_by_id(
        pool: &PgPool,
        id: i64,
        owner: Option<&str>,
    ) -> Result<Option<Checkpoint>, sqlx::Error> {
        let mut scope = Checkpoint::scope().with_id(id);
        if let Some(owner) = owner {
            scope = scope.owned_by(owner);
        }

        use crate::scopes::ScopeBuilder;
        scope.first(pool).await
    }

    /// List checkpoints ordered by id ascending, optionally restricted to an owner
    pub async fn list(pool: &PgPool, owner: Option<&str>) -> Result<Vec<Checkpoint>, sqlx::Error> {
        let mut scope = Checkpoint::scope().order_by_id(true);
        if let Some(owner) = owner {
            scope = scope.owned_by(owner);
        }

        use crate::scopes::ScopeBuilder;
        scope.all(pool).await
    }

    /// Apply changes to a checkpoint and refresh `last_edited_at`
    ///
    /// The owner predicate, when present, is part of the UPDATE's WHERE
    /// clause, so a row that exists but is not owned produces `None` exactly
    /// like a missing row. `owner_id` never appears in the SET clause.
    pub async fn update(
        pool: &PgPool,
        id: i64,
        changes: CheckpointChanges,
        owner: Option<&str>,
    ) -> Result<Option<Checkpoint>, sqlx::Error> {
        let mut query: QueryBuilder<'static, Postgres> =
            QueryBuilder::new("UPDATE gameplay_checkpoints SET owner_name = COALESCE(");
        query.push_bind(changes.owner_name);
        query.push(", owner_name), payload = COALESCE(");
        query.push_bind(changes.payload);
        query.push(", payload), last_edited_at = NOW() WHERE id = ");
        query.push_bind(id);

        if let Some(owner) = owner {
            query.push(" AND owner_id = ");
            query.push_bind(owner.to_string());
        }

        query.push(format!(" RETURNING {CHECKPOINT_COLUMNS}"));

        query
            .build_query_as::<Checkpoint>()
            .fetch_optional(pool)
            .await
    }

    /// Delete a checkpoint, optionally restricted to an owner
    ///
    /// Returns whether a row was actually removed.
    pub async fn delete(pool: &PgPool, id: i64, owner: Option<&str>) -> Result<bool, sqlx::Error> {
        let mut query: QueryBuilder<'static, Postgres> =
            QueryBuilder::new("DELETE FROM gameplay_checkpoints WHERE id = ");
        query.push_bind(id);

        if let Some(owner) = owner {
            query.push(" AND owner_id = ");
            query.push_bind(owner.to_string());
        }

        let result = query.build().execute(pool).await?;

        Ok(result.rows_affected() > 0)
    }
}
