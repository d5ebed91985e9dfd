//! # Query Scopes
//!
//! Chainable query scopes for the checkpoint table. A scope records its
//! conditions as plain fields and only assembles SQL when it executes, so
//! every terminal method (`all`, `first`, `count`, `exists`) renders the
//! same predicate with the same bind values.
//!
//! The ownership filter lives here as `owned_by`: the service layer chains
//! it for player-scoped operations and omits it for admins, and the
//! predicate always travels inside the statement rather than being applied
//! in memory after the fetch.

#![allow(clippy::manual_async_fn)]

use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::models::checkpoint::{Checkpoint, CHECKPOINT_COLUMNS};

/// Base trait for all scope builders
pub trait ScopeBuilder<T> {
    /// Build the final query and execute it
    fn all(
        self,
        pool: &PgPool,
    ) -> impl std::future::Future<Output = Result<Vec<T>, sqlx::Error>> + Send;

    /// Get a single result (first match)
    fn first(
        self,
        pool: &PgPool,
    ) -> impl std::future::Future<Output = Result<Option<T>, sqlx::Error>> + Send;

    /// Count the number of results
    fn count(
        self,
        pool: &PgPool,
    ) -> impl std::future::Future<Output = Result<i64, sqlx::Error>> + Send;

    /// Check if any results exist
    fn exists(
        self,
        pool: &PgPool,
    ) -> impl std::future::Future<Output = Result<bool, sqlx::Error>> + Send;
}

/// Owner predicate recorded by a scope
#[derive(Debug, Clone, PartialEq, Eq)]
enum OwnerCondition {
    OwnedBy(String),
    Unowned,
}

/// Query builder for Checkpoint scopes
#[derive(Debug, Clone, Default)]
pub struct CheckpointScope {
    id: Option<i64>,
    owner: Option<OwnerCondition>,
    order_by_id_ascending: Option<bool>,
    limit: Option<i64>,
}

impl Checkpoint {
    /// Start building a scoped query
    pub fn scope() -> CheckpointScope {
        CheckpointScope::default()
    }
}

impl CheckpointScope {
    /// Scope: with_id - restrict to a single checkpoint id
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    /// Scope: owned_by - the ownership filter (`owner_id = subject`)
    pub fn owned_by(mut self, subject: impl Into<String>) -> Self {
        self.owner = Some(OwnerCondition::OwnedBy(subject.into()));
        self
    }

    /// Scope: unowned - rows with no owner attribution (admin-created, legacy)
    pub fn unowned(mut self) -> Self {
        self.owner = Some(OwnerCondition::Unowned);
        self
    }

    /// Add ordering on the primary key
    pub fn order_by_id(mut self, ascending: bool) -> Self {
        self.order_by_id_ascending = Some(ascending);
        self
    }

    /// Add limit
    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Render the SELECT this scope will execute (bind values as `$n`)
    pub fn to_sql(&self) -> String {
        self.build_select().sql().to_string()
    }

    /// Assemble the WHERE clause shared by SELECT and COUNT execution
    fn build_filtered(&self, select: &str) -> QueryBuilder<'static, Postgres> {
        let mut query: QueryBuilder<'static, Postgres> = QueryBuilder::new(select.to_string());
        let mut has_conditions = false;

        if let Some(id) = self.id {
            Self::push_separator(&mut query, &mut has_conditions);
            query.push("id = ");
            query.push_bind(id);
        }

        match &self.owner {
            Some(OwnerCondition::OwnedBy(subject)) => {
                Self::push_separator(&mut query, &mut has_conditions);
                query.push("owner_id = ");
                query.push_bind(subject.clone());
            }
            Some(OwnerCondition::Unowned) => {
                Self::push_separator(&mut query, &mut has_conditions);
                query.push("owner_id IS NULL");
            }
            None => {}
        }

        query
    }

    /// Assemble the full SELECT with ordering and limit applied
    fn build_select(&self) -> QueryBuilder<'static, Postgres> {
        let mut query = self.build_filtered(&format!(
            "SELECT {CHECKPOINT_COLUMNS} FROM gameplay_checkpoints"
        ));

        if let Some(ascending) = self.order_by_id_ascending {
            if ascending {
                query.push(" ORDER BY id ASC");
            } else {
                query.push(" ORDER BY id DESC");
            }
        }

        if let Some(limit) = self.limit {
            query.push(" LIMIT ");
            query.push_bind(limit);
        }

        query
    }

    /// Assemble the COUNT variant (no ordering or limit)
    fn build_count(&self) -> QueryBuilder<'static, Postgres> {
        self.build_filtered("SELECT COUNT(*) FROM gameplay_checkpoints")
    }

    fn push_separator(query: &mut QueryBuilder<'static, Postgres>, has_conditions: &mut bool) {
        if *has_conditions {
            query.push(" AND ");
        } else {
            query.push(" WHERE ");
            *has_conditions = true;
        }
    }
}

impl ScopeBuilder<Checkpoint> for CheckpointScope {
    fn all(
        self,
        pool: &PgPool,
    ) -> impl std::future::Future<Output = Result<Vec<Checkpoint>, sqlx::Error>> + Send {
        async move {
            let mut query = self.build_select();
            query.build_query_as::<Checkpoint>().fetch_all(pool).await
        }
    }

    fn first(
        mut self,
        pool: &PgPool,
    ) -> impl std::future::Future<Output = Result<Option<Checkpoint>, sqlx::Error>> + Send {
        async move {
            self.limit = Some(1);
            let mut query = self.build_select();
            query
                .build_query_as::<Checkpoint>()
                .fetch_optional(pool)
                .await
        }
    }

    fn count(
        self,
        pool: &PgPool,
    ) -> impl std::future::Future<Output = Result<i64, sqlx::Error>> + Send {
        async move {
            let mut query = self.build_count();
            let row: (i64,) = query.build_query_as().fetch_one(pool).await?;
            Ok(row.0)
        }
    }

    fn exists(
        mut self,
        pool: &PgPool,
    ) -> impl std::future::Future<Output = Result<bool, sqlx::Error>> + Send {
        async move {
            self.limit = Some(1);
            let mut query = self.build_select();
            let result = query
                .build_query_as::<Checkpoint>()
                .fetch_optional(pool)
                .await?;
            Ok(result.is_some())
        }
    }
}
