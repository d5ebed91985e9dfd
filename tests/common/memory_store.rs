//! In-memory [`CheckpointStore`] double.
//!
//! Mirrors the PostgreSQL store's contract closely enough to exercise the
//! access-scoped service without a database: ids are assigned from a
//! sequence and never reused, rows come back ordered by id, the owner
//! predicate is applied inside each operation, and `last_edited_at` strictly
//! increases on every applied update. A one-shot failure can be injected to
//! test the store-error path.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

use checkpoint_core::{Checkpoint, CheckpointChanges, CheckpointStore, NewCheckpoint};

#[derive(Default)]
struct Inner {
    next_id: i64,
    rows: BTreeMap<i64, Checkpoint>,
    fail_next: bool,
}

#[derive(Default)]
pub struct MemoryCheckpointStore {
    inner: Mutex<Inner>,
}

impl MemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next store operation fail with a backend error
    pub fn fail_next_operation(&self) {
        self.inner.lock().fail_next = true;
    }

    /// Direct read of a stored row, bypassing any scoping (test inspection)
    pub fn raw_get(&self, id: i64) -> Option<Checkpoint> {
        self.inner.lock().rows.get(&id).cloned()
    }

    fn check_failure(inner: &mut Inner) -> Result<(), sqlx::Error> {
        if inner.fail_next {
            inner.fail_next = false;
            return Err(sqlx::Error::Protocol("injected store failure".into()));
        }
        Ok(())
    }

    fn owner_matches(row: &Checkpoint, owner: Option<&str>) -> bool {
        match owner {
            Some(subject) => row.owner_id.as_deref() == Some(subject),
            None => true,
        }
    }
}

#[async_trait]
impl CheckpointStore for MemoryCheckpointStore {
    async fn insert(&self, record: NewCheckpoint) -> Result<Checkpoint, sqlx::Error> {
        let mut inner = self.inner.lock();
        Self::check_failure(&mut inner)?;

        inner.next_id += 1;
        let id = inner.next_id;
        let now = Utc::now().naive_utc();

        let checkpoint = Checkpoint {
            id,
            owner_name: record.owner_name,
            payload: record.payload,
            created_at: now,
            last_edited_at: now,
            owner_id: record.owner_id,
        };

        inner.rows.insert(id, checkpoint.clone());
        Ok(checkpoint)
    }

    async fn fetch(
        &self,
        id: i64,
        owner: Option<&str>,
    ) -> Result<Option<Checkpoint>, sqlx::Error> {
        let mut inner = self.inner.lock();
        Self::check_failure(&mut inner)?;

        Ok(inner
            .rows
            .get(&id)
            .filter(|row| Self::owner_matches(row, owner))
            .cloned())
    }

    async fn fetch_all(&self, owner: Option<&str>) -> Result<Vec<Checkpoint>, sqlx::Error> {
        let mut inner = self.inner.lock();
        Self::check_failure(&mut inner)?;

        Ok(inner
            .rows
            .values()
            .filter(|row| Self::owner_matches(row, owner))
            .cloned()
            .collect())
    }

    async fn apply_changes(
        &self,
        id: i64,
        changes: CheckpointChanges,
        owner: Option<&str>,
    ) -> Result<Option<Checkpoint>, sqlx::Error> {
        let mut inner = self.inner.lock();
        Self::check_failure(&mut inner)?;

        let Some(row) = inner
            .rows
            .get_mut(&id)
            .filter(|row| Self::owner_matches(row, owner))
        else {
            return Ok(None);
        };

        if let Some(owner_name) = changes.owner_name {
            row.owner_name = owner_name;
        }
        if let Some(payload) = changes.payload {
            row.payload = payload;
        }

        // Strictly monotonic even when updates land within clock resolution
        let now = Utc::now().naive_utc();
        row.last_edited_at = if now > row.last_edited_at {
            now
        } else {
            row.last_edited_at + chrono::Duration::microseconds(1)
        };

        Ok(Some(row.clone()))
    }

    async fn remove(&self, id: i64, owner: Option<&str>) -> Result<bool, sqlx::Error> {
        let mut inner = self.inner.lock();
        Self::check_failure(&mut inner)?;

        let matches = inner
            .rows
            .get(&id)
            .map(|row| Self::owner_matches(row, owner))
            .unwrap_or(false);

        if matches {
            inner.rows.remove(&id);
        }

        Ok(matches)
    }
}
