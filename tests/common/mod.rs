//! Shared test helpers for the checkpoint integration tests.

pub mod memory_store;

use std::sync::Arc;

use checkpoint_core::{AccessIdentity, CheckpointService, NewCheckpoint};
use memory_store::MemoryCheckpointStore;

/// Service over a fresh in-memory store, plus the store for inspection
pub fn service_with_memory_store() -> (CheckpointService, Arc<MemoryCheckpointStore>) {
    let store = Arc::new(MemoryCheckpointStore::new());
    let service = CheckpointService::new(store.clone());
    (service, store)
}

pub fn player(subject: &str) -> AccessIdentity {
    AccessIdentity::player(subject)
}

pub fn admin() -> AccessIdentity {
    AccessIdentity::admin("ops-1")
}

pub fn new_checkpoint(owner_name: &str, payload: &str) -> NewCheckpoint {
    NewCheckpoint {
        owner_name: owner_name.to_string(),
        payload: payload.to_string(),
        owner_id: None,
    }
}
