//! # Checkpoint Services
//!
//! The access-scoped core of the crate: a per-request authorization context
//! ([`AccessIdentity`]) and the service that consumes it to run every
//! checkpoint operation either unscoped (admin) or owner-filtered (player).

pub mod checkpoint_service;
pub mod identity;

pub use checkpoint_service::{
    CheckpointPatch, CheckpointService, CheckpointServiceError, CheckpointStore, PgCheckpointStore,
};
pub use identity::AccessIdentity;
