//! # Checkpoint Data Models
//!
//! Entity structs and their sqlx persistence. The model layer is pure
//! storage: the optional owner predicate is accepted as a parameter and
//! pushed into each statement, but deciding whether to apply it belongs to
//! the service layer.

pub mod checkpoint;

pub use checkpoint::{Checkpoint, CheckpointChanges, NewCheckpoint};
