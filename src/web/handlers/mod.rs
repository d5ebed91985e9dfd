//! HTTP handlers for the checkpoint web API

pub mod checkpoints;
pub mod health;
pub mod site;
