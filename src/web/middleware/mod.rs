//! Middleware for the checkpoint web API

pub mod auth;
pub mod request_id;
