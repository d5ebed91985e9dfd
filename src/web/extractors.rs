//! # Custom Axum Extractors
//!
//! Extractors for the resolved caller identity and request context. The
//! identity is placed on request extensions by the auth middleware; handlers
//! receive it through [`AuthenticatedCaller`] rather than reading any shared
//! state.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::services::AccessIdentity;
use crate::web::middleware::request_id::RequestId;
use crate::web::response_types::ApiError;

/// Authenticated caller extractor
///
/// Fails with an authentication error if the auth middleware did not run
/// for this route, so a protected handler can never execute without a
/// resolved identity.
pub struct AuthenticatedCaller {
    pub identity: AccessIdentity,
}

impl<S> FromRequestParts<S> for AuthenticatedCaller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let identity = parts
            .extensions
            .get::<AccessIdentity>()
            .ok_or(ApiError::Unauthorized)?
            .clone();

        Ok(Self { identity })
    }
}

/// Request context extractor
///
/// Extracts the request ID stamped by the request-id middleware.
pub struct RequestContext {
    pub request_id: String,
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let request_id = parts
            .extensions
            .get::<RequestId>()
            .map(|rid| rid.as_str().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        Ok(Self { request_id })
    }
}
