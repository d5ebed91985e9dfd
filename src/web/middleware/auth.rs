//! # Session Authentication Middleware
//!
//! Resolves the bearer credential into an [`AccessIdentity`] and attaches it
//! to the request's extensions. Resolution happens once per request and the
//! result lives only on that request; there is no process-wide role state.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tracing::{debug, warn};

use crate::services::AccessIdentity;
use crate::web::auth::SessionVerifier;
use crate::web::response_types::ApiError;
use crate::web::state::AppState;

/// Authentication middleware for the protected checkpoint routes
///
/// Rejects the request before any handler logic runs when the credential is
/// missing, malformed, or unverifiable.
pub async fn authenticate_request(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let identity = if state.auth_enabled() {
        let auth_header = request
            .headers()
            .get("authorization")
            .ok_or_else(|| ApiError::auth_error("Missing authorization header"))?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| ApiError::auth_error("Invalid authorization header format"))?;

        let token = SessionVerifier::extract_bearer_token(auth_str)
            .map_err(|_| ApiError::auth_error("Authorization header must use Bearer scheme"))?;

        state.verifier.resolve_identity(token).map_err(|e| {
            warn!(error = %e, "Session token resolution failed");
            ApiError::auth_error("Invalid or expired session token")
        })?
    } else {
        // Local development mode: a fixed admin identity stands in for the
        // identity resolver
        debug!("Session authentication disabled - using local admin identity");
        AccessIdentity::admin("local-admin")
    };

    debug!(
        subject = %identity.subject(),
        admin = identity.is_admin(),
        "Authenticated checkpoint request"
    );

    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}
