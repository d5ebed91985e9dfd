//! # Session Token Verification
//!
//! RS256 session-token verification using RSA public/private key pairs. The
//! verifier is this repository's identity resolver: it exchanges a bearer
//! credential for a verified subject and role claims before any checkpoint
//! logic runs.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rsa::{
    pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey, EncodeRsaPrivateKey, EncodeRsaPublicKey},
    pkcs8::DecodePrivateKey,
    pkcs8::DecodePublicKey,
    RsaPrivateKey, RsaPublicKey,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::AuthConfig;
use crate::services::AccessIdentity;

/// Session authentication errors
#[derive(Error, Debug)]
pub enum SessionAuthError {
    #[error("RSA key parsing error: {0}")]
    KeyParsingError(String),

    #[error("Session auth configuration error: {0}")]
    ConfigurationError(String),

    #[error("Session token processing error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("Invalid session token: {0}")]
    InvalidToken(String),

    #[error("Invalid authorization header format")]
    InvalidAuthFormat,
}

/// Claims carried by a session token
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    /// Subject (player or operator identifier)
    pub sub: String,
    /// Roles granted to the subject
    pub roles: Vec<String>,
    /// Token issuer
    pub iss: String,
    /// Token audience
    pub aud: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at time (Unix timestamp)
    pub iat: i64,
}

/// Session token verifier
///
/// Built once from configuration and shared through the application state;
/// resolution itself is per-request and its outcome is never cached.
#[derive(Clone)]
pub struct SessionVerifier {
    config: AuthConfig,
    encoding_key: Option<EncodingKey>,
    decoding_key: Option<DecodingKey>,
}

impl SessionVerifier {
    /// Create a verifier from configuration
    pub fn from_config(config: &AuthConfig) -> Result<Self, SessionAuthError> {
        if !config.enabled {
            debug!("Session authentication disabled");
            return Ok(Self {
                config: config.clone(),
                encoding_key: None,
                decoding_key: None,
            });
        }

        if config.session_public_key.is_empty() {
            return Err(SessionAuthError::ConfigurationError(
                "Session public key not configured".to_string(),
            ));
        }

        let decoding_key = Some(Self::parse_public_key(&config.session_public_key)?);

        // The private key is only needed for minting (tests, tooling)
        let encoding_key = if config.session_private_key.is_empty() {
            None
        } else {
            Some(Self::parse_private_key(&config.session_private_key)?)
        };

        debug!("Session verifier configured with RSA keys");

        Ok(Self {
            config: config.clone(),
            encoding_key,
            decoding_key,
        })
    }

    /// Parse RSA private key from PEM string
    fn parse_private_key(pem_str: &str) -> Result<EncodingKey, SessionAuthError> {
        // Try PKCS#8 format first (modern standard)
        if let Ok(key) = RsaPrivateKey::from_pkcs8_pem(pem_str) {
            let der = key.to_pkcs1_der().map_err(|e| {
                SessionAuthError::KeyParsingError(format!(
                    "Failed to convert private key to DER: {e}"
                ))
            })?;
            return Ok(EncodingKey::from_rsa_der(der.as_bytes()));
        }

        // Fall back to PKCS#1 format (legacy)
        if let Ok(key) = RsaPrivateKey::from_pkcs1_pem(pem_str) {
            let der = key.to_pkcs1_der().map_err(|e| {
                SessionAuthError::KeyParsingError(format!(
                    "Failed to convert private key to DER: {e}"
                ))
            })?;
            return Ok(EncodingKey::from_rsa_der(der.as_bytes()));
        }

        Err(SessionAuthError::KeyParsingError(
            "Failed to parse RSA private key from PEM".to_string(),
        ))
    }

    /// Parse RSA public key from PEM string
    fn parse_public_key(pem_str: &str) -> Result<DecodingKey, SessionAuthError> {
        // Try PKCS#8 format first (modern standard)
        if let Ok(key) = RsaPublicKey::from_public_key_pem(pem_str) {
            let der = key.to_pkcs1_der().map_err(|e| {
                SessionAuthError::KeyParsingError(format!(
                    "Failed to convert public key to DER: {e}"
                ))
            })?;
            return Ok(DecodingKey::from_rsa_der(der.as_bytes()));
        }

        // Fall back to PKCS#1 format (legacy)
        if let Ok(key) = RsaPublicKey::from_pkcs1_pem(pem_str) {
            let der = key.to_pkcs1_der().map_err(|e| {
                SessionAuthError::KeyParsingError(format!(
                    "Failed to convert public key to DER: {e}"
                ))
            })?;
            return Ok(DecodingKey::from_rsa_der(der.as_bytes()));
        }

        Err(SessionAuthError::KeyParsingError(
            "Failed to parse RSA public key from PEM".to_string(),
        ))
    }

    /// Validate a session token and return its claims
    pub fn validate_session_token(&self, token: &str) -> Result<SessionClaims, SessionAuthError> {
        let decoding_key = self.decoding_key.as_ref().ok_or_else(|| {
            SessionAuthError::ConfigurationError("Decoding key not configured".to_string())
        })?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_audience(&[&self.config.audience]);
        validation.validate_exp = true;
        validation.validate_nbf = false; // Not using 'not before' field

        let token_data = decode::<SessionClaims>(token, decoding_key, &validation).map_err(|e| {
            warn!(error = %e, "Session token validation failed");
            SessionAuthError::JwtError(e)
        })?;

        Ok(token_data.claims)
    }

    /// Resolve a bearer credential into an [`AccessIdentity`]
    ///
    /// With auth disabled (local development) this short-circuits to a fixed
    /// admin identity. A non-admin claim set with an empty subject is itself
    /// a resolution failure.
    pub fn resolve_identity(&self, token: &str) -> Result<AccessIdentity, SessionAuthError> {
        if !self.config.enabled {
            debug!("Session auth disabled, resolving local admin identity");
            return Ok(AccessIdentity::admin("local-admin"));
        }

        let claims = self.validate_session_token(token)?;
        let is_admin = claims.roles.iter().any(|r| r == &self.config.admin_role);

        if !is_admin && claims.sub.is_empty() {
            return Err(SessionAuthError::InvalidToken(
                "Player token carries an empty subject".to_string(),
            ));
        }

        debug!(
            subject = %claims.sub,
            admin = is_admin,
            "Session identity resolved"
        );

        if is_admin {
            Ok(AccessIdentity::admin(claims.sub))
        } else {
            Ok(AccessIdentity::player(claims.sub))
        }
    }

    /// Mint a session token for a subject (tests and operational tooling)
    pub fn generate_session_token(
        &self,
        subject: &str,
        roles: Vec<String>,
    ) -> Result<String, SessionAuthError> {
        if !self.config.enabled {
            return Ok(format!("local-token-{subject}"));
        }

        let encoding_key = self.encoding_key.as_ref().ok_or_else(|| {
            SessionAuthError::ConfigurationError("Encoding key not configured".to_string())
        })?;

        let now = Utc::now();
        let expiry = now + Duration::hours(self.config.token_expiry_hours as i64);

        let claims = SessionClaims {
            sub: subject.to_string(),
            roles,
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            exp: expiry.timestamp(),
            iat: now.timestamp(),
        };

        let header = Header::new(Algorithm::RS256);
        let token = encode(&header, &claims, encoding_key)?;

        Ok(token)
    }

    /// Extract the bearer token from an Authorization header value
    pub fn extract_bearer_token(auth_header: &str) -> Result<&str, SessionAuthError> {
        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(SessionAuthError::InvalidAuthFormat)?;

        if token.is_empty() {
            return Err(SessionAuthError::InvalidAuthFormat);
        }

        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(
            SessionVerifier::extract_bearer_token("Bearer abc123").unwrap(),
            "abc123"
        );

        assert!(SessionVerifier::extract_bearer_token("Basic abc123").is_err());
        assert!(SessionVerifier::extract_bearer_token("Bearer ").is_err());
        assert!(SessionVerifier::extract_bearer_token("abc123").is_err());
    }

    #[test]
    fn test_disabled_auth_resolves_admin() {
        let config = AuthConfig {
            enabled: false,
            session_public_key: String::new(),
            session_private_key: String::new(),
            token_expiry_hours: 24,
            issuer: "checkpoint-service".to_string(),
            audience: "checkpoint-players".to_string(),
            admin_role: "game_admin".to_string(),
        };

        let verifier = SessionVerifier::from_config(&config).unwrap();
        let identity = verifier.resolve_identity("anything").unwrap();
        assert!(identity.is_admin());
    }

    #[test]
    fn test_enabled_auth_requires_public_key() {
        let config = AuthConfig {
            enabled: true,
            session_public_key: String::new(),
            session_private_key: String::new(),
            token_expiry_hours: 24,
            issuer: "checkpoint-service".to_string(),
            audience: "checkpoint-players".to_string(),
            admin_role: "game_admin".to_string(),
        };

        assert!(matches!(
            SessionVerifier::from_config(&config),
            Err(SessionAuthError::ConfigurationError(_))
        ));
    }
}
