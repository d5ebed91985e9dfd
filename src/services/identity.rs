//! # Access Identity
//!
//! The resolved caller identity for a single request: a verified subject
//! identifier plus the admin claim. The value is created once per request by
//! the session middleware and carried on that request's extensions; it is
//! never stored in process-wide state, so one request's role determination
//! cannot leak into a concurrently-running request.

use serde::Serialize;

/// Request-scoped authorization context
///
/// Consumed by [`CheckpointService`](crate::services::CheckpointService) to
/// decide whether an operation runs unscoped or with the ownership filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessIdentity {
    subject: String,
    admin: bool,
}

impl AccessIdentity {
    /// Identity with unscoped access to all checkpoints
    pub fn admin(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            admin: true,
        }
    }

    /// Identity restricted to checkpoints it owns
    pub fn player(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            admin: false,
        }
    }

    /// The verified subject identifier
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Whether the caller holds the admin claim
    pub fn is_admin(&self) -> bool {
        self.admin
    }

    /// The ownership filter for this caller
    ///
    /// `None` means unscoped (admin); `Some(subject)` is the equality
    /// predicate pushed into every player query.
    pub fn owner_filter(&self) -> Option<&str> {
        if self.admin {
            None
        } else {
            Some(&self.subject)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_has_no_owner_filter() {
        let identity = AccessIdentity::admin("ops-1");
        assert!(identity.is_admin());
        assert_eq!(identity.owner_filter(), None);
    }

    #[test]
    fn test_player_filter_is_their_subject() {
        let identity = AccessIdentity::player("p-1");
        assert!(!identity.is_admin());
        assert_eq!(identity.owner_filter(), Some("p-1"));
        assert_eq!(identity.subject(), "p-1");
    }
}
