//! Domain error taxonomy shared by every crate in the workspace.
//!
//! The storage and HTTP layers always translate their failures into these
//! typed variants -- a raw sqlx or jsonwebtoken error never crosses a crate
//! boundary untyped.

/// Authentication failures, kept separate from [`CoreError`] so token
/// verification can report a precise reason while the HTTP layer collapses
/// most of them into a deliberately vague 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Token is past its expiry. Distinguished from the other failures so
    /// clients can attempt a refresh instead of forcing a re-login.
    #[error("Token has expired")]
    Expired,

    /// Token was revoked: its embedded token version no longer matches the
    /// account's current revocation counter.
    #[error("Token has been revoked")]
    Revoked,

    /// Tampered, truncated, or signed with the wrong secret.
    #[error("Malformed or invalid token")]
    Malformed,

    /// A refresh token presented where an access token was expected, or
    /// vice versa.
    #[error("Wrong token kind")]
    WrongKind,

    /// Unknown email or wrong password. Reported to the client as a generic
    /// "invalid email or password" to prevent account enumeration.
    #[error("Invalid credentials")]
    WrongCredential,
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Entity absent or logically expired. The two cases are deliberately
    /// indistinguishable to avoid leaking whether a record ever existed.
    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    /// Bad input. Carries every violation found, not just the first one.
    #[error("Validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    /// A live account already exists for this email.
    #[error("An account with this email already exists")]
    DuplicateEmail,

    /// Authentication-layer failure.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Account temporarily locked after repeated failed logins. The message
    /// carries no hint about remaining attempts or lock duration.
    #[error("Account is temporarily locked")]
    Locked,

    /// Store or crypto failure. Logged server-side, never detailed to the
    /// client.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a single-violation validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        CoreError::Validation(vec![msg.into()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_joins_all_violations() {
        let err = CoreError::Validation(vec![
            "Password must be at least 8 characters".to_string(),
            "Invalid theme preference".to_string(),
        ]);
        let msg = err.to_string();
        assert!(msg.contains("Password must be at least 8 characters"));
        assert!(msg.contains("Invalid theme preference"));
    }

    #[test]
    fn auth_error_converts_into_core_error() {
        let err: CoreError = AuthError::Revoked.into();
        assert!(matches!(err, CoreError::Auth(AuthError::Revoked)));
    }
}
