//! Email normalization and syntax validation.
//!
//! Every email in the system is stored and compared in normalized form so
//! the unique constraint on `dreamers.email` is the final arbiter of
//! at-most-one-account-per-email.

use validator::ValidateEmail;

/// Normalize an email for storage and lookup: trim whitespace, lowercase.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Check whether a (normalized or raw) email is syntactically valid.
pub fn is_valid_email(email: &str) -> bool {
    email.trim().validate_email()
}
