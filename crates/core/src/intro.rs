//! Intro session rules: payload limits, expiry, and reminder scheduling.
//!
//! The storage layer treats any row past its expiry as nonexistent; these
//! helpers encode the pure time-based rules so they can be tested without a
//! database.

use chrono::{Duration, Utc};
use serde::Deserialize;

use crate::email::is_valid_email;
use crate::types::Timestamp;

/// Maximum dream title length.
pub const MAX_TITLE_LEN: usize = 200;
/// Maximum dream vision length. Generous -- the vision is rich-text JSON.
pub const MAX_VISION_LEN: usize = 10_000;
/// Default intro session lifetime in days.
pub const DEFAULT_TTL_DAYS: i64 = 30;
/// Default reminder offset in days when the client does not pick one.
pub const DEFAULT_REMINDER_DAYS: i64 = 2;

/// Client payload for creating or updating an intro session.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntroPayload {
    pub email: Option<String>,
    pub dream_title: Option<String>,
    pub dream_vision: Option<String>,
    pub reminder_at: Option<Timestamp>,
}

impl IntroPayload {
    /// Validate a creation payload, accumulating all violations.
    ///
    /// `dream_title` is required on creation; email stays optional.
    pub fn validate_for_create(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        match &self.dream_title {
            None => errors.push("Dream title is required".to_string()),
            Some(title) if title.trim().is_empty() => {
                errors.push("Dream title is required".to_string());
            }
            Some(_) => {}
        }
        self.check_common(&mut errors);
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Validate an update payload. All fields are optional on update.
    pub fn validate_for_update(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        if let Some(title) = &self.dream_title {
            if title.trim().is_empty() {
                errors.push("Dream title cannot be empty".to_string());
            }
        }
        self.check_common(&mut errors);
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    fn check_common(&self, errors: &mut Vec<String>) {
        if let Some(title) = &self.dream_title {
            if title.chars().count() > MAX_TITLE_LEN {
                errors.push(format!("Dream title cannot exceed {MAX_TITLE_LEN} characters"));
            }
        }
        if let Some(vision) = &self.dream_vision {
            if vision.chars().count() > MAX_VISION_LEN {
                errors.push(format!("Vision cannot exceed {MAX_VISION_LEN} characters"));
            }
        }
        if let Some(email) = &self.email {
            if !is_valid_email(email) {
                errors.push("Please enter a valid email".to_string());
            }
        }
        if let Some(reminder) = self.reminder_at {
            if reminder <= Utc::now() {
                errors.push("Reminder must be set for a future date and time".to_string());
            }
        }
    }
}

/// Expiry timestamp for a session created or extended now.
pub fn expiry_from_now(days: i64) -> Timestamp {
    Utc::now() + Duration::days(days)
}

/// Default reminder timestamp when the client does not supply one.
pub fn default_reminder() -> Timestamp {
    Utc::now() + Duration::days(DEFAULT_REMINDER_DAYS)
}

/// Whether a session is logically expired at time `now`.
pub fn is_expired(expires_at: Timestamp, now: Timestamp) -> bool {
    expires_at <= now
}

/// Whether a reminder is due: a reminder time has arrived, it has not been
/// sent yet, and the session itself has not expired.
pub fn is_reminder_due(
    reminder_at: Option<Timestamp>,
    reminder_sent: bool,
    expires_at: Timestamp,
    now: Timestamp,
) -> bool {
    match reminder_at {
        Some(at) => at <= now && !reminder_sent && !is_expired(expires_at, now),
        None => false,
    }
}
