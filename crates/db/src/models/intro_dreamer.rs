//! IntroDreamer (anonymous session record) model and DTOs.

use serde::Serialize;
use sqlx::FromRow;

use dreamshepherd_core::types::{DbId, Timestamp};

/// An intro session row from the `intro_dreamers` table.
///
/// Keyed externally by the opaque `temp_token`; rows past `expires_at` are
/// logically nonexistent and are excluded by every repository lookup.
#[derive(Debug, Clone, FromRow)]
pub struct IntroDreamer {
    pub id: DbId,
    pub email: Option<String>,
    pub temp_token: String,
    pub dream_title: String,
    pub dream_vision: String,
    pub reminder_at: Option<Timestamp>,
    pub reminder_sent: bool,
    pub reminder_email_sent_at: Option<Timestamp>,
    pub intro_completed_at: Timestamp,
    pub last_active_at: Timestamp,
    pub upgrade_prompt_shown: bool,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
}

/// DTO for inserting a new intro session.
#[derive(Debug)]
pub struct CreateIntroDreamer {
    pub email: Option<String>,
    pub temp_token: String,
    pub dream_title: String,
    pub dream_vision: String,
    pub reminder_at: Option<Timestamp>,
    pub expires_at: Timestamp,
}

/// DTO for updating an intro session. Only non-`None` fields are applied;
/// supplying a new reminder resets the `reminder_sent` flag.
#[derive(Debug, Default)]
pub struct UpdateIntroDreamer {
    pub dream_title: Option<String>,
    pub dream_vision: Option<String>,
    pub reminder_at: Option<Timestamp>,
}

/// Safe intro session representation for API responses. The bearer token is
/// included -- it belongs to the client that holds the session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntroDreamerResponse {
    pub id: DbId,
    pub email: Option<String>,
    pub temp_token: String,
    pub dream_title: String,
    pub dream_vision: String,
    pub reminder_at: Option<Timestamp>,
    pub reminder_sent: bool,
    pub intro_completed_at: Timestamp,
    pub last_active_at: Timestamp,
    pub upgrade_prompt_shown: bool,
    pub expires_at: Timestamp,
}

impl From<IntroDreamer> for IntroDreamerResponse {
    fn from(i: IntroDreamer) -> Self {
        IntroDreamerResponse {
            id: i.id,
            email: i.email,
            temp_token: i.temp_token,
            dream_title: i.dream_title,
            dream_vision: i.dream_vision,
            reminder_at: i.reminder_at,
            reminder_sent: i.reminder_sent,
            intro_completed_at: i.intro_completed_at,
            last_active_at: i.last_active_at,
            upgrade_prompt_shown: i.upgrade_prompt_shown,
            expires_at: i.expires_at,
        }
    }
}
