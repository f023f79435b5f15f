//! Dreamer (full account) model and DTOs.

use serde::Serialize;
use sqlx::FromRow;

use dreamshepherd_core::types::{DbId, Timestamp};

/// Full dreamer row from the `dreamers` table.
///
/// Contains the password hash and single-use token digests -- NEVER
/// serialize this to API responses directly. Use [`DreamerResponse`] for
/// external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct Dreamer {
    pub id: DbId,
    pub email: String,
    pub password_hash: String,
    pub is_email_verified: bool,
    pub email_verification_token_hash: Option<String>,
    pub email_verification_expires_at: Option<Timestamp>,
    pub password_reset_token_hash: Option<String>,
    pub password_reset_expires_at: Option<Timestamp>,
    pub failed_login_count: i32,
    pub locked_until: Option<Timestamp>,
    pub token_version: i32,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub display_name: Option<String>,
    pub onboarding_completed: bool,
    pub intro_completed_at: Option<Timestamp>,
    pub journey_started_at: Option<Timestamp>,
    pub theme: String,
    pub animation_speed: String,
    pub shepherd_personality: String,
    pub notifications_enabled: bool,
    pub upgraded_from_intro_id: Option<DbId>,
    pub upgraded_from_temp_token: Option<String>,
    pub upgraded_from_original_created_at: Option<Timestamp>,
    pub upgraded_at: Option<Timestamp>,
    pub dream_count: i32,
    pub goal_count: i32,
    pub last_login_at: Option<Timestamp>,
    pub last_active_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a new dreamer.
#[derive(Debug)]
pub struct CreateDreamer {
    pub email: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub display_name: Option<String>,
    pub onboarding_completed: bool,
    pub intro_completed_at: Option<Timestamp>,
    pub theme: String,
    pub animation_speed: String,
    pub shepherd_personality: String,
    pub notifications_enabled: bool,
    pub upgraded_from_intro_id: Option<DbId>,
    pub upgraded_from_temp_token: Option<String>,
    pub upgraded_from_original_created_at: Option<Timestamp>,
    pub upgraded_at: Option<Timestamp>,
}

impl CreateDreamer {
    /// Minimal input for direct (no intro session) registration.
    pub fn direct(email: String, password_hash: String) -> Self {
        Self {
            email,
            password_hash,
            first_name: None,
            last_name: None,
            display_name: None,
            onboarding_completed: false,
            intro_completed_at: None,
            theme: "light".to_string(),
            animation_speed: "slow".to_string(),
            shepherd_personality: "gentle".to_string(),
            notifications_enabled: true,
            upgraded_from_intro_id: None,
            upgraded_from_temp_token: None,
            upgraded_from_original_created_at: None,
            upgraded_at: None,
        }
    }
}

/// Profile sub-object embedded in [`DreamerResponse`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub display_name: Option<String>,
    pub onboarding_completed: bool,
    pub intro_completed_at: Option<Timestamp>,
    pub journey_started_at: Option<Timestamp>,
    pub preferences: PreferencesView,
}

/// Preference block embedded in [`ProfileView`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesView {
    pub theme: String,
    pub animation_speed: String,
    pub shepherd_personality: String,
    pub notifications: bool,
}

/// Provenance block for accounts that came from an intro session. Only
/// timestamps are exposed -- never the original bearer token.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvenanceView {
    pub original_created_at: Option<Timestamp>,
    pub upgraded_at: Option<Timestamp>,
}

/// Safe dreamer representation for API responses. Excludes the credential
/// and every single-use token digest.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DreamerResponse {
    pub id: DbId,
    pub email: String,
    pub is_email_verified: bool,
    pub profile: ProfileView,
    pub dream_count: i32,
    pub goal_count: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upgraded_from: Option<ProvenanceView>,
    pub created_at: Timestamp,
    pub last_active_at: Timestamp,
}

impl From<Dreamer> for DreamerResponse {
    fn from(d: Dreamer) -> Self {
        let upgraded_from = d.upgraded_at.map(|upgraded_at| ProvenanceView {
            original_created_at: d.upgraded_from_original_created_at,
            upgraded_at: Some(upgraded_at),
        });
        DreamerResponse {
            id: d.id,
            email: d.email,
            is_email_verified: d.is_email_verified,
            profile: ProfileView {
                first_name: d.first_name,
                last_name: d.last_name,
                display_name: d.display_name,
                onboarding_completed: d.onboarding_completed,
                intro_completed_at: d.intro_completed_at,
                journey_started_at: d.journey_started_at,
                preferences: PreferencesView {
                    theme: d.theme,
                    animation_speed: d.animation_speed,
                    shepherd_personality: d.shepherd_personality,
                    notifications: d.notifications_enabled,
                },
            },
            dream_count: d.dream_count,
            goal_count: d.goal_count,
            upgraded_from,
            created_at: d.created_at,
            last_active_at: d.last_active_at,
        }
    }
}
