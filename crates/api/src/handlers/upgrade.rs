//! Intro-to-account upgrade: the one-way door from an anonymous session to a
//! full dreamer account.

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use serde_json::json;

use dreamshepherd_core::email::normalize_email;
use dreamshepherd_core::error::CoreError;
use dreamshepherd_core::naming::dream_slug;
use dreamshepherd_core::registration::RegistrationData;
use dreamshepherd_db::models::dream::{CreateDream, Dream};
use dreamshepherd_db::models::dreamer::{CreateDreamer, Dreamer};
use dreamshepherd_db::models::intro_dreamer::IntroDreamerResponse;
use dreamshepherd_db::repositories::{DreamRepo, DreamerRepo, IntroDreamerRepo};

use crate::error::{AppError, AppResult};
use crate::handlers::auth::hash_blocking;
use crate::state::AppState;

/// Result of a successful upgrade: the new account plus its migrated dream.
#[derive(Debug)]
pub struct UpgradeOutcome {
    pub dreamer: Dreamer,
    pub dream: Dream,
}

/// Convert an intro session into a full account.
///
/// The account insert, dream migration, counter update, and session removal
/// commit or roll back as one transaction: there is never a moment where
/// both the session and the account exist, or neither does.
pub async fn upgrade_to_full_account(
    state: &AppState,
    temp_token: &str,
    registration: RegistrationData,
) -> Result<UpgradeOutcome, AppError> {
    // 1. Resolve the session. Expired sessions are indistinguishable from
    //    ones that never existed.
    let intro = IntroDreamerRepo::find_by_token(&state.pool, temp_token)
        .await?
        .ok_or(CoreError::NotFound { entity: "Intro session" })?;

    // 2. The session must carry an email to become an account.
    let email = intro
        .email
        .clone()
        .ok_or_else(|| CoreError::validation("An email address is required to upgrade"))?;
    let email = normalize_email(&email);

    // 3. Refuse if a live account already owns this email.
    if DreamerRepo::find_by_email(&state.pool, &email).await?.is_some() {
        return Err(CoreError::DuplicateEmail.into());
    }

    // 4. Validate the registration form (all violations at once) and hash
    //    the password before opening the transaction.
    let valid = registration.validate().map_err(CoreError::Validation)?;
    let password_hash = hash_blocking(valid.password.clone()).await?;

    let create = CreateDreamer {
        email,
        password_hash,
        display_name: valid.display_name.or_else(|| valid.first_name.clone()),
        first_name: valid.first_name,
        last_name: valid.last_name,
        // The intro flow already walked the user through onboarding.
        onboarding_completed: true,
        intro_completed_at: Some(intro.intro_completed_at),
        theme: valid.theme.as_str().to_string(),
        animation_speed: valid.animation_speed.as_str().to_string(),
        shepherd_personality: valid.shepherd_personality.as_str().to_string(),
        notifications_enabled: valid.notifications_enabled,
        upgraded_from_intro_id: Some(intro.id),
        upgraded_from_temp_token: Some(intro.temp_token.clone()),
        upgraded_from_original_created_at: Some(intro.created_at),
        upgraded_at: Some(Utc::now()),
    };

    // 5-8. Atomically: create the account, migrate the dream with its
    //      ORIGINAL creation timestamp, set the counter, delete the session.
    let mut tx = state.pool.begin().await?;
    let dreamer = DreamerRepo::create(&mut *tx, &create).await?;
    let dream = DreamRepo::create(
        &mut *tx,
        &CreateDream {
            dreamer_id: dreamer.id,
            slug: dream_slug(&intro.dream_title),
            title: intro.dream_title.clone(),
            vision: intro.dream_vision.clone(),
            created_at: intro.created_at,
        },
    )
    .await?;
    DreamerRepo::set_dream_count(&mut *tx, dreamer.id, 1).await?;
    IntroDreamerRepo::delete(&mut *tx, intro.id).await?;
    tx.commit().await?;

    tracing::info!(
        dreamer_id = dreamer.id,
        intro_id = intro.id,
        "Intro session upgraded to full account"
    );

    // Reload so the response reflects the committed counter.
    let dreamer = DreamerRepo::find_by_id(&state.pool, dreamer.id)
        .await?
        .ok_or_else(|| AppError::InternalError("Upgraded dreamer missing after commit".into()))?;

    Ok(UpgradeOutcome { dreamer, dream })
}

/// GET /api/v1/auth/intro/{token}/upgrade
///
/// Preview what an upgrade of this session would do, without changing
/// anything.
pub async fn upgrade_preview(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let intro = IntroDreamerRepo::find_by_token(&state.pool, &token)
        .await?
        .ok_or(CoreError::NotFound { entity: "Intro session" })?;

    let email_already_registered = match &intro.email {
        Some(email) => DreamerRepo::find_by_email(&state.pool, &normalize_email(email))
            .await?
            .is_some(),
        None => false,
    };
    let can_upgrade = intro.email.is_some() && !email_already_registered;

    Ok(Json(json!({
        "introDreamer": IntroDreamerResponse::from(intro.clone()),
        "emailAlreadyRegistered": email_already_registered,
        "canUpgrade": can_upgrade,
        "wouldMigrate": {
            "dreamTitle": intro.dream_title,
            "originalCreatedAt": intro.created_at,
        },
    })))
}
