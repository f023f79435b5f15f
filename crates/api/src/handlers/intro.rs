//! Handlers for anonymous intro sessions (`/auth/intro`).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use dreamshepherd_core::email::normalize_email;
use dreamshepherd_core::error::CoreError;
use dreamshepherd_core::intro::{
    default_reminder, expiry_from_now, IntroPayload, DEFAULT_TTL_DAYS,
};
use dreamshepherd_db::models::intro_dreamer::{
    CreateIntroDreamer, IntroDreamerResponse, UpdateIntroDreamer,
};
use dreamshepherd_db::repositories::{DreamerRepo, IntroDreamerRepo};

use crate::auth::opaque::generate_temp_token;
use crate::error::AppResult;
use crate::state::AppState;

/// POST /api/v1/auth/intro
///
/// Create an intro session. When the payload carries an email that already
/// has a live session, that session is updated in place instead of creating
/// a duplicate; an email owned by a full account is refused.
pub async fn create_intro(
    State(state): State<AppState>,
    Json(payload): Json<IntroPayload>,
) -> AppResult<Response> {
    // 1. Validate, accumulating all violations.
    payload.validate_for_create().map_err(CoreError::Validation)?;

    let email = payload.email.as_deref().map(normalize_email);
    if let Some(email) = &email {
        // 2. An email with a full account cannot start over anonymously.
        if DreamerRepo::find_by_email(&state.pool, email).await?.is_some() {
            return Err(CoreError::DuplicateEmail.into());
        }

        // 3. Upsert: reuse the live session for this email if one exists.
        //    The reminder default applies to fresh sessions only; an omitted
        //    reminder here leaves whatever the session already scheduled.
        if let Some(existing) = IntroDreamerRepo::find_by_email(&state.pool, email).await? {
            let update = UpdateIntroDreamer {
                dream_title: payload.dream_title.clone(),
                dream_vision: payload.dream_vision.clone(),
                reminder_at: payload.reminder_at,
            };
            let mut updated = IntroDreamerRepo::update(&state.pool, existing.id, &update)
                .await?
                .ok_or(CoreError::NotFound { entity: "Intro session" })?;

            let new_expiry = expiry_from_now(DEFAULT_TTL_DAYS);
            IntroDreamerRepo::extend(&state.pool, updated.id, new_expiry).await?;
            updated.expires_at = new_expiry;

            tracing::info!(intro_id = updated.id, "Intro session reused by email");
            return Ok(
                (StatusCode::CREATED, Json(IntroDreamerResponse::from(updated))).into_response(),
            );
        }
    }

    // 4. Fresh session: mint a bearer token, default the reminder two days
    //    out, expire in thirty.
    let create = CreateIntroDreamer {
        email,
        temp_token: generate_temp_token(),
        dream_title: payload.dream_title.clone().unwrap_or_default(),
        dream_vision: payload.dream_vision.clone().unwrap_or_default(),
        reminder_at: Some(payload.reminder_at.unwrap_or_else(default_reminder)),
        expires_at: expiry_from_now(DEFAULT_TTL_DAYS),
    };
    let created = IntroDreamerRepo::create(&state.pool, &create).await?;
    tracing::info!(intro_id = created.id, "Intro session created");

    Ok((StatusCode::CREATED, Json(IntroDreamerResponse::from(created))).into_response())
}

/// GET /api/v1/auth/intro/{token}
///
/// Fetch a live session by bearer token. Counts as activity.
pub async fn get_intro(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<Json<IntroDreamerResponse>> {
    let intro = IntroDreamerRepo::find_by_token(&state.pool, &token)
        .await?
        .ok_or(CoreError::NotFound { entity: "Intro session" })?;

    // Activity tracking must never fail the read.
    if let Err(err) = IntroDreamerRepo::touch_last_active(&state.pool, intro.id).await {
        tracing::warn!(intro_id = intro.id, error = %err, "Failed to touch last_active_at");
    }

    Ok(Json(intro.into()))
}

/// PUT /api/v1/auth/intro/{token}
///
/// Update a live session and push its expiry forward: a returning anonymous
/// user keeps their thirty-day window rolling.
pub async fn update_intro(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(payload): Json<IntroPayload>,
) -> AppResult<Json<IntroDreamerResponse>> {
    payload.validate_for_update().map_err(CoreError::Validation)?;

    let intro = IntroDreamerRepo::find_by_token(&state.pool, &token)
        .await?
        .ok_or(CoreError::NotFound { entity: "Intro session" })?;

    let update = UpdateIntroDreamer {
        dream_title: payload.dream_title.clone(),
        dream_vision: payload.dream_vision.clone(),
        reminder_at: payload.reminder_at,
    };
    let mut updated = IntroDreamerRepo::update(&state.pool, intro.id, &update)
        .await?
        .ok_or(CoreError::NotFound { entity: "Intro session" })?;

    let new_expiry = expiry_from_now(DEFAULT_TTL_DAYS);
    IntroDreamerRepo::extend(&state.pool, updated.id, new_expiry).await?;
    updated.expires_at = new_expiry;

    Ok(Json(updated.into()))
}

/// POST /api/v1/auth/intro/{token}/prompt-shown
///
/// Record that the upgrade prompt was displayed. Idempotent, and silent
/// about whether the session exists.
pub async fn mark_prompt_shown(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<StatusCode> {
    if let Some(intro) = IntroDreamerRepo::find_by_token(&state.pool, &token).await? {
        IntroDreamerRepo::mark_upgrade_prompt_shown(&state.pool, intro.id).await?;
    }
    Ok(StatusCode::NO_CONTENT)
}
