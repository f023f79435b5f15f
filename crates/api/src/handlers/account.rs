//! Account maintenance: password reset and email verification.
//!
//! Both flows use opaque single-use tokens whose digests live on the dreamer
//! row. Delivery (email) is an external concern; these handlers only mint,
//! store, and redeem.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{Duration, Utc};
use serde::Deserialize;
use serde_json::json;

use dreamshepherd_core::email::normalize_email;
use dreamshepherd_core::error::CoreError;
use dreamshepherd_db::models::dreamer::{Dreamer, DreamerResponse};
use dreamshepherd_db::repositories::DreamerRepo;

use crate::auth::opaque::{generate_opaque_token, hash_opaque_token};
use crate::error::AppResult;
use crate::handlers::auth::hash_blocking;
use crate::state::AppState;

/// Password reset tokens are short-lived.
const RESET_TOKEN_MINUTES: i64 = 10;

/// Email verification tokens last a day.
const VERIFICATION_TOKEN_HOURS: i64 = 24;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/password-reset/request`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetRequest {
    pub email: String,
}

/// Request body for `POST /auth/password-reset/confirm`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetConfirm {
    pub token: String,
    pub new_password: String,
}

/// Request body for `POST /auth/verify-email`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyEmailRequest {
    pub token: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/password-reset/request
///
/// Mint a reset token for the account, if one exists. The response is the
/// same either way so the endpoint cannot be used to enumerate accounts.
pub async fn request_password_reset(
    State(state): State<AppState>,
    Json(input): Json<ResetRequest>,
) -> AppResult<Response> {
    let email = normalize_email(&input.email);

    if let Some(dreamer) = DreamerRepo::find_by_email(&state.pool, &email).await? {
        let (_raw, digest) = generate_opaque_token();
        let expires_at = Utc::now() + Duration::minutes(RESET_TOKEN_MINUTES);
        DreamerRepo::set_password_reset_token(&state.pool, dreamer.id, &digest, expires_at)
            .await?;
        // The raw token goes to the mail pipeline, never into a response or
        // a log line.
        tracing::info!(dreamer_id = dreamer.id, "Password reset token issued");
    }

    let body = json!({
        "message": "If that email is registered, a reset link is on its way",
    });
    Ok((StatusCode::ACCEPTED, Json(body)).into_response())
}

/// POST /api/v1/auth/password-reset/confirm
///
/// Redeem a reset token and set a new password. Every outstanding token for
/// the account is revoked: a stolen session does not survive a reset.
pub async fn confirm_password_reset(
    State(state): State<AppState>,
    Json(input): Json<ResetConfirm>,
) -> AppResult<StatusCode> {
    // 1. Look up by digest. An expired token is indistinguishable from one
    //    that never existed.
    let digest = hash_opaque_token(&input.token);
    let dreamer = DreamerRepo::find_by_password_reset_digest(&state.pool, &digest)
        .await?
        .ok_or(CoreError::NotFound { entity: "Password reset token" })?;

    // 2. Hash the replacement (enforces minimum length) and store it; the
    //    update clears the reset token, making it single-use.
    let password_hash = hash_blocking(input.new_password).await?;
    DreamerRepo::update_password(&state.pool, dreamer.id, &password_hash).await?;

    // 3. Invalidate every token issued before the reset.
    DreamerRepo::revoke_all_sessions(&state.pool, dreamer.id).await?;
    tracing::info!(dreamer_id = dreamer.id, "Password reset completed, sessions revoked");

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/auth/verify-email
///
/// Redeem an email verification token.
pub async fn verify_email(
    State(state): State<AppState>,
    Json(input): Json<VerifyEmailRequest>,
) -> AppResult<Json<DreamerResponse>> {
    let digest = hash_opaque_token(&input.token);
    let dreamer = DreamerRepo::verify_email_by_digest(&state.pool, &digest)
        .await?
        .ok_or(CoreError::NotFound { entity: "Verification token" })?;

    tracing::info!(dreamer_id = dreamer.id, "Email verified");
    Ok(Json(dreamer.into()))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Mint and store an email verification token for a new account. The raw
/// token is handed to the mail pipeline.
pub(crate) async fn issue_email_verification(
    state: &AppState,
    dreamer: &Dreamer,
) -> AppResult<()> {
    let (_raw, digest) = generate_opaque_token();
    let expires_at = Utc::now() + Duration::hours(VERIFICATION_TOKEN_HOURS);
    DreamerRepo::set_email_verification_token(&state.pool, dreamer.id, &digest, expires_at)
        .await?;
    tracing::info!(dreamer_id = dreamer.id, "Email verification token issued");
    Ok(())
}
