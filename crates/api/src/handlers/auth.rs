//! Handlers for the `/auth` resource (register, login, refresh, logout, me).

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use dreamshepherd_core::email::{is_valid_email, normalize_email};
use dreamshepherd_core::error::{AuthError, CoreError};
use dreamshepherd_core::registration::RegistrationData;
use dreamshepherd_db::models::dreamer::{CreateDreamer, Dreamer, DreamerResponse};
use dreamshepherd_db::models::dream::DreamResponse;
use dreamshepherd_db::repositories::DreamerRepo;

use crate::auth::cookie;
use crate::auth::jwt::{self, TokenKind, TokenPair};
use crate::auth::password;
use crate::error::{AppError, AppResult};
use crate::handlers::{account, upgrade};
use crate::middleware::auth::AuthDreamer;
use crate::state::AppState;

/// Maximum consecutive failed login attempts before locking the account.
const MAX_FAILED_ATTEMPTS: i32 = 5;

/// Duration in hours to lock an account after exceeding failed attempts.
const LOCK_DURATION_HOURS: i64 = 2;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
///
/// With `tempToken` this is an upgrade of an existing intro session; without
/// it, a direct registration (then `email` is required).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub temp_token: Option<String>,
    pub email: Option<String>,
    #[serde(flatten)]
    pub registration: RegistrationData,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Optional request body for `POST /auth/refresh`. The cookie takes
/// precedence; the body field exists for clients that cannot send cookies.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/register
///
/// Create a full account, either by upgrading an intro session (when
/// `tempToken` is present) or directly from email + password.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<Response> {
    // Upgrade path: the intro session supplies email and dream content.
    if let Some(temp_token) = input.temp_token {
        let outcome =
            upgrade::upgrade_to_full_account(&state, &temp_token, input.registration).await?;
        account::issue_email_verification(&state, &outcome.dreamer).await?;
        let pair = issue_pair(&state, &outcome.dreamer)?;
        let body = json!({
            "accessToken": pair.access_token,
            "expiresIn": pair.expires_in,
            "dreamer": DreamerResponse::from(outcome.dreamer),
            "dream": DreamResponse::from(outcome.dream),
        });
        return Ok(session_response(StatusCode::CREATED, &state, &pair, body));
    }

    // 1. Direct path: email is required and must be valid. All form
    //    violations are accumulated into one response.
    let mut violations = Vec::new();
    let email = input
        .email
        .as_deref()
        .map(normalize_email)
        .unwrap_or_default();
    if !is_valid_email(&email) {
        violations.push("Please enter a valid email".to_string());
    }
    let valid = match input.registration.validate() {
        Ok(v) if violations.is_empty() => v,
        Ok(_) => return Err(CoreError::Validation(violations).into()),
        Err(errors) => {
            violations.extend(errors);
            return Err(CoreError::Validation(violations).into());
        }
    };

    // 2. Reject emails that already have an account.
    if DreamerRepo::find_by_email(&state.pool, &email).await?.is_some() {
        return Err(CoreError::DuplicateEmail.into());
    }

    // 3. Hash the password off the async runtime.
    let password_hash = hash_blocking(valid.password.clone()).await?;

    // 4. Create the account.
    let create = CreateDreamer {
        email,
        password_hash,
        first_name: valid.first_name,
        last_name: valid.last_name,
        display_name: valid.display_name,
        onboarding_completed: false,
        intro_completed_at: None,
        theme: valid.theme.as_str().to_string(),
        animation_speed: valid.animation_speed.as_str().to_string(),
        shepherd_personality: valid.shepherd_personality.as_str().to_string(),
        notifications_enabled: valid.notifications_enabled,
        upgraded_from_intro_id: None,
        upgraded_from_temp_token: None,
        upgraded_from_original_created_at: None,
        upgraded_at: None,
    };
    let dreamer = DreamerRepo::create(&state.pool, &create).await?;
    tracing::info!(dreamer_id = dreamer.id, "Dreamer registered directly");

    // 5. Queue email verification and issue the first token pair.
    account::issue_email_verification(&state, &dreamer).await?;
    let pair = issue_pair(&state, &dreamer)?;
    let body = json!({
        "accessToken": pair.access_token,
        "expiresIn": pair.expires_in,
        "dreamer": DreamerResponse::from(dreamer),
    });
    Ok(session_response(StatusCode::CREATED, &state, &pair, body))
}

/// POST /api/v1/auth/login
///
/// Authenticate with email + password. The refresh token is installed as an
/// HttpOnly cookie; the body carries only the access token.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Response> {
    // 1. Find dreamer by normalized email. Unknown emails get the same
    //    response as a wrong password.
    let email = normalize_email(&input.email);
    let dreamer = DreamerRepo::find_by_email(&state.pool, &email)
        .await?
        .ok_or(AuthError::WrongCredential)?;

    // 2. Lock check precedes password verification: a locked account does
    //    not accumulate further failed attempts.
    if let Some(locked_until) = dreamer.locked_until {
        if locked_until > Utc::now() {
            return Err(CoreError::Locked.into());
        }
    }

    // 3. Verify password off the async runtime.
    let candidate = input.password;
    let stored_hash = dreamer.password_hash.clone();
    let password_valid =
        tokio::task::spawn_blocking(move || password::verify_password(&candidate, &stored_hash))
            .await
            .map_err(|e| AppError::InternalError(format!("Verification task failed: {e}")))?;

    if !password_valid {
        // 4. On failure: increment counter, lock on the threshold attempt.
        DreamerRepo::increment_failed_login(&state.pool, dreamer.id).await?;

        let new_count = dreamer.failed_login_count + 1;
        if new_count >= MAX_FAILED_ATTEMPTS {
            let lock_until = Utc::now() + chrono::Duration::hours(LOCK_DURATION_HOURS);
            DreamerRepo::lock_account(&state.pool, dreamer.id, lock_until).await?;
            tracing::warn!(dreamer_id = dreamer.id, "Account locked after repeated failed logins");
        }

        return Err(AuthError::WrongCredential.into());
    }

    // 5. On success: clear the failure state, stamp last_login_at.
    DreamerRepo::record_successful_login(&state.pool, dreamer.id).await?;

    // 6. Issue tokens against the current token version.
    let pair = issue_pair(&state, &dreamer)?;
    let body = json!({
        "accessToken": pair.access_token,
        "expiresIn": pair.expires_in,
        "dreamer": DreamerResponse::from(dreamer),
    });
    Ok(session_response(StatusCode::OK, &state, &pair, body))
}

/// POST /api/v1/auth/refresh
///
/// Exchange a valid refresh token (cookie preferred, body fallback) for a
/// fresh pair. Rotation: the response installs a new refresh cookie.
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
    input: Option<Json<RefreshRequest>>,
) -> AppResult<Response> {
    // 1. Locate the refresh token.
    let token = cookie::extract_refresh_token(&headers)
        .or_else(|| input.and_then(|Json(body)| body.refresh_token))
        .ok_or(AuthError::Malformed)?;

    // 2. Verify signature, expiry, and kind.
    let claims = jwt::verify(&state.config.jwt, &token, TokenKind::Refresh)?;

    // 3. The embedded token version must still match the account's counter.
    let dreamer = DreamerRepo::find_by_id(&state.pool, claims.sub)
        .await?
        .ok_or(AuthError::Revoked)?;
    if dreamer.token_version != claims.token_version {
        return Err(AuthError::Revoked.into());
    }

    // 4. Issue a new pair.
    let pair = issue_pair(&state, &dreamer)?;
    let body = json!({
        "accessToken": pair.access_token,
        "expiresIn": pair.expires_in,
        "dreamer": DreamerResponse::from(dreamer),
    });
    Ok(session_response(StatusCode::OK, &state, &pair, body))
}

/// POST /api/v1/auth/logout
///
/// Bump the account's token version, revoking every outstanding token, and
/// clear the refresh cookie. Idempotent: succeeds even without a valid token.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Response> {
    if let Some(token) = cookie::extract_refresh_token(&headers) {
        if let Ok(claims) = jwt::verify(&state.config.jwt, &token, TokenKind::Refresh) {
            DreamerRepo::revoke_all_sessions(&state.pool, claims.sub).await?;
            tracing::info!(dreamer_id = claims.sub, "All sessions revoked on logout");
        }
    }

    let clear = cookie::clear_refresh_cookie(state.config.secure_cookies);
    Ok((StatusCode::NO_CONTENT, [(SET_COOKIE, clear)]).into_response())
}

/// GET /api/v1/auth/me
///
/// Return the authenticated dreamer's safe profile.
pub async fn me(auth: AuthDreamer) -> Json<DreamerResponse> {
    Json(auth.dreamer.into())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Hash a password on the blocking pool. Argon2id at these parameters takes
/// tens of milliseconds; it must not stall the async runtime.
pub(crate) async fn hash_blocking(password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || password::hash_password(&password))
        .await
        .map_err(|e| AppError::InternalError(format!("Hashing task failed: {e}")))?
        .map_err(AppError::from)
}

pub(crate) fn issue_pair(state: &AppState, dreamer: &Dreamer) -> Result<TokenPair, AppError> {
    Ok(jwt::issue_token_pair(
        &state.config.jwt,
        dreamer.id,
        &dreamer.email,
        dreamer.token_version,
    )?)
}

/// Build a response that installs the refresh cookie. The refresh token is
/// never part of the JSON body on issuance paths.
pub(crate) fn session_response(
    status: StatusCode,
    state: &AppState,
    pair: &TokenPair,
    body: serde_json::Value,
) -> Response {
    let set_cookie = cookie::refresh_cookie(
        &pair.refresh_token,
        state.config.jwt.refresh_token_seconds(),
        state.config.secure_cookies,
    );
    (status, [(SET_COOKIE, set_cookie)], Json(body)).into_response()
}
