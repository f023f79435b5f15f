pub mod auth;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/intro                          create intro session (public)
/// /auth/intro/{token}                  get, update (bearer token in path)
/// /auth/intro/{token}/prompt-shown     record upgrade prompt display
/// /auth/intro/{token}/upgrade          upgrade preview
///
/// /auth/register                       direct registration or upgrade
/// /auth/login                          login
/// /auth/refresh                        rotate tokens (cookie or body)
/// /auth/logout                         revoke all tokens
/// /auth/me                             authenticated profile
///
/// /auth/password-reset/request         mint reset token
/// /auth/password-reset/confirm         redeem reset token
/// /auth/verify-email                   redeem verification token
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/auth", auth::router())
}
