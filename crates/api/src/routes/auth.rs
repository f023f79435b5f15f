//! Route definitions for the `/auth` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{account, auth, intro, upgrade};
use crate::state::AppState;

/// Routes mounted at `/auth`.
pub fn router() -> Router<AppState> {
    Router::new()
        // Anonymous intro sessions.
        .route("/intro", post(intro::create_intro))
        .route(
            "/intro/{token}",
            get(intro::get_intro).put(intro::update_intro),
        )
        .route("/intro/{token}/prompt-shown", post(intro::mark_prompt_shown))
        .route("/intro/{token}/upgrade", get(upgrade::upgrade_preview))
        // Account lifecycle.
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
        // Account maintenance.
        .route(
            "/password-reset/request",
            post(account::request_password_reset),
        )
        .route(
            "/password-reset/confirm",
            post(account::confirm_password_reset),
        )
        .route("/verify-email", post(account::verify_email))
}
