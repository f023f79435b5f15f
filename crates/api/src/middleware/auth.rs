//! JWT-based authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use dreamshepherd_core::error::AuthError;
use dreamshepherd_db::models::dreamer::Dreamer;
use dreamshepherd_db::repositories::DreamerRepo;

use crate::auth::jwt::{self, TokenKind};
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated dreamer extracted from a Bearer access token.
///
/// Beyond signature and expiry checks, the token's embedded `token_version`
/// must match the account's current counter. A logout or password reset bumps
/// the counter, so every older token is rejected here as revoked.
///
/// ```ignore
/// async fn my_handler(auth: AuthDreamer) -> AppResult<Json<DreamerResponse>> {
///     Ok(Json(auth.dreamer.into()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthDreamer {
    pub dreamer: Dreamer,
}

impl FromRequestParts<AppState> for AuthDreamer {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or(AuthError::Malformed)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::Malformed)?;

        let claims = jwt::verify(&state.config.jwt, token, TokenKind::Access)?;

        let dreamer = DreamerRepo::find_by_id(&state.pool, claims.sub)
            .await?
            .ok_or(AuthError::Revoked)?;

        if dreamer.token_version != claims.token_version {
            return Err(AuthError::Revoked.into());
        }

        // Activity tracking must never fail the request.
        if let Err(err) = DreamerRepo::touch_last_active(&state.pool, dreamer.id).await {
            tracing::warn!(dreamer_id = dreamer.id, error = %err, "Failed to touch last_active_at");
        }

        Ok(AuthDreamer { dreamer })
    }
}
