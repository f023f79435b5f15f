//! JWT issuance and verification.
//!
//! Both access and refresh tokens are HS256 JWTs carrying a `kind` claim so
//! one can never be replayed where the other is expected. Tokens embed the
//! account's `token_version`; bumping that counter in the database invalidates
//! every previously issued token at once.

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use dreamshepherd_core::error::AuthError;
use dreamshepherd_core::types::DbId;

use crate::config::JwtConfig;

/// Distinguishes the two token roles. Serialized into the `kind` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Claims carried by every DreamShepherd token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Dreamer ID.
    pub sub: DbId,
    /// Present on access tokens only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Must match the account's current counter or the token is revoked.
    pub token_version: i32,
    pub kind: TokenKind,
    pub iss: String,
    pub aud: String,
    /// Random nonce so reissued tokens are never byte-identical.
    pub jti: String,
    pub exp: i64,
    pub iat: i64,
}

/// A freshly issued access/refresh pair.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

/// Issue a short-lived access token for the given dreamer.
pub fn issue_access_token(
    config: &JwtConfig,
    dreamer_id: DbId,
    email: &str,
    token_version: i32,
) -> Result<String, AuthError> {
    let now = Utc::now().timestamp();
    sign(
        config,
        Claims {
            sub: dreamer_id,
            email: Some(email.to_string()),
            token_version,
            kind: TokenKind::Access,
            iss: config.issuer.clone(),
            aud: config.audience.clone(),
            jti: crate::auth::opaque::nonce(),
            exp: now + config.access_token_minutes * 60,
            iat: now,
        },
    )
}

/// Issue a long-lived refresh token. Carries no email.
pub fn issue_refresh_token(
    config: &JwtConfig,
    dreamer_id: DbId,
    token_version: i32,
) -> Result<String, AuthError> {
    let now = Utc::now().timestamp();
    sign(
        config,
        Claims {
            sub: dreamer_id,
            email: None,
            token_version,
            kind: TokenKind::Refresh,
            iss: config.issuer.clone(),
            aud: config.audience.clone(),
            jti: crate::auth::opaque::nonce(),
            exp: now + config.refresh_token_days * 24 * 60 * 60,
            iat: now,
        },
    )
}

/// Issue a matched access + refresh pair.
pub fn issue_token_pair(
    config: &JwtConfig,
    dreamer_id: DbId,
    email: &str,
    token_version: i32,
) -> Result<TokenPair, AuthError> {
    Ok(TokenPair {
        access_token: issue_access_token(config, dreamer_id, email, token_version)?,
        refresh_token: issue_refresh_token(config, dreamer_id, token_version)?,
        expires_in: config.access_token_seconds(),
    })
}

/// Verify signature, expiry, issuer, audience, and the expected `kind`.
///
/// Expiry maps to [`AuthError::Expired`] so the caller can surface a
/// distinct `TOKEN_EXPIRED` code; every other defect is [`AuthError::Malformed`].
pub fn verify(config: &JwtConfig, token: &str, expected: TokenKind) -> Result<Claims, AuthError> {
    let mut validation = Validation::default();
    validation.set_issuer(&[&config.issuer]);
    validation.set_audience(&[&config.audience]);

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map_err(|err| match err.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
        _ => AuthError::Malformed,
    })?;

    if data.claims.kind != expected {
        return Err(AuthError::WrongKind);
    }
    Ok(data.claims)
}

fn sign(config: &JwtConfig, claims: Claims) -> Result<String, AuthError> {
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|_| AuthError::Malformed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-test-secret-test-secret!".to_string(),
            issuer: "dreamshepherd".to_string(),
            audience: "dreamshepherd-api".to_string(),
            access_token_minutes: 15,
            refresh_token_days: 7,
        }
    }

    #[test]
    fn access_token_round_trips() {
        let config = test_config();
        let token = issue_access_token(&config, 42, "dreamer@example.com", 3).unwrap();
        let claims = verify(&config, &token, TokenKind::Access).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.email.as_deref(), Some("dreamer@example.com"));
        assert_eq!(claims.token_version, 3);
        assert_eq!(claims.kind, TokenKind::Access);
    }

    #[test]
    fn refresh_token_carries_no_email() {
        let config = test_config();
        let token = issue_refresh_token(&config, 7, 0).unwrap();
        let claims = verify(&config, &token, TokenKind::Refresh).unwrap();
        assert_eq!(claims.email, None);
    }

    #[test]
    fn refresh_token_rejected_where_access_expected() {
        let config = test_config();
        let token = issue_refresh_token(&config, 7, 0).unwrap();
        assert_eq!(
            verify(&config, &token, TokenKind::Access),
            Err(AuthError::WrongKind)
        );
    }

    #[test]
    fn access_token_rejected_where_refresh_expected() {
        let config = test_config();
        let token = issue_access_token(&config, 7, "a@b.co", 0).unwrap();
        assert_eq!(
            verify(&config, &token, TokenKind::Refresh),
            Err(AuthError::WrongKind)
        );
    }

    #[test]
    fn expired_token_reported_as_expired() {
        let config = test_config();
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: 1,
            email: None,
            token_version: 0,
            kind: TokenKind::Refresh,
            iss: config.issuer.clone(),
            aud: config.audience.clone(),
            jti: crate::auth::opaque::nonce(),
            // Far enough in the past to clear default leeway.
            exp: now - 600,
            iat: now - 1200,
        };
        let token = sign(&config, claims).unwrap();
        assert_eq!(
            verify(&config, &token, TokenKind::Refresh),
            Err(AuthError::Expired)
        );
    }

    #[test]
    fn wrong_secret_is_malformed() {
        let config = test_config();
        let token = issue_access_token(&config, 1, "a@b.co", 0).unwrap();
        let other = JwtConfig {
            secret: "another-secret-another-secret-another!".to_string(),
            ..config
        };
        assert_eq!(
            verify(&other, &token, TokenKind::Access),
            Err(AuthError::Malformed)
        );
    }

    #[test]
    fn wrong_audience_is_malformed() {
        let config = test_config();
        let token = issue_access_token(&config, 1, "a@b.co", 0).unwrap();
        let other = JwtConfig {
            audience: "someone-else".to_string(),
            ..config
        };
        assert_eq!(
            verify(&other, &token, TokenKind::Access),
            Err(AuthError::Malformed)
        );
    }

    #[test]
    fn garbage_is_malformed() {
        let config = test_config();
        assert_eq!(
            verify(&config, "not-a-jwt", TokenKind::Access),
            Err(AuthError::Malformed)
        );
    }

    #[test]
    fn reissued_tokens_differ() {
        let config = test_config();
        let first = issue_refresh_token(&config, 1, 0).unwrap();
        let second = issue_refresh_token(&config, 1, 0).unwrap();
        assert_ne!(first, second);
    }
}
