//! HTTP-level integration tests for password reset and email verification.
//!
//! Raw tokens never leave the server through the API, so these tests mint
//! tokens with the same primitives the handlers use and plant the digests
//! directly through the repository.

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{body_json, post_json, refresh_cookie_value};
use sqlx::PgPool;

use dreamshepherd_api::auth::opaque::generate_opaque_token;
use dreamshepherd_db::repositories::DreamerRepo;

/// Register a dreamer and return (dreamer id, refresh cookie).
async fn register(pool: &PgPool, email: &str, password: &str) -> (i64, String) {
    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/auth/register",
        serde_json::json!({ "email": email, "password": password }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let cookie = refresh_cookie_value(&response).unwrap();
    let json = body_json(response).await;
    (json["dreamer"]["id"].as_i64().unwrap(), cookie)
}

/// The request endpoint answers identically for known and unknown emails.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_reset_request_does_not_enumerate(pool: PgPool) {
    register(&pool, "known@example.com", "long enough pw").await;

    let app = common::build_test_app(pool.clone());
    let known = post_json(
        app,
        "/api/v1/auth/password-reset/request",
        serde_json::json!({ "email": "known@example.com" }),
    )
    .await;
    assert_eq!(known.status(), StatusCode::ACCEPTED);
    let known_body = body_json(known).await;

    let app = common::build_test_app(pool);
    let unknown = post_json(
        app,
        "/api/v1/auth/password-reset/request",
        serde_json::json!({ "email": "nobody@example.com" }),
    )
    .await;
    assert_eq!(unknown.status(), StatusCode::ACCEPTED);
    let unknown_body = body_json(unknown).await;

    assert_eq!(known_body, unknown_body);
}

/// Redeeming a reset token changes the password, makes the token single-use,
/// and revokes every outstanding session.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_reset_confirm(pool: PgPool) {
    let (dreamer_id, cookie) = register(&pool, "reset@example.com", "old password 1").await;

    let (raw, digest) = generate_opaque_token();
    DreamerRepo::set_password_reset_token(
        &pool,
        dreamer_id,
        &digest,
        Utc::now() + Duration::minutes(10),
    )
    .await
    .unwrap();

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/auth/password-reset/confirm",
        serde_json::json!({ "token": raw, "newPassword": "new password 1" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Old password rejected, new one accepted.
    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/auth/login",
        serde_json::json!({ "email": "reset@example.com", "password": "old password 1" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/auth/login",
        serde_json::json!({ "email": "reset@example.com", "password": "new password 1" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Pre-reset refresh token is dead.
    let app = common::build_test_app(pool.clone());
    let response = common::post_with_cookie(app, "/api/v1/auth/refresh", &cookie).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // The token was consumed.
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/auth/password-reset/confirm",
        serde_json::json!({ "token": raw, "newPassword": "another new pw" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// An expired reset token is indistinguishable from an unknown one.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_reset_confirm_expired_token(pool: PgPool) {
    let (dreamer_id, _cookie) = register(&pool, "late@example.com", "old password 1").await;

    let (raw, digest) = generate_opaque_token();
    DreamerRepo::set_password_reset_token(
        &pool,
        dreamer_id,
        &digest,
        Utc::now() - Duration::minutes(1),
    )
    .await
    .unwrap();

    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/auth/password-reset/confirm",
        serde_json::json!({ "token": raw, "newPassword": "new password 1" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// A too-short replacement password fails validation and leaves the token
/// redeemable.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_reset_confirm_weak_password(pool: PgPool) {
    let (dreamer_id, _cookie) = register(&pool, "weak@example.com", "old password 1").await;

    let (raw, digest) = generate_opaque_token();
    DreamerRepo::set_password_reset_token(
        &pool,
        dreamer_id,
        &digest,
        Utc::now() + Duration::minutes(10),
    )
    .await
    .unwrap();

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/auth/password-reset/confirm",
        serde_json::json!({ "token": raw, "newPassword": "tiny" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/auth/password-reset/confirm",
        serde_json::json!({ "token": raw, "newPassword": "long enough now" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

/// Redeeming a verification token marks the email verified, once.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_verify_email(pool: PgPool) {
    let (dreamer_id, _cookie) = register(&pool, "verify@example.com", "long enough pw").await;

    let (raw, digest) = generate_opaque_token();
    DreamerRepo::set_email_verification_token(
        &pool,
        dreamer_id,
        &digest,
        Utc::now() + Duration::hours(24),
    )
    .await
    .unwrap();

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/auth/verify-email",
        serde_json::json!({ "token": raw }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["isEmailVerified"], true);

    // Single-use.
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/auth/verify-email",
        serde_json::json!({ "token": raw }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
