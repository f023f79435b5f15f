//! HTTP-level integration tests for the intro-to-account upgrade flow.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, get_auth, post_json, refresh_cookie_value};
use sqlx::PgPool;

/// Create an intro session with an email and return its JSON representation.
async fn create_intro_with_email(app: axum::Router, email: &str) -> serde_json::Value {
    let response = post_json(
        app,
        "/api/v1/auth/intro",
        serde_json::json!({
            "email": email,
            "dreamTitle": "Learn guitar",
            "dreamVision": "play every day",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

/// The full upgrade: account created, dream migrated with its original
/// creation time, session gone, tokens live.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_upgrade_happy_path(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let intro = create_intro_with_email(app, "guitarist@example.com").await;
    let temp_token = intro["tempToken"].as_str().unwrap().to_string();

    // The moment the journey began, before any account existed.
    let (intro_created_at,): (chrono::DateTime<chrono::Utc>,) =
        sqlx::query_as("SELECT created_at FROM intro_dreamers WHERE temp_token = $1")
            .bind(&temp_token)
            .fetch_one(&pool)
            .await
            .unwrap();

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/auth/register",
        serde_json::json!({
            "tempToken": temp_token,
            "password": "long enough pw",
            "firstName": "Jamie",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let cookie = refresh_cookie_value(&response).expect("upgrade must set refresh cookie");
    assert!(!cookie.is_empty());
    let json = body_json(response).await;

    // Account carries the session's provenance and content.
    assert_eq!(json["dreamer"]["email"], "guitarist@example.com");
    assert_eq!(json["dreamer"]["dreamCount"], 1);
    assert_eq!(json["dreamer"]["profile"]["firstName"], "Jamie");
    assert_eq!(
        json["dreamer"]["profile"]["displayName"], "Jamie",
        "display name defaults to first name"
    );
    assert_eq!(json["dreamer"]["profile"]["onboardingCompleted"], true);
    assert!(json["dreamer"]["upgradedFrom"]["upgradedAt"].is_string());
    assert!(
        json["dreamer"]["upgradedFrom"].get("tempToken").is_none(),
        "provenance must not expose the bearer token"
    );

    // The dream keeps the intro session's creation moment.
    assert_eq!(json["dream"]["title"], "Learn guitar");
    assert_eq!(json["dream"]["slug"], "learn-guitar");
    assert_eq!(json["dream"]["vision"], "play every day");
    let dream_created_at: chrono::DateTime<chrono::Utc> =
        json["dream"]["createdAt"].as_str().unwrap().parse().unwrap();
    assert_eq!(
        dream_created_at, intro_created_at,
        "the dream must keep the session's original creation time"
    );

    // The session is gone.
    let app = common::build_test_app(pool.clone());
    let response = get(app, &format!("/api/v1/auth/intro/{}", intro["tempToken"].as_str().unwrap())).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // The issued access token authenticates.
    let access_token = json["accessToken"].as_str().unwrap();
    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/auth/me", access_token).await;
    assert_eq!(response.status(), StatusCode::OK);
}

/// Upgrading the same session twice fails: the first upgrade consumed it.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_upgrade_is_one_way(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let intro = create_intro_with_email(app, "once@example.com").await;
    let temp_token = intro["tempToken"].as_str().unwrap().to_string();

    let body = serde_json::json!({ "tempToken": temp_token, "password": "long enough pw" });
    let app = common::build_test_app(pool.clone());
    let response = post_json(app, "/api/v1/auth/register", body.clone()).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let app = common::build_test_app(pool);
    let response = post_json(app, "/api/v1/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// A session without an email cannot upgrade.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_upgrade_requires_email(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/auth/intro",
        serde_json::json!({ "dreamTitle": "Learn guitar" }),
    )
    .await;
    let intro = body_json(response).await;

    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/auth/register",
        serde_json::json!({
            "tempToken": intro["tempToken"].as_str().unwrap(),
            "password": "long enough pw",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// Validation failures during upgrade leave the session untouched.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_failed_upgrade_preserves_session(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let intro = create_intro_with_email(app, "intact@example.com").await;
    let temp_token = intro["tempToken"].as_str().unwrap().to_string();

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/auth/register",
        serde_json::json!({ "tempToken": temp_token, "password": "short" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Session still live, still fetchable.
    let app = common::build_test_app(pool);
    let response = get(app, &format!("/api/v1/auth/intro/{temp_token}")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

/// The preview reports upgradeability without changing anything.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_upgrade_preview(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let intro = create_intro_with_email(app, "preview@example.com").await;
    let temp_token = intro["tempToken"].as_str().unwrap().to_string();

    let app = common::build_test_app(pool.clone());
    let response = get(app, &format!("/api/v1/auth/intro/{temp_token}/upgrade")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["canUpgrade"], true);
    assert_eq!(json["emailAlreadyRegistered"], false);
    assert_eq!(json["wouldMigrate"]["dreamTitle"], "Learn guitar");

    // Register the email out from under the session: preview flips.
    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/auth/register",
        serde_json::json!({ "email": "preview@example.com", "password": "long enough pw" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let app = common::build_test_app(pool);
    let json = body_json(get(app, &format!("/api/v1/auth/intro/{temp_token}/upgrade")).await).await;
    assert_eq!(json["canUpgrade"], false);
    assert_eq!(json["emailAlreadyRegistered"], true);
}

/// Upgrading to an email that already has an account conflicts, and the
/// session survives.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_upgrade_duplicate_email(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/auth/register",
        serde_json::json!({ "email": "first@example.com", "password": "long enough pw" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // The intro session was created before that account existed.
    let app = common::build_test_app(pool.clone());
    let intro = create_intro_with_email(app, "second@example.com").await;
    let temp_token = intro["tempToken"].as_str().unwrap().to_string();
    sqlx::query("UPDATE intro_dreamers SET email = 'first@example.com' WHERE temp_token = $1")
        .bind(&temp_token)
        .execute(&pool)
        .await
        .unwrap();

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/auth/register",
        serde_json::json!({ "tempToken": temp_token, "password": "long enough pw" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let app = common::build_test_app(pool);
    let response = get(app, &format!("/api/v1/auth/intro/{temp_token}")).await;
    assert_eq!(response.status(), StatusCode::OK, "session must survive the conflict");
}
