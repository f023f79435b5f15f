//! Repository for the `dreamers` table.

use sqlx::PgExecutor;

use dreamshepherd_core::types::{DbId, Timestamp};

use crate::models::dreamer::{CreateDreamer, Dreamer};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, email, password_hash, is_email_verified, \
    email_verification_token_hash, email_verification_expires_at, \
    password_reset_token_hash, password_reset_expires_at, \
    failed_login_count, locked_until, token_version, \
    first_name, last_name, display_name, onboarding_completed, \
    intro_completed_at, journey_started_at, \
    theme, animation_speed, shepherd_personality, notifications_enabled, \
    upgraded_from_intro_id, upgraded_from_temp_token, \
    upgraded_from_original_created_at, upgraded_at, \
    dream_count, goal_count, last_login_at, last_active_at, \
    created_at, updated_at";

/// Provides CRUD and security-state operations for dreamers.
pub struct DreamerRepo;

impl DreamerRepo {
    /// Insert a new dreamer, returning the created row.
    ///
    /// Violating the unique email constraint (`uq_dreamers_email`) surfaces
    /// as a database error with code 23505; the API layer maps it to a
    /// duplicate-email conflict.
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        input: &CreateDreamer,
    ) -> Result<Dreamer, sqlx::Error> {
        let query = format!(
            "INSERT INTO dreamers (email, password_hash,
                first_name, last_name, display_name, onboarding_completed,
                intro_completed_at, journey_started_at,
                theme, animation_speed, shepherd_personality, notifications_enabled,
                upgraded_from_intro_id, upgraded_from_temp_token,
                upgraded_from_original_created_at, upgraded_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, NOW(), $8, $9, $10, $11, $12, $13, $14, $15)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Dreamer>(&query)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.display_name)
            .bind(input.onboarding_completed)
            .bind(input.intro_completed_at)
            .bind(&input.theme)
            .bind(&input.animation_speed)
            .bind(&input.shepherd_personality)
            .bind(input.notifications_enabled)
            .bind(input.upgraded_from_intro_id)
            .bind(&input.upgraded_from_temp_token)
            .bind(input.upgraded_from_original_created_at)
            .bind(input.upgraded_at)
            .fetch_one(executor)
            .await
    }

    /// Find a dreamer by internal ID.
    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<Dreamer>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM dreamers WHERE id = $1");
        sqlx::query_as::<_, Dreamer>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Find a dreamer by normalized email. Callers are responsible for
    /// normalizing with `dreamshepherd_core::email::normalize_email`.
    pub async fn find_by_email<'e>(
        executor: impl PgExecutor<'e>,
        email: &str,
    ) -> Result<Option<Dreamer>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM dreamers WHERE email = $1");
        sqlx::query_as::<_, Dreamer>(&query)
            .bind(email)
            .fetch_optional(executor)
            .await
    }

    /// Increment the failed login counter by 1.
    pub async fn increment_failed_login<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE dreamers SET failed_login_count = failed_login_count + 1,
                updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Lock the account until the given timestamp and reset the failed
    /// counter to its locked baseline.
    pub async fn lock_account<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        until: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE dreamers SET locked_until = $2, failed_login_count = 0,
                updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(until)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Record a successful login: clear the failed counter and lock, stamp
    /// `last_login_at` and `last_active_at`.
    pub async fn record_successful_login<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE dreamers SET
                failed_login_count = 0,
                locked_until = NULL,
                last_login_at = NOW(),
                last_active_at = NOW(),
                updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Increment the token version by exactly 1, invalidating every
    /// outstanding token for the account. Returns the new version.
    pub async fn revoke_all_sessions<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<i32, sqlx::Error> {
        let (version,): (i32,) = sqlx::query_as(
            "UPDATE dreamers SET token_version = token_version + 1, updated_at = NOW()
             WHERE id = $1
             RETURNING token_version",
        )
        .bind(id)
        .fetch_one(executor)
        .await?;
        Ok(version)
    }

    /// Idempotent `last_active_at` bump on authenticated activity.
    pub async fn touch_last_active<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE dreamers SET last_active_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(())
    }

    /// Replace the password hash and clear any outstanding reset token.
    /// Returns `true` if the row was updated.
    pub async fn update_password<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE dreamers SET password_hash = $2,
                password_reset_token_hash = NULL,
                password_reset_expires_at = NULL,
                updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Store a password-reset token digest and its expiry.
    pub async fn set_password_reset_token<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        digest: &str,
        expires_at: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE dreamers SET password_reset_token_hash = $2,
                password_reset_expires_at = $3,
                updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(digest)
        .bind(expires_at)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Find a dreamer by a live (unexpired) password-reset token digest.
    pub async fn find_by_password_reset_digest<'e>(
        executor: impl PgExecutor<'e>,
        digest: &str,
    ) -> Result<Option<Dreamer>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM dreamers
             WHERE password_reset_token_hash = $1
               AND password_reset_expires_at > NOW()"
        );
        sqlx::query_as::<_, Dreamer>(&query)
            .bind(digest)
            .fetch_optional(executor)
            .await
    }

    /// Store an email-verification token digest and its expiry.
    pub async fn set_email_verification_token<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        digest: &str,
        expires_at: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE dreamers SET email_verification_token_hash = $2,
                email_verification_expires_at = $3,
                updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(digest)
        .bind(expires_at)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Mark the email verified for a live (unexpired) verification token
    /// digest, clearing the token. Returns the updated row if any matched.
    pub async fn verify_email_by_digest<'e>(
        executor: impl PgExecutor<'e>,
        digest: &str,
    ) -> Result<Option<Dreamer>, sqlx::Error> {
        let query = format!(
            "UPDATE dreamers SET is_email_verified = true,
                email_verification_token_hash = NULL,
                email_verification_expires_at = NULL,
                updated_at = NOW()
             WHERE email_verification_token_hash = $1
               AND email_verification_expires_at > NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Dreamer>(&query)
            .bind(digest)
            .fetch_optional(executor)
            .await
    }

    /// Set the denormalized dream count.
    pub async fn set_dream_count<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        count: i32,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE dreamers SET dream_count = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(count)
            .execute(executor)
            .await?;
        Ok(())
    }
}
