//! Repository for the `intro_dreamers` table.
//!
//! Every lookup excludes rows past `expires_at`: an expired session is
//! logically nonexistent even before the background sweep physically reaps
//! it.

use sqlx::PgExecutor;

use dreamshepherd_core::types::{DbId, Timestamp};

use crate::models::intro_dreamer::{CreateIntroDreamer, IntroDreamer, UpdateIntroDreamer};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, email, temp_token, dream_title, dream_vision, \
    reminder_at, reminder_sent, reminder_email_sent_at, intro_completed_at, \
    last_active_at, upgrade_prompt_shown, created_at, expires_at";

/// Provides CRUD and lifecycle operations for intro sessions.
pub struct IntroDreamerRepo;

impl IntroDreamerRepo {
    /// Insert a new intro session, returning the created row.
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        input: &CreateIntroDreamer,
    ) -> Result<IntroDreamer, sqlx::Error> {
        let query = format!(
            "INSERT INTO intro_dreamers (email, temp_token, dream_title, dream_vision,
                reminder_at, expires_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, IntroDreamer>(&query)
            .bind(&input.email)
            .bind(&input.temp_token)
            .bind(&input.dream_title)
            .bind(&input.dream_vision)
            .bind(input.reminder_at)
            .bind(input.expires_at)
            .fetch_one(executor)
            .await
    }

    /// Find a live session by bearer token. Expired rows are invisible.
    pub async fn find_by_token<'e>(
        executor: impl PgExecutor<'e>,
        token: &str,
    ) -> Result<Option<IntroDreamer>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM intro_dreamers
             WHERE temp_token = $1 AND expires_at > NOW()"
        );
        sqlx::query_as::<_, IntroDreamer>(&query)
            .bind(token)
            .fetch_optional(executor)
            .await
    }

    /// Find a live session by normalized email. If duplicates exist the
    /// most recent wins, keeping behaviour deterministic.
    pub async fn find_by_email<'e>(
        executor: impl PgExecutor<'e>,
        email: &str,
    ) -> Result<Option<IntroDreamer>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM intro_dreamers
             WHERE email = $1 AND expires_at > NOW()
             ORDER BY created_at DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, IntroDreamer>(&query)
            .bind(email)
            .fetch_optional(executor)
            .await
    }

    /// Apply a partial update. Supplying a reminder resets `reminder_sent`;
    /// any update bumps `last_active_at`.
    pub async fn update<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        input: &UpdateIntroDreamer,
    ) -> Result<Option<IntroDreamer>, sqlx::Error> {
        let query = format!(
            "UPDATE intro_dreamers SET
                dream_title = COALESCE($2, dream_title),
                dream_vision = COALESCE($3, dream_vision),
                reminder_at = COALESCE($4, reminder_at),
                reminder_sent = CASE WHEN $4 IS NOT NULL THEN false ELSE reminder_sent END,
                last_active_at = NOW()
             WHERE id = $1 AND expires_at > NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, IntroDreamer>(&query)
            .bind(id)
            .bind(&input.dream_title)
            .bind(&input.dream_vision)
            .bind(input.reminder_at)
            .fetch_optional(executor)
            .await
    }

    /// Push the expiry forward. Used whenever a returning anonymous user is
    /// still active, so the session is not reaped under them.
    pub async fn extend<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        expires_at: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE intro_dreamers SET expires_at = $2, last_active_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(expires_at)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Bump `last_active_at` only.
    pub async fn touch_last_active<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE intro_dreamers SET last_active_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(())
    }

    /// Mark the scheduled reminder as sent.
    pub async fn mark_reminder_sent<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE intro_dreamers SET reminder_sent = true, reminder_email_sent_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Record that the upgrade prompt has been shown to this session.
    pub async fn mark_upgrade_prompt_shown<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE intro_dreamers SET upgrade_prompt_shown = true WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(())
    }

    /// Live sessions whose reminder time has arrived and was not sent yet.
    pub async fn find_due_reminders<'e>(
        executor: impl PgExecutor<'e>,
    ) -> Result<Vec<IntroDreamer>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM intro_dreamers
             WHERE reminder_at IS NOT NULL
               AND reminder_at <= NOW()
               AND reminder_sent = false
               AND expires_at > NOW()
             ORDER BY reminder_at"
        );
        sqlx::query_as::<_, IntroDreamer>(&query)
            .fetch_all(executor)
            .await
    }

    /// Mark reminders more than 24 hours overdue as sent so they stop
    /// matching the due query. Returns the number of rows updated.
    pub async fn cleanup_missed_reminders<'e>(
        executor: impl PgExecutor<'e>,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE intro_dreamers SET reminder_sent = true
             WHERE reminder_at < NOW() - INTERVAL '24 hours'
               AND reminder_sent = false",
        )
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    /// Live sessions older than `days_old` days that are still active and
    /// have not seen the upgrade prompt -- candidates for outreach.
    pub async fn find_upgrade_candidates<'e>(
        executor: impl PgExecutor<'e>,
        days_old: i64,
    ) -> Result<Vec<IntroDreamer>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM intro_dreamers
             WHERE created_at < NOW() - ($1 * INTERVAL '1 day')
               AND last_active_at > NOW() - ($1 * INTERVAL '1 day')
               AND upgrade_prompt_shown = false
               AND expires_at > NOW()
             ORDER BY created_at"
        );
        sqlx::query_as::<_, IntroDreamer>(&query)
            .bind(days_old)
            .fetch_all(executor)
            .await
    }

    /// Hard-delete a session. Returns `true` if a row was removed. Used by
    /// the upgrade flow the instant a session becomes an account.
    pub async fn delete<'e>(executor: impl PgExecutor<'e>, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM intro_dreamers WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Physically reap expired rows. Returns the number of rows deleted.
    pub async fn delete_expired<'e>(executor: impl PgExecutor<'e>) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM intro_dreamers WHERE expires_at <= NOW()")
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
