//! Repository for the `dreams` table.

use sqlx::PgExecutor;

use crate::models::dream::{CreateDream, Dream};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, dreamer_id, slug, title, vision, created_at, updated_at";

/// Persists dreams carried over when an intro session becomes an account.
pub struct DreamRepo;

impl DreamRepo {
    /// Insert a new dream with an explicit creation timestamp.
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        input: &CreateDream,
    ) -> Result<Dream, sqlx::Error> {
        let query = format!(
            "INSERT INTO dreams (dreamer_id, slug, title, vision, created_at)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Dream>(&query)
            .bind(input.dreamer_id)
            .bind(&input.slug)
            .bind(&input.title)
            .bind(&input.vision)
            .bind(input.created_at)
            .fetch_one(executor)
            .await
    }
}
