//! Dream entity model and DTOs.

use serde::Serialize;
use sqlx::FromRow;

use dreamshepherd_core::types::{DbId, Timestamp};

/// A dream row from the `dreams` table.
#[derive(Debug, Clone, FromRow)]
pub struct Dream {
    pub id: DbId,
    pub dreamer_id: DbId,
    pub slug: String,
    pub title: String,
    pub vision: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a dream.
///
/// `created_at` is caller-supplied: a dream migrated from an intro session
/// keeps the session's original creation time, not "now".
#[derive(Debug)]
pub struct CreateDream {
    pub dreamer_id: DbId,
    pub slug: String,
    pub title: String,
    pub vision: String,
    pub created_at: Timestamp,
}

/// Dream representation for API responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DreamResponse {
    pub id: DbId,
    pub slug: String,
    pub title: String,
    pub vision: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<Dream> for DreamResponse {
    fn from(d: Dream) -> Self {
        DreamResponse {
            id: d.id,
            slug: d.slug,
            title: d.title,
            vision: d.vision,
            created_at: d.created_at,
            updated_at: d.updated_at,
        }
    }
}
