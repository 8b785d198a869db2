/// Recipe tag model
///
/// Tags are immutable reference data: created by operators, never mutated
/// through the public API. Name, slug, and color are all unique; the color
/// must be a `#rrggbb` hex string.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tags (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(32) NOT NULL UNIQUE,
///     slug VARCHAR(32) NOT NULL UNIQUE,
///     color VARCHAR(7) NOT NULL UNIQUE
/// );
/// ```

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::validate;

/// Error type for tag creation
#[derive(Debug, thiserror::Error)]
pub enum TagError {
    /// Color failed hex-pattern validation
    #[error("Invalid tag color: {0}")]
    InvalidColor(String),

    /// Underlying database failure
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Recipe tag
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tag {
    /// Unique tag ID
    pub id: Uuid,

    /// Display name, unique
    pub name: String,

    /// URL slug, unique
    pub slug: String,

    /// Hex color (`#rrggbb`), unique
    pub color: String,
}

/// Input for creating a tag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTag {
    pub name: String,
    pub slug: String,
    pub color: String,
}

impl Tag {
    /// Creates a tag
    ///
    /// # Errors
    ///
    /// Returns `TagError::InvalidColor` for a malformed color, or a database
    /// error on a name/slug/color uniqueness violation.
    pub async fn create(pool: &PgPool, data: CreateTag) -> Result<Self, TagError> {
        validate::validate_hex_color(&data.color).map_err(TagError::InvalidColor)?;

        let tag = sqlx::query_as::<_, Tag>(
            r#"
            INSERT INTO tags (name, slug, color)
            VALUES ($1, $2, $3)
            RETURNING id, name, slug, color
            "#,
        )
        .bind(data.name)
        .bind(data.slug)
        .bind(data.color)
        .fetch_one(pool)
        .await?;

        Ok(tag)
    }

    /// Finds a tag by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let tag = sqlx::query_as::<_, Tag>(
            "SELECT id, name, slug, color FROM tags WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(tag)
    }

    /// Lists all tags, ordered by name
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let tags = sqlx::query_as::<_, Tag>(
            "SELECT id, name, slug, color FROM tags ORDER BY name",
        )
        .fetch_all(pool)
        .await?;

        Ok(tags)
    }

    /// Finds all tags among the given IDs
    ///
    /// Returns only the tags that exist; callers that require every ID to
    /// resolve compare the result against the input.
    pub async fn find_many(pool: &PgPool, ids: &[Uuid]) -> Result<Vec<Self>, sqlx::Error> {
        let tags = sqlx::query_as::<_, Tag>(
            "SELECT id, name, slug, color FROM tags WHERE id = ANY($1) ORDER BY name",
        )
        .bind(ids)
        .fetch_all(pool)
        .await?;

        Ok(tags)
    }
}
