/// Favorite-recipe membership set
///
/// A favorite is a (user, recipe) edge with strict add/remove semantics:
/// adding an existing edge or removing an absent one is a reported conflict,
/// not a silent set operation. The composite primary key makes the storage
/// layer authoritative for uniqueness; no in-process locking.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE favorites (
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     recipe_id UUID NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (user_id, recipe_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::MembershipError;

/// Favorite edge
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Favorite {
    pub user_id: Uuid,
    pub recipe_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Favorite {
    /// Adds a recipe to a user's favorites
    ///
    /// # Errors
    ///
    /// `MembershipError::AlreadyMember` if the recipe is already a favorite.
    pub async fn add(
        pool: &PgPool,
        user_id: Uuid,
        recipe_id: Uuid,
    ) -> Result<Self, MembershipError> {
        let favorite = sqlx::query_as::<_, Favorite>(
            r#"
            INSERT INTO favorites (user_id, recipe_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, recipe_id) DO NOTHING
            RETURNING user_id, recipe_id, created_at
            "#,
        )
        .bind(user_id)
        .bind(recipe_id)
        .fetch_optional(pool)
        .await?;

        favorite.ok_or(MembershipError::AlreadyMember)
    }

    /// Removes a recipe from a user's favorites
    ///
    /// # Errors
    ///
    /// `MembershipError::NotMember` if the recipe was not a favorite.
    pub async fn remove(
        pool: &PgPool,
        user_id: Uuid,
        recipe_id: Uuid,
    ) -> Result<(), MembershipError> {
        let result = sqlx::query(
            "DELETE FROM favorites WHERE user_id = $1 AND recipe_id = $2",
        )
        .bind(user_id)
        .bind(recipe_id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(MembershipError::NotMember);
        }

        Ok(())
    }

    /// Checks whether a recipe is in a user's favorites
    pub async fn is_favorited(
        pool: &PgPool,
        user_id: Uuid,
        recipe_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM favorites
                WHERE user_id = $1 AND recipe_id = $2
            )
            "#,
        )
        .bind(user_id)
        .bind(recipe_id)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Counts how many users favorited a recipe
    pub async fn count_for_recipe(pool: &PgPool, recipe_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM favorites WHERE recipe_id = $1",
        )
        .bind(recipe_id)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }
}
