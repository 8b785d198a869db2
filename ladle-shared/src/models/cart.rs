/// Shopping-cart membership set
///
/// Each user has at most one cart, created lazily on the first add. Lookups
/// return `Option<Cart>` — a missing cart reads as an empty one, never as an
/// error used for control flow. Cart entries follow the same strict
/// add/remove semantics as favorites.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE carts (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE TABLE cart_entries (
///     cart_id UUID NOT NULL REFERENCES carts(id) ON DELETE CASCADE,
///     recipe_id UUID NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (cart_id, recipe_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::MembershipError;
use crate::shopping::aggregate::ShoppingLine;

/// Per-user cart
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Cart {
    pub id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Cart {
    /// Finds a user's cart, if one has been created
    pub async fn find_by_user(pool: &PgPool, user_id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let cart = sqlx::query_as::<_, Cart>(
            "SELECT id, user_id, created_at FROM carts WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(cart)
    }

    /// Returns the user's cart, creating it on first use
    ///
    /// Concurrent callers race on the unique user_id constraint; the loser
    /// reads the winner's row.
    pub async fn get_or_create(pool: &PgPool, user_id: Uuid) -> Result<Self, sqlx::Error> {
        let inserted = sqlx::query_as::<_, Cart>(
            r#"
            INSERT INTO carts (user_id)
            VALUES ($1)
            ON CONFLICT (user_id) DO NOTHING
            RETURNING id, user_id, created_at
            "#,
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        match inserted {
            Some(cart) => Ok(cart),
            None => {
                let cart = sqlx::query_as::<_, Cart>(
                    "SELECT id, user_id, created_at FROM carts WHERE user_id = $1",
                )
                .bind(user_id)
                .fetch_one(pool)
                .await?;
                Ok(cart)
            }
        }
    }

    /// Adds a recipe to the user's cart, creating the cart if needed
    ///
    /// # Errors
    ///
    /// `MembershipError::AlreadyMember` if the recipe is already in the cart.
    pub async fn add_recipe(
        pool: &PgPool,
        user_id: Uuid,
        recipe_id: Uuid,
    ) -> Result<(), MembershipError> {
        let cart = Self::get_or_create(pool, user_id).await?;

        let result = sqlx::query(
            r#"
            INSERT INTO cart_entries (cart_id, recipe_id)
            VALUES ($1, $2)
            ON CONFLICT (cart_id, recipe_id) DO NOTHING
            "#,
        )
        .bind(cart.id)
        .bind(recipe_id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(MembershipError::AlreadyMember);
        }

        Ok(())
    }

    /// Removes a recipe from the user's cart
    ///
    /// # Errors
    ///
    /// `MembershipError::NotMember` if the recipe is not in the cart — which
    /// includes the case of a user who never created one.
    pub async fn remove_recipe(
        pool: &PgPool,
        user_id: Uuid,
        recipe_id: Uuid,
    ) -> Result<(), MembershipError> {
        let Some(cart) = Self::find_by_user(pool, user_id).await? else {
            return Err(MembershipError::NotMember);
        };

        let result = sqlx::query(
            "DELETE FROM cart_entries WHERE cart_id = $1 AND recipe_id = $2",
        )
        .bind(cart.id)
        .bind(recipe_id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(MembershipError::NotMember);
        }

        Ok(())
    }

    /// Checks whether a recipe is in the user's cart
    pub async fn contains(
        pool: &PgPool,
        user_id: Uuid,
        recipe_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM cart_entries ce
                JOIN carts c ON c.id = ce.cart_id
                WHERE c.user_id = $1 AND ce.recipe_id = $2
            )
            "#,
        )
        .bind(user_id)
        .bind(recipe_id)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Reads every ingredient line across the user's cart recipes
    ///
    /// The raw input of the shopping-list aggregation. Inner joins mean a
    /// concurrently deleted recipe or ingredient simply contributes no
    /// lines, and a missing cart reads as empty. Read-only: safe to call
    /// repeatedly.
    pub async fn shopping_lines(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<ShoppingLine>, sqlx::Error> {
        let lines = sqlx::query_as::<_, ShoppingLine>(
            r#"
            SELECT i.name, i.measurement_unit, ri.amount
            FROM cart_entries ce
            JOIN carts c ON c.id = ce.cart_id
            JOIN recipe_ingredients ri ON ri.recipe_id = ce.recipe_id
            JOIN ingredients i ON i.id = ri.ingredient_id
            WHERE c.user_id = $1
            ORDER BY ce.created_at
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(lines)
    }
}
