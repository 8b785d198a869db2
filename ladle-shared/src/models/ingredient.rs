/// Ingredient catalog
///
/// Canonical ingredients with an inline measurement unit. Reference data:
/// there is no end-user mutation API; the catalog is populated by a bulk
/// import collaborator through [`Ingredient::insert_if_absent`], which
/// deduplicates on (name, measurement_unit).
///
/// Name lookup uses case-insensitive prefix matching; see DESIGN.md for why
/// the contains-fallback variant was rejected.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE ingredients (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(150) NOT NULL,
///     measurement_unit VARCHAR(32) NOT NULL,
///     UNIQUE (name, measurement_unit)
/// );
/// ```

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Catalog ingredient
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Ingredient {
    /// Unique ingredient ID
    pub id: Uuid,

    /// Ingredient name (not unique on its own; unique with the unit)
    pub name: String,

    /// Measurement unit, e.g. "g" or "pcs"
    pub measurement_unit: String,
}

impl Ingredient {
    /// Finds an ingredient by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let ingredient = sqlx::query_as::<_, Ingredient>(
            "SELECT id, name, measurement_unit FROM ingredients WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(ingredient)
    }

    /// Lists all ingredients, ordered by name
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let ingredients = sqlx::query_as::<_, Ingredient>(
            "SELECT id, name, measurement_unit FROM ingredients ORDER BY name, measurement_unit",
        )
        .fetch_all(pool)
        .await?;

        Ok(ingredients)
    }

    /// Searches ingredients by case-insensitive name prefix
    ///
    /// An empty prefix matches everything. Results are ordered by name.
    pub async fn search(
        pool: &PgPool,
        prefix: &str,
        limit: Option<i64>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        // Escape LIKE metacharacters so a literal "%" in the query does not
        // widen the match.
        let escaped = prefix.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
        let pattern = format!("{}%", escaped);

        let ingredients = sqlx::query_as::<_, Ingredient>(
            r#"
            SELECT id, name, measurement_unit
            FROM ingredients
            WHERE name ILIKE $1
            ORDER BY name, measurement_unit
            LIMIT $2
            "#,
        )
        .bind(pattern)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(ingredients)
    }

    /// Finds all ingredients among the given IDs
    ///
    /// Returns only the ingredients that exist; callers that require every
    /// ID to resolve compare the result against the input.
    pub async fn find_many(pool: &PgPool, ids: &[Uuid]) -> Result<Vec<Self>, sqlx::Error> {
        let ingredients = sqlx::query_as::<_, Ingredient>(
            "SELECT id, name, measurement_unit FROM ingredients WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(pool)
        .await?;

        Ok(ingredients)
    }

    /// Inserts an ingredient unless an identical (name, unit) row exists
    ///
    /// The insert-if-absent primitive used by the bulk import collaborator.
    /// Duplicate (name, unit) pairs in the input never produce duplicate
    /// rows.
    ///
    /// # Returns
    ///
    /// True if a new row was inserted, false if the pair already existed.
    pub async fn insert_if_absent(
        pool: &PgPool,
        name: &str,
        measurement_unit: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO ingredients (name, measurement_unit)
            VALUES ($1, $2)
            ON CONFLICT (name, measurement_unit) DO NOTHING
            "#,
        )
        .bind(name)
        .bind(measurement_unit)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
