/// Recipe model and the atomic edit transaction
///
/// A recipe is only ever written together with its dependent rows: at least
/// one tag association and at least one ingredient line, validated before
/// anything touches the database. `create` inserts everything in one
/// transaction; `replace` validates first, then rewrites the dependent rows
/// destructively inside one transaction, so a failed validation can never
/// leave a recipe stripped of its ingredients.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE recipes (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     author_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     name VARCHAR(250) NOT NULL,
///     text TEXT NOT NULL,
///     image BYTEA,
///     cooking_time INTEGER NOT NULL CHECK (cooking_time >= 1),
///     published_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE TABLE recipe_ingredients (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     recipe_id UUID NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
///     ingredient_id UUID NOT NULL REFERENCES ingredients(id) ON DELETE CASCADE,
///     amount INTEGER NOT NULL CHECK (amount >= 1)
/// );
///
/// CREATE TABLE recipe_tags (
///     recipe_id UUID NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
///     tag_id UUID NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
///     PRIMARY KEY (recipe_id, tag_id)
/// );
/// ```
///
/// `recipe_ingredients` deliberately has no (recipe, ingredient) uniqueness:
/// duplicate lines for one ingredient are storable and are merged by the
/// shopping-list aggregation.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::ingredient::Ingredient;
use crate::models::tag::Tag;
use crate::validate::{self, ValidationLimits};

/// Error type for the recipe edit transaction
#[derive(Debug, thiserror::Error)]
pub enum RecipeEditError {
    /// A field failed validation; no state was changed
    #[error("{field}: {message}")]
    Validation { field: String, message: String },

    /// A referenced tag does not exist
    #[error("Tag {0} does not exist")]
    TagNotFound(Uuid),

    /// A referenced ingredient does not exist
    #[error("Ingredient {0} does not exist")]
    IngredientNotFound(Uuid),

    /// The recipe being replaced does not exist
    #[error("Recipe {0} does not exist")]
    RecipeNotFound(Uuid),

    /// Underlying database failure
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl RecipeEditError {
    fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Stored recipe row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Recipe {
    /// Unique recipe ID
    pub id: Uuid,

    /// Owning author; the recipe is cascade-deleted with them
    pub author_id: Uuid,

    /// Recipe name
    pub name: String,

    /// Recipe body text
    pub text: String,

    /// Decoded image bytes, if an image was supplied
    pub image: Option<Vec<u8>>,

    /// Cooking time in minutes, at least 1
    pub cooking_time: i32,

    /// Publish timestamp, set at creation and never updated
    pub published_at: DateTime<Utc>,
}

/// One ingredient line of a recipe, resolved against the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientLine {
    pub ingredient: Ingredient,
    pub amount: i32,
}

/// Ingredient line as supplied by the editor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientLineInput {
    pub ingredient_id: Uuid,
    pub amount: i32,
}

/// The full payload of a create or replace call
///
/// `image` is an optional base64 payload (bare or `data:` URI); everything
/// else is required by the edit contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeDraft {
    pub name: String,
    pub text: String,
    pub cooking_time: i32,
    pub image: Option<String>,
    pub tag_ids: Vec<Uuid>,
    pub ingredient_lines: Vec<IngredientLineInput>,
}

/// A recipe combined with its resolved tags and ingredient lines
///
/// What the edit transaction hands back to callers: stored scalar fields
/// plus resolved associations, never raw insert IDs. Lines are ordered by
/// ingredient name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeDetails {
    pub recipe: Recipe,
    pub tags: Vec<Tag>,
    pub ingredient_lines: Vec<IngredientLine>,
}

/// Filters for listing recipes
///
/// All filters are AND-combined; `tag_slugs` is an OR across the supplied
/// slugs. Results are ordered newest-first by publish timestamp.
#[derive(Debug, Clone, Default)]
pub struct RecipeFilter {
    /// Only recipes by this author
    pub author_id: Option<Uuid>,

    /// Only recipes carrying at least one of these tag slugs
    pub tag_slugs: Vec<String>,

    /// Only recipes favorited by this user
    pub favorited_by: Option<Uuid>,

    /// Only recipes in this user's shopping cart
    pub in_cart_of: Option<Uuid>,

    /// Truncate the result; None means no limit
    pub limit: Option<i64>,
}

/// Validates a draft against the edit contract without touching storage
///
/// Checks name/text presence, cooking-time and amount bounds, the
/// at-least-one rule for tags and ingredient lines, duplicate tag IDs, and
/// decodes the image payload.
///
/// # Returns
///
/// The decoded image bytes, if an image was supplied.
///
/// # Errors
///
/// `RecipeEditError::Validation` naming the offending field.
pub fn validate_draft(
    draft: &RecipeDraft,
    limits: &ValidationLimits,
) -> Result<Option<Vec<u8>>, RecipeEditError> {
    if draft.name.trim().is_empty() {
        return Err(RecipeEditError::validation("name", "Name must not be empty"));
    }

    if draft.name.chars().count() > limits.max_recipe_name_length {
        return Err(RecipeEditError::validation(
            "name",
            format!("Name must be at most {} characters", limits.max_recipe_name_length),
        ));
    }

    if draft.text.trim().is_empty() {
        return Err(RecipeEditError::validation("text", "Text must not be empty"));
    }

    validate::validate_cooking_time(draft.cooking_time, limits)
        .map_err(|msg| RecipeEditError::validation("cooking_time", msg))?;

    if draft.tag_ids.is_empty() {
        return Err(RecipeEditError::validation("tags", "At least one tag is required"));
    }

    let unique_tags: HashSet<Uuid> = draft.tag_ids.iter().copied().collect();
    if unique_tags.len() != draft.tag_ids.len() {
        return Err(RecipeEditError::validation("tags", "Duplicate tag ids"));
    }

    if draft.ingredient_lines.is_empty() {
        return Err(RecipeEditError::validation(
            "ingredients",
            "At least one ingredient line is required",
        ));
    }

    for line in &draft.ingredient_lines {
        validate::validate_ingredient_amount(line.amount, limits)
            .map_err(|msg| RecipeEditError::validation("ingredients", msg))?;
    }

    match draft.image.as_deref() {
        Some(payload) => validate::decode_image_payload(payload)
            .map(Some)
            .map_err(|msg| RecipeEditError::validation("image", msg)),
        None => Ok(None),
    }
}

impl Recipe {
    /// Creates a recipe together with its ingredient lines and tag links
    ///
    /// Atomic: either the recipe row, every line, and every tag link become
    /// visible together, or nothing does. A partial recipe with zero
    /// ingredients is unrepresentable.
    ///
    /// # Errors
    ///
    /// Validation errors before any write; `TagNotFound`/`IngredientNotFound`
    /// when a referenced ID does not resolve.
    pub async fn create(
        pool: &PgPool,
        author_id: Uuid,
        draft: RecipeDraft,
        limits: &ValidationLimits,
    ) -> Result<RecipeDetails, RecipeEditError> {
        let image = validate_draft(&draft, limits)?;
        let (tags, _) = resolve_references(pool, &draft).await?;

        let mut tx = pool.begin().await?;

        let recipe = sqlx::query_as::<_, Recipe>(
            r#"
            INSERT INTO recipes (author_id, name, text, image, cooking_time)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, author_id, name, text, image, cooking_time, published_at
            "#,
        )
        .bind(author_id)
        .bind(draft.name.trim())
        .bind(&draft.text)
        .bind(image)
        .bind(draft.cooking_time)
        .fetch_one(&mut *tx)
        .await?;

        insert_lines(&mut tx, recipe.id, &draft.ingredient_lines).await?;
        insert_tag_links(&mut tx, recipe.id, &draft.tag_ids).await?;

        tx.commit().await?;

        let ingredient_lines = Self::ingredient_lines(pool, recipe.id).await?;

        Ok(RecipeDetails { recipe, tags, ingredient_lines })
    }

    /// Replaces a recipe's scalar fields and all of its associations
    ///
    /// Destructive-then-additive inside one transaction: scalar fields are
    /// overwritten, every existing ingredient line and tag link is deleted,
    /// and the supplied ones are inserted. Validation and reference
    /// resolution happen strictly before the transaction opens, so a failed
    /// replace leaves the stored recipe exactly as it was.
    pub async fn replace(
        pool: &PgPool,
        recipe_id: Uuid,
        draft: RecipeDraft,
        limits: &ValidationLimits,
    ) -> Result<RecipeDetails, RecipeEditError> {
        let image = validate_draft(&draft, limits)?;

        if Self::find_by_id(pool, recipe_id).await?.is_none() {
            return Err(RecipeEditError::RecipeNotFound(recipe_id));
        }

        let (tags, _) = resolve_references(pool, &draft).await?;

        let mut tx = pool.begin().await?;

        let recipe = sqlx::query_as::<_, Recipe>(
            r#"
            UPDATE recipes
            SET name = $2, text = $3, image = $4, cooking_time = $5
            WHERE id = $1
            RETURNING id, author_id, name, text, image, cooking_time, published_at
            "#,
        )
        .bind(recipe_id)
        .bind(draft.name.trim())
        .bind(&draft.text)
        .bind(image)
        .bind(draft.cooking_time)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RecipeEditError::RecipeNotFound(recipe_id))?;

        sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
            .bind(recipe_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = $1")
            .bind(recipe_id)
            .execute(&mut *tx)
            .await?;

        insert_lines(&mut tx, recipe_id, &draft.ingredient_lines).await?;
        insert_tag_links(&mut tx, recipe_id, &draft.tag_ids).await?;

        tx.commit().await?;

        let ingredient_lines = Self::ingredient_lines(pool, recipe_id).await?;

        Ok(RecipeDetails { recipe, tags, ingredient_lines })
    }

    /// Finds a recipe by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let recipe = sqlx::query_as::<_, Recipe>(
            r#"
            SELECT id, author_id, name, text, image, cooking_time, published_at
            FROM recipes
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(recipe)
    }

    /// Loads a recipe with its resolved tags and ingredient lines
    pub async fn find_details(
        pool: &PgPool,
        id: Uuid,
    ) -> Result<Option<RecipeDetails>, sqlx::Error> {
        let Some(recipe) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };

        let tags = Self::tags(pool, id).await?;
        let ingredient_lines = Self::ingredient_lines(pool, id).await?;

        Ok(Some(RecipeDetails { recipe, tags, ingredient_lines }))
    }

    /// Lists recipes matching the filter, newest first
    pub async fn list(pool: &PgPool, filter: &RecipeFilter) -> Result<Vec<Self>, sqlx::Error> {
        let recipes = sqlx::query_as::<_, Recipe>(
            r#"
            SELECT r.id, r.author_id, r.name, r.text, r.image, r.cooking_time, r.published_at
            FROM recipes r
            WHERE ($1::uuid IS NULL OR r.author_id = $1)
              AND ($2::uuid IS NULL OR EXISTS (
                    SELECT 1 FROM favorites f
                    WHERE f.recipe_id = r.id AND f.user_id = $2))
              AND ($3::uuid IS NULL OR EXISTS (
                    SELECT 1 FROM cart_entries ce
                    JOIN carts c ON c.id = ce.cart_id
                    WHERE ce.recipe_id = r.id AND c.user_id = $3))
              AND (cardinality($4::text[]) = 0 OR EXISTS (
                    SELECT 1 FROM recipe_tags rt
                    JOIN tags t ON t.id = rt.tag_id
                    WHERE rt.recipe_id = r.id AND t.slug = ANY($4)))
            ORDER BY r.published_at DESC, r.id
            LIMIT $5
            "#,
        )
        .bind(filter.author_id)
        .bind(filter.favorited_by)
        .bind(filter.in_cart_of)
        .bind(&filter.tag_slugs)
        .bind(filter.limit)
        .fetch_all(pool)
        .await?;

        Ok(recipes)
    }

    /// Deletes a recipe; its lines and tag links cascade
    ///
    /// # Returns
    ///
    /// True if the recipe was deleted, false if it did not exist.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Loads a recipe's ingredient lines, ordered by ingredient name
    pub async fn ingredient_lines(
        pool: &PgPool,
        recipe_id: Uuid,
    ) -> Result<Vec<IngredientLine>, sqlx::Error> {
        let rows = sqlx::query_as::<_, LineRow>(
            r#"
            SELECT i.id, i.name, i.measurement_unit, ri.amount
            FROM recipe_ingredients ri
            JOIN ingredients i ON i.id = ri.ingredient_id
            WHERE ri.recipe_id = $1
            ORDER BY i.name, i.measurement_unit
            "#,
        )
        .bind(recipe_id)
        .fetch_all(pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| IngredientLine {
                ingredient: Ingredient {
                    id: row.id,
                    name: row.name,
                    measurement_unit: row.measurement_unit,
                },
                amount: row.amount,
            })
            .collect())
    }

    /// Loads a recipe's tags, ordered by name
    pub async fn tags(pool: &PgPool, recipe_id: Uuid) -> Result<Vec<Tag>, sqlx::Error> {
        let tags = sqlx::query_as::<_, Tag>(
            r#"
            SELECT t.id, t.name, t.slug, t.color
            FROM recipe_tags rt
            JOIN tags t ON t.id = rt.tag_id
            WHERE rt.recipe_id = $1
            ORDER BY t.name
            "#,
        )
        .bind(recipe_id)
        .fetch_all(pool)
        .await?;

        Ok(tags)
    }
}

#[derive(sqlx::FromRow)]
struct LineRow {
    id: Uuid,
    name: String,
    measurement_unit: String,
    amount: i32,
}

/// Resolves every referenced tag and ingredient ID, failing on the first
/// missing one
async fn resolve_references(
    pool: &PgPool,
    draft: &RecipeDraft,
) -> Result<(Vec<Tag>, Vec<Ingredient>), RecipeEditError> {
    let tags = Tag::find_many(pool, &draft.tag_ids).await?;
    let found_tags: HashSet<Uuid> = tags.iter().map(|t| t.id).collect();
    if let Some(missing) = draft.tag_ids.iter().find(|id| !found_tags.contains(id)) {
        return Err(RecipeEditError::TagNotFound(*missing));
    }

    let ingredient_ids: Vec<Uuid> = draft
        .ingredient_lines
        .iter()
        .map(|line| line.ingredient_id)
        .collect();
    let ingredients = Ingredient::find_many(pool, &ingredient_ids).await?;
    let found_ingredients: HashSet<Uuid> = ingredients.iter().map(|i| i.id).collect();
    if let Some(missing) = ingredient_ids.iter().find(|id| !found_ingredients.contains(id)) {
        return Err(RecipeEditError::IngredientNotFound(*missing));
    }

    Ok((tags, ingredients))
}

async fn insert_lines(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    recipe_id: Uuid,
    lines: &[IngredientLineInput],
) -> Result<(), sqlx::Error> {
    let ingredient_ids: Vec<Uuid> = lines.iter().map(|line| line.ingredient_id).collect();
    let amounts: Vec<i32> = lines.iter().map(|line| line.amount).collect();

    sqlx::query(
        r#"
        INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount)
        SELECT $1, ingredient_id, amount
        FROM UNNEST($2::uuid[], $3::int4[]) AS input(ingredient_id, amount)
        "#,
    )
    .bind(recipe_id)
    .bind(ingredient_ids)
    .bind(amounts)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

async fn insert_tag_links(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    recipe_id: Uuid,
    tag_ids: &[Uuid],
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO recipe_tags (recipe_id, tag_id)
        SELECT $1, tag_id
        FROM UNNEST($2::uuid[]) AS input(tag_id)
        "#,
    )
    .bind(recipe_id)
    .bind(tag_ids)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> RecipeDraft {
        RecipeDraft {
            name: "Pancakes".to_string(),
            text: "Mix and fry.".to_string(),
            cooking_time: 20,
            image: None,
            tag_ids: vec![Uuid::new_v4()],
            ingredient_lines: vec![IngredientLineInput {
                ingredient_id: Uuid::new_v4(),
                amount: 200,
            }],
        }
    }

    fn limits() -> ValidationLimits {
        ValidationLimits::default()
    }

    #[test]
    fn test_valid_draft_passes() {
        assert!(validate_draft(&draft(), &limits()).is_ok());
    }

    #[test]
    fn test_cooking_time_boundary_is_exactly_one() {
        let mut d = draft();

        d.cooking_time = 0;
        assert!(matches!(
            validate_draft(&d, &limits()),
            Err(RecipeEditError::Validation { ref field, .. }) if field == "cooking_time"
        ));

        d.cooking_time = 1;
        assert!(validate_draft(&d, &limits()).is_ok());

        d.cooking_time = 1441;
        assert!(validate_draft(&d, &limits()).is_err());
    }

    #[test]
    fn test_draft_requires_at_least_one_tag() {
        let mut d = draft();
        d.tag_ids.clear();

        assert!(matches!(
            validate_draft(&d, &limits()),
            Err(RecipeEditError::Validation { ref field, .. }) if field == "tags"
        ));
    }

    #[test]
    fn test_draft_rejects_duplicate_tag_ids() {
        let mut d = draft();
        let tag = Uuid::new_v4();
        d.tag_ids = vec![tag, tag];

        assert!(validate_draft(&d, &limits()).is_err());
    }

    #[test]
    fn test_draft_requires_at_least_one_ingredient_line() {
        let mut d = draft();
        d.ingredient_lines.clear();

        assert!(matches!(
            validate_draft(&d, &limits()),
            Err(RecipeEditError::Validation { ref field, .. }) if field == "ingredients"
        ));
    }

    #[test]
    fn test_draft_allows_duplicate_ingredient_lines() {
        // Duplicate lines for one ingredient are storable; the shopping-list
        // aggregation merges them.
        let mut d = draft();
        let ingredient = Uuid::new_v4();
        d.ingredient_lines = vec![
            IngredientLineInput { ingredient_id: ingredient, amount: 2 },
            IngredientLineInput { ingredient_id: ingredient, amount: 3 },
        ];

        assert!(validate_draft(&d, &limits()).is_ok());
    }

    #[test]
    fn test_draft_amount_bounds() {
        let mut d = draft();

        d.ingredient_lines[0].amount = 0;
        assert!(validate_draft(&d, &limits()).is_err());

        d.ingredient_lines[0].amount = 10_001;
        assert!(validate_draft(&d, &limits()).is_err());

        d.ingredient_lines[0].amount = 10_000;
        assert!(validate_draft(&d, &limits()).is_ok());
    }

    #[test]
    fn test_draft_rejects_blank_name_and_text() {
        let mut d = draft();
        d.name = "   ".to_string();
        assert!(validate_draft(&d, &limits()).is_err());

        let mut d = draft();
        d.text = String::new();
        assert!(validate_draft(&d, &limits()).is_err());
    }

    #[test]
    fn test_draft_image_payload() {
        let mut d = draft();

        d.image = Some("data:image/png;base64,aGVsbG8=".to_string());
        let decoded = validate_draft(&d, &limits()).unwrap();
        assert_eq!(decoded.as_deref(), Some(&b"hello"[..]));

        d.image = Some("data:image/png;base64,".to_string());
        assert!(matches!(
            validate_draft(&d, &limits()),
            Err(RecipeEditError::Validation { ref field, .. }) if field == "image"
        ));

        d.image = Some("!!not-base64!!".to_string());
        assert!(validate_draft(&d, &limits()).is_err());
    }
}
