/// Recipe endpoints
///
/// Create and replace go through the atomic edit transaction in
/// `ladle_shared::models::recipe`; favorites and the cart are strict
/// membership sets; the shopping-list download runs the aggregation engine
/// and hands the result to the configured document renderer.
///
/// # Endpoints
///
/// - `GET /v1/recipes?author=&tags=&is_favorited=&is_in_shopping_cart=&limit=`
/// - `POST /v1/recipes`
/// - `GET /v1/recipes/:id`
/// - `PATCH /v1/recipes/:id` (author or admin)
/// - `DELETE /v1/recipes/:id` (author or admin)
/// - `POST | DELETE /v1/recipes/:id/favorite`
/// - `POST | DELETE /v1/recipes/:id/shopping_cart`
/// - `GET /v1/recipes/download_shopping_cart`
///
/// The `tags` filter is a comma-separated list of slugs, OR-combined with
/// each other and AND-combined with the other filters.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::users::{profile_view, UserProfileView},
};
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Utc};
use ladle_shared::{
    auth::middleware::AuthContext,
    models::{
        cart::Cart,
        favorite::Favorite,
        recipe::{
            IngredientLineInput, Recipe, RecipeDetails, RecipeDraft, RecipeFilter,
        },
        tag::Tag,
        user::User,
    },
    shopping::aggregate::consolidate,
    validate,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Recipe create/replace request
///
/// The full payload of the edit contract; a PATCH with a missing list field
/// fails validation before any stored data is touched.
#[derive(Debug, Deserialize, Validate)]
pub struct RecipeEditRequest {
    /// Recipe name
    #[validate(length(min = 1, max = 250, message = "Name must be 1-250 characters"))]
    pub name: String,

    /// Recipe body text
    pub text: String,

    /// Cooking time in minutes
    pub cooking_time: i32,

    /// Optional image as a base64 payload (bare or `data:` URI)
    pub image: Option<String>,

    /// Tag IDs; at least one required
    #[serde(default)]
    pub tags: Vec<Uuid>,

    /// Ingredient lines; at least one required
    #[serde(default)]
    pub ingredients: Vec<IngredientLineRequest>,
}

/// One ingredient line of the edit payload
#[derive(Debug, Deserialize)]
pub struct IngredientLineRequest {
    /// Catalog ingredient ID
    pub id: Uuid,

    /// Amount of the ingredient
    pub amount: i32,
}

impl RecipeEditRequest {
    fn into_draft(self) -> RecipeDraft {
        RecipeDraft {
            name: self.name,
            text: self.text,
            cooking_time: self.cooking_time,
            image: self.image,
            tag_ids: self.tags,
            ingredient_lines: self
                .ingredients
                .into_iter()
                .map(|line| IngredientLineInput {
                    ingredient_id: line.id,
                    amount: line.amount,
                })
                .collect(),
        }
    }
}

/// List query parameters
#[derive(Debug, Default, Deserialize)]
pub struct ListRecipesQuery {
    /// Filter by author ID
    pub author: Option<String>,

    /// Comma-separated tag slugs, OR-combined
    pub tags: Option<String>,

    /// "1" or "true": only the caller's favorites
    pub is_favorited: Option<String>,

    /// "1" or "true": only recipes in the caller's cart
    pub is_in_shopping_cart: Option<String>,

    /// Result limit, parsed leniently
    pub limit: Option<String>,
}

/// Full recipe view for a specific viewer
///
/// Combines the stored scalars with resolved tags and lines plus the
/// viewer-dependent flags; assembled explicitly from (recipe, viewer).
#[derive(Debug, Serialize)]
pub struct RecipeView {
    /// Recipe ID
    pub id: Uuid,

    /// Author profile as seen by the viewer
    pub author: UserProfileView,

    /// Recipe name
    pub name: String,

    /// Recipe body text
    pub text: String,

    /// Image bytes re-encoded as base64, if present
    pub image: Option<String>,

    /// Cooking time in minutes
    pub cooking_time: i32,

    /// Resolved tags, ordered by name
    pub tags: Vec<Tag>,

    /// Resolved ingredient lines, ordered by ingredient name
    pub ingredients: Vec<IngredientLineView>,

    /// Whether the viewer favorited this recipe
    pub is_favorited: bool,

    /// Whether this recipe is in the viewer's cart
    pub is_in_shopping_cart: bool,

    /// How many users favorited this recipe
    pub favorite_count: i64,

    /// Publish timestamp
    pub published_at: DateTime<Utc>,
}

/// One resolved ingredient line of a recipe view
#[derive(Debug, Serialize)]
pub struct IngredientLineView {
    /// Catalog ingredient ID
    pub id: Uuid,

    /// Ingredient name
    pub name: String,

    /// Measurement unit
    pub measurement_unit: String,

    /// Amount of the ingredient
    pub amount: i32,
}

/// Compact recipe view returned by the favorite/cart toggles
#[derive(Debug, Serialize)]
pub struct ShortRecipeView {
    /// Recipe ID
    pub id: Uuid,

    /// Recipe name
    pub name: String,

    /// Image bytes re-encoded as base64, if present
    pub image: Option<String>,

    /// Cooking time in minutes
    pub cooking_time: i32,
}

impl ShortRecipeView {
    fn from_recipe(recipe: &Recipe) -> Self {
        Self {
            id: recipe.id,
            name: recipe.name.clone(),
            image: recipe.image.as_deref().map(|bytes| BASE64.encode(bytes)),
            cooking_time: recipe.cooking_time,
        }
    }
}

/// Assembles the full view of a recipe for the given viewer
async fn recipe_view(
    state: &AppState,
    details: RecipeDetails,
    viewer: &AuthContext,
) -> ApiResult<RecipeView> {
    let recipe = details.recipe;

    let author = User::find_by_id(&state.db, recipe.author_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Recipe author does not exist".to_string()))?;
    let author_view = profile_view(&state.db, &author, viewer.user_id).await?;

    let is_favorited = Favorite::is_favorited(&state.db, viewer.user_id, recipe.id).await?;
    let is_in_shopping_cart = Cart::contains(&state.db, viewer.user_id, recipe.id).await?;
    let favorite_count = Favorite::count_for_recipe(&state.db, recipe.id).await?;

    Ok(RecipeView {
        id: recipe.id,
        author: author_view,
        name: recipe.name,
        text: recipe.text,
        image: recipe.image.as_deref().map(|bytes| BASE64.encode(bytes)),
        cooking_time: recipe.cooking_time,
        tags: details.tags,
        ingredients: details
            .ingredient_lines
            .into_iter()
            .map(|line| IngredientLineView {
                id: line.ingredient.id,
                name: line.ingredient.name,
                measurement_unit: line.ingredient.measurement_unit,
                amount: line.amount,
            })
            .collect(),
        is_favorited,
        is_in_shopping_cart,
        favorite_count,
        published_at: recipe.published_at,
    })
}

fn flag(value: Option<&str>) -> bool {
    matches!(value, Some("1") | Some("true"))
}

/// Lists recipes matching the filters, newest first
pub async fn list_recipes(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ListRecipesQuery>,
) -> ApiResult<Json<Vec<RecipeView>>> {
    let author_id = match query.author.as_deref() {
        Some(raw) => Some(
            Uuid::parse_str(raw)
                .map_err(|_| ApiError::BadRequest("author must be a UUID".to_string()))?,
        ),
        None => None,
    };

    let tag_slugs: Vec<String> = query
        .tags
        .as_deref()
        .map(|raw| {
            raw.split(',')
                .map(|slug| slug.trim().to_string())
                .filter(|slug| !slug.is_empty())
                .collect()
        })
        .unwrap_or_default();

    let filter = RecipeFilter {
        author_id,
        tag_slugs,
        favorited_by: flag(query.is_favorited.as_deref()).then_some(auth.user_id),
        in_cart_of: flag(query.is_in_shopping_cart.as_deref()).then_some(auth.user_id),
        limit: validate::lenient_limit(query.limit.as_deref()),
    };

    let recipes = Recipe::list(&state.db, &filter).await?;

    let mut views = Vec::with_capacity(recipes.len());
    for recipe in recipes {
        let tags = Recipe::tags(&state.db, recipe.id).await?;
        let ingredient_lines = Recipe::ingredient_lines(&state.db, recipe.id).await?;
        let details = RecipeDetails { recipe, tags, ingredient_lines };
        views.push(recipe_view(&state, details, &auth).await?);
    }

    Ok(Json(views))
}

/// Creates a recipe
///
/// # Errors
///
/// - `404 Not Found`: a referenced tag or ingredient does not exist
/// - `422 Unprocessable Entity`: validation failed; nothing was written
pub async fn create_recipe(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<RecipeEditRequest>,
) -> ApiResult<(StatusCode, Json<RecipeView>)> {
    req.validate().map_err(ApiError::from_validator)?;

    let details =
        Recipe::create(&state.db, auth.user_id, req.into_draft(), state.limits()).await?;

    let view = recipe_view(&state, details, &auth).await?;

    Ok((StatusCode::CREATED, Json(view)))
}

/// Gets a single recipe
pub async fn get_recipe(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<RecipeView>> {
    let details = Recipe::find_details(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Recipe {} does not exist", id)))?;

    let view = recipe_view(&state, details, &auth).await?;

    Ok(Json(view))
}

/// Replaces a recipe (author or admin only)
///
/// The whole payload is required; a payload missing its tags or ingredient
/// lines fails validation and leaves the stored recipe untouched.
pub async fn update_recipe(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<RecipeEditRequest>,
) -> ApiResult<Json<RecipeView>> {
    let recipe = Recipe::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Recipe {} does not exist", id)))?;

    if !auth.can_modify(recipe.author_id) {
        return Err(ApiError::Forbidden(
            "Only the author may edit this recipe".to_string(),
        ));
    }

    req.validate().map_err(ApiError::from_validator)?;

    let details = Recipe::replace(&state.db, id, req.into_draft(), state.limits()).await?;

    let view = recipe_view(&state, details, &auth).await?;

    Ok(Json(view))
}

/// Deletes a recipe (author or admin only)
pub async fn delete_recipe(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let recipe = Recipe::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Recipe {} does not exist", id)))?;

    if !auth.can_modify(recipe.author_id) {
        return Err(ApiError::Forbidden(
            "Only the author may delete this recipe".to_string(),
        ));
    }

    Recipe::delete(&state.db, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Adds a recipe to the caller's favorites
///
/// # Errors
///
/// - `409 Conflict`: already a favorite
pub async fn add_favorite(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<(StatusCode, Json<ShortRecipeView>)> {
    let recipe = Recipe::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Recipe {} does not exist", id)))?;

    Favorite::add(&state.db, auth.user_id, recipe.id).await?;

    Ok((StatusCode::CREATED, Json(ShortRecipeView::from_recipe(&recipe))))
}

/// Removes a recipe from the caller's favorites
///
/// # Errors
///
/// - `409 Conflict`: not a favorite
pub async fn remove_favorite(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    let recipe = Recipe::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Recipe {} does not exist", id)))?;

    Favorite::remove(&state.db, auth.user_id, recipe.id).await?;

    Ok(Json(serde_json::json!({})))
}

/// Adds a recipe to the caller's cart, creating the cart on first use
///
/// # Errors
///
/// - `409 Conflict`: already in the cart
pub async fn add_to_cart(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<(StatusCode, Json<ShortRecipeView>)> {
    let recipe = Recipe::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Recipe {} does not exist", id)))?;

    Cart::add_recipe(&state.db, auth.user_id, recipe.id).await?;

    Ok((StatusCode::CREATED, Json(ShortRecipeView::from_recipe(&recipe))))
}

/// Removes a recipe from the caller's cart
///
/// # Errors
///
/// - `409 Conflict`: not in the cart
pub async fn remove_from_cart(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    let recipe = Recipe::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Recipe {} does not exist", id)))?;

    Cart::remove_recipe(&state.db, auth.user_id, recipe.id).await?;

    Ok(Json(serde_json::json!({})))
}

/// Downloads the caller's cart as a consolidated ingredient checklist
///
/// Reads the cart lines, merges them with the aggregation engine, and hands
/// the sorted list to the configured document renderer. An empty cart
/// yields a valid, empty checklist rather than an error.
pub async fn download_shopping_cart(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Response> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User does not exist".to_string()))?;

    let lines = Cart::shopping_lines(&state.db, auth.user_id).await?;
    let items = consolidate(lines);

    let title = format!("{}'s shopping cart", user.first_name);
    let document = state.renderer.render(&title, &items);

    let headers = [
        (
            header::CONTENT_TYPE,
            state.renderer.content_type().to_string(),
        ),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", state.renderer.file_name()),
        ),
    ];

    Ok((headers, document).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_parsing() {
        assert!(flag(Some("1")));
        assert!(flag(Some("true")));
        assert!(!flag(Some("0")));
        assert!(!flag(Some("yes")));
        assert!(!flag(None));
    }

    #[test]
    fn test_edit_request_maps_into_draft() {
        let req = RecipeEditRequest {
            name: "Pancakes".to_string(),
            text: "Mix and fry.".to_string(),
            cooking_time: 20,
            image: None,
            tags: vec![Uuid::new_v4()],
            ingredients: vec![IngredientLineRequest { id: Uuid::new_v4(), amount: 200 }],
        };

        let ingredient_id = req.ingredients[0].id;
        let draft = req.into_draft();

        assert_eq!(draft.name, "Pancakes");
        assert_eq!(draft.ingredient_lines.len(), 1);
        assert_eq!(draft.ingredient_lines[0].ingredient_id, ingredient_id);
        assert_eq!(draft.ingredient_lines[0].amount, 200);
    }

    #[test]
    fn test_short_view_encodes_image() {
        let recipe = Recipe {
            id: Uuid::new_v4(),
            author_id: Uuid::new_v4(),
            name: "Pancakes".to_string(),
            text: "Mix and fry.".to_string(),
            image: Some(b"hello".to_vec()),
            cooking_time: 20,
            published_at: Utc::now(),
        };

        let view = ShortRecipeView::from_recipe(&recipe);
        assert_eq!(view.image.as_deref(), Some("aGVsbG8="));
    }
}
