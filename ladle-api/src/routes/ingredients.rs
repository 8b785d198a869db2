/// Ingredient catalog endpoints
///
/// Read-only; the catalog is populated out of band by the bulk import
/// tooling. The `name` parameter is a case-insensitive prefix search; the
/// `limit` parameter is parsed leniently (absent or non-numeric means no
/// limit).
///
/// # Endpoints
///
/// - `GET /v1/ingredients?name=&limit=` - List or prefix-search ingredients
/// - `GET /v1/ingredients/:id` - Get a single ingredient

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use ladle_shared::{models::ingredient::Ingredient, validate};
use serde::Deserialize;
use uuid::Uuid;

/// Search parameters
#[derive(Debug, Default, Deserialize)]
pub struct IngredientSearchQuery {
    /// Name prefix to match, case-insensitively
    pub name: Option<String>,

    /// Result limit, parsed leniently
    pub limit: Option<String>,
}

/// Lists ingredients, optionally narrowed by a name prefix
pub async fn list_ingredients(
    State(state): State<AppState>,
    Query(query): Query<IngredientSearchQuery>,
) -> ApiResult<Json<Vec<Ingredient>>> {
    let limit = validate::lenient_limit(query.limit.as_deref());

    let ingredients = match query.name.as_deref().filter(|name| !name.is_empty()) {
        Some(prefix) => Ingredient::search(&state.db, prefix, limit).await?,
        None => Ingredient::list(&state.db).await?,
    };

    Ok(Json(ingredients))
}

/// Gets a single ingredient by ID
pub async fn get_ingredient(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Ingredient>> {
    let ingredient = Ingredient::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Ingredient {} does not exist", id)))?;

    Ok(Json(ingredient))
}
