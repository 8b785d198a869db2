/// Tag catalog endpoints
///
/// Tags are immutable reference data: reads are public, creation is
/// restricted to administrators, and there is no update or delete.
///
/// # Endpoints
///
/// - `GET /v1/tags` - List all tags
/// - `GET /v1/tags/:id` - Get a single tag
/// - `POST /v1/tags` - Create a tag (admin only)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use ladle_shared::{
    auth::middleware::AuthContext,
    models::tag::{CreateTag, Tag},
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Create tag request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTagRequest {
    /// Display name
    #[validate(length(min = 1, max = 32, message = "Name must be 1-32 characters"))]
    pub name: String,

    /// URL slug
    #[validate(length(min = 1, max = 32, message = "Slug must be 1-32 characters"))]
    pub slug: String,

    /// Hex color like `#49B64E`
    pub color: String,
}

/// Lists all tags, ordered by name
pub async fn list_tags(State(state): State<AppState>) -> ApiResult<Json<Vec<Tag>>> {
    let tags = Tag::list(&state.db).await?;
    Ok(Json(tags))
}

/// Gets a single tag by ID
pub async fn get_tag(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Tag>> {
    let tag = Tag::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Tag {} does not exist", id)))?;

    Ok(Json(tag))
}

/// Creates a tag (admin only)
///
/// # Errors
///
/// - `403 Forbidden`: caller is not an administrator
/// - `409 Conflict`: name, slug, or color already exists
/// - `422 Unprocessable Entity`: malformed color
pub async fn create_tag(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateTagRequest>,
) -> ApiResult<(StatusCode, Json<Tag>)> {
    if !auth.is_admin {
        return Err(ApiError::Forbidden(
            "Only administrators may create tags".to_string(),
        ));
    }

    req.validate().map_err(ApiError::from_validator)?;

    let tag = Tag::create(
        &state.db,
        CreateTag {
            name: req.name,
            slug: req.slug,
            color: req.color,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(tag)))
}
