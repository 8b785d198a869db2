/// User profile and subscription endpoints
///
/// The subscription graph is a strict membership set: following an author
/// twice or unsubscribing from one you never followed is a conflict, and a
/// self-follow always reports the self-follow reason, even on repeat
/// attempts.
///
/// # Endpoints
///
/// - `GET /v1/users/subscriptions?limit=` - Authors the caller follows
/// - `GET /v1/users/:id` - Profile with viewer-dependent `is_subscribed`
/// - `POST /v1/users/:id/subscribe` - Follow an author
/// - `DELETE /v1/users/:id/subscribe` - Unfollow an author
/// - `DELETE /v1/users/:id` - Delete an account (self or admin)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use ladle_shared::{
    auth::middleware::AuthContext,
    models::{follow::Follow, user::User},
    validate,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// User profile as seen by a specific viewer
///
/// `is_subscribed` depends on who is looking; the viewer is passed in
/// explicitly rather than pulled from ambient request context.
#[derive(Debug, Serialize)]
pub struct UserProfileView {
    /// User ID
    pub id: Uuid,

    /// Email address
    pub email: String,

    /// Username
    pub username: String,

    /// First name
    pub first_name: String,

    /// Last name
    pub last_name: String,

    /// Whether the viewer follows this user
    pub is_subscribed: bool,
}

/// Assembles a profile view for the given viewer
pub async fn profile_view(
    pool: &PgPool,
    user: &User,
    viewer_id: Uuid,
) -> Result<UserProfileView, sqlx::Error> {
    let is_subscribed = Follow::exists(pool, viewer_id, user.id).await?;

    Ok(UserProfileView {
        id: user.id,
        email: user.email.clone(),
        username: user.username.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        is_subscribed,
    })
}

/// Subscriptions query parameters
#[derive(Debug, Default, Deserialize)]
pub struct SubscriptionsQuery {
    /// Result limit, parsed leniently: absent or non-numeric means no limit
    pub limit: Option<String>,
}

/// Lists the authors the caller follows, in stable follow order
pub async fn list_subscriptions(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<SubscriptionsQuery>,
) -> ApiResult<Json<Vec<UserProfileView>>> {
    let limit = validate::lenient_limit(query.limit.as_deref());

    let authors = Follow::authors_followed_by(&state.db, auth.user_id, limit).await?;

    let mut views = Vec::with_capacity(authors.len());
    for author in &authors {
        views.push(profile_view(&state.db, author, auth.user_id).await?);
    }

    Ok(Json(views))
}

/// Gets a user profile
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<UserProfileView>> {
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User {} does not exist", id)))?;

    let view = profile_view(&state.db, &user, auth.user_id).await?;

    Ok(Json(view))
}

/// Follows an author
///
/// The self-follow check runs before anything else so it wins over both the
/// existence lookup and the duplicate-edge conflict.
///
/// # Errors
///
/// - `404 Not Found`: author does not exist
/// - `409 Conflict`: already following
/// - `422 Unprocessable Entity`: self-follow
pub async fn subscribe(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<(StatusCode, Json<UserProfileView>)> {
    Follow::validate_pair(auth.user_id, id)?;

    let author = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User {} does not exist", id)))?;

    Follow::add(&state.db, auth.user_id, author.id).await?;

    let view = profile_view(&state.db, &author, auth.user_id).await?;

    Ok((StatusCode::CREATED, Json(view)))
}

/// Unfollows an author
///
/// # Errors
///
/// - `409 Conflict`: not following this author
pub async fn unsubscribe(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    Follow::remove(&state.db, auth.user_id, id).await?;

    Ok(Json(serde_json::json!({})))
}

/// Deletes a user account
///
/// Only the account owner or an administrator may delete it; owned recipes,
/// follows, favorites, and the cart cascade away with the account.
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if !auth.can_modify(id) {
        return Err(ApiError::Forbidden(
            "You may only delete your own account".to_string(),
        ));
    }

    let deleted = User::delete(&state.db, id).await?;
    if !deleted {
        return Err(ApiError::NotFound(format!("User {} does not exist", id)));
    }

    Ok(StatusCode::NO_CONTENT)
}
