/// Application state and router builder
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                          # Health check (public)
/// └── /v1/
///     ├── /auth/                       # register, login, refresh (public)
///     ├── /tags/                       # tag catalog (public, read-only)
///     ├── /ingredients/                # ingredient catalog (public, read-only)
///     ├── /recipes/                    # recipe CRUD, favorites, cart (JWT)
///     └── /users/                      # profiles, subscriptions (JWT)
/// ```
///
/// # Middleware Stack
///
/// Applied in order: logging (tower-http TraceLayer), CORS, then JWT
/// authentication on the protected subrouters.

use crate::config::Config;
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, patch, post},
    Router,
};
use ladle_shared::auth::{jwt, middleware::AuthContext};
use ladle_shared::shopping::render::{ChecklistRenderer, DocumentRenderer};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned into each request handler via Axum's `State` extractor; Arc keeps
/// the clones cheap.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Shopping-list document renderer
    ///
    /// The plain-text checklist by default; a PDF renderer slots in behind
    /// the same trait.
    pub renderer: Arc<dyn DocumentRenderer>,
}

impl AppState {
    /// Creates application state with the default checklist renderer
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
            renderer: Arc::new(ChecklistRenderer::new()),
        }
    }

    /// Gets the JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }

    /// Gets the validation limits passed into domain validation
    pub fn limits(&self) -> &ladle_shared::validate::ValidationLimits {
        &self.config.validation
    }
}

/// Builds the complete Axum router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Public: anyone may register or exchange credentials for tokens
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh));

    // Public reference data; tag creation is admin-only and authenticated
    let tag_admin_routes = Router::new()
        .route("/", post(routes::tags::create_tag))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let tag_routes = Router::new()
        .route("/", get(routes::tags::list_tags))
        .route("/:id", get(routes::tags::get_tag))
        .merge(tag_admin_routes);

    let ingredient_routes = Router::new()
        .route("/", get(routes::ingredients::list_ingredients))
        .route("/:id", get(routes::ingredients::get_ingredient));

    // Authenticated recipe operations
    let recipe_routes = Router::new()
        .route("/", get(routes::recipes::list_recipes))
        .route("/", post(routes::recipes::create_recipe))
        .route(
            "/download_shopping_cart",
            get(routes::recipes::download_shopping_cart),
        )
        .route("/:id", get(routes::recipes::get_recipe))
        .route("/:id", patch(routes::recipes::update_recipe))
        .route("/:id", delete(routes::recipes::delete_recipe))
        .route("/:id/favorite", post(routes::recipes::add_favorite))
        .route("/:id/favorite", delete(routes::recipes::remove_favorite))
        .route("/:id/shopping_cart", post(routes::recipes::add_to_cart))
        .route(
            "/:id/shopping_cart",
            delete(routes::recipes::remove_from_cart),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // Authenticated user-graph operations
    let user_routes = Router::new()
        .route("/subscriptions", get(routes::users::list_subscriptions))
        .route("/:id", get(routes::users::get_profile))
        .route("/:id", delete(routes::users::delete_user))
        .route("/:id/subscribe", post(routes::users::subscribe))
        .route("/:id/subscribe", delete(routes::users::unsubscribe))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/tags", tag_routes)
        .nest("/ingredients", ingredient_routes)
        .nest("/recipes", recipe_routes)
        .nest("/users", user_routes);

    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Validates the Bearer token from the Authorization header and injects an
/// `AuthContext` into request extensions. Anonymous callers are rejected
/// before any protected handler runs.
async fn jwt_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            crate::error::ApiError::Unauthorized("Missing authorization header".to_string())
        })?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        crate::error::ApiError::BadRequest("Expected Bearer token".to_string())
    })?;

    let claims = jwt::validate_access_token(token, state.jwt_secret())?;

    let auth_context = AuthContext::from_claims(&claims);

    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
