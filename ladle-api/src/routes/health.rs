/// Health check endpoint
///
/// `GET /health` answers liveness probes and reports whether the database
/// behind the pool is reachable. Kept outside the `/v1` tree so deploy
/// tooling can probe it without versioned paths or credentials.

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use ladle_shared::db::pool;
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// "healthy" when the database answers, "degraded" otherwise
    pub status: String,

    /// Whether the database answered the check query
    pub database_reachable: bool,

    /// Server version
    pub version: String,
}

/// Health check handler
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let database_reachable = pool::health_check(&state.db).await.is_ok();

    let status = if database_reachable { "healthy" } else { "degraded" };

    Ok(Json(HealthResponse {
        status: status.to_string(),
        database_reachable,
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}
