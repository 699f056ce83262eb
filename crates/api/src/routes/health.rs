use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether the videos directory can be listed.
    pub videos_dir_readable: bool,
}

/// GET /health -- returns service and videos directory health.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let videos_dir_readable = state.library.is_readable().await;

    let status = if videos_dir_readable { "ok" } else { "degraded" };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        videos_dir_readable,
    })
}

/// Mount health check routes (root level, not under `/api`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
