//! Health check endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: bool,
}

/// GET /health
///
/// Liveness plus a database ping.
pub async fn check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    if state.db.health_check().await {
        (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok",
                database: true,
            }),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "degraded",
                database: false,
            }),
        )
    }
}
