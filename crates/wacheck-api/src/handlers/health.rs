//! Health check handlers.
//!
//! The HTTP server stays up whatever the session state, so health reports the
//! session without failing on it.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use utoipa::ToSchema;
use wacheck_core::models::SessionStatus;

use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheckResponse {
    pub status: String,
    pub session: SessionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    pub version: String,
}

/// Liveness probe - process is running.
pub async fn liveness_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "alive" })),
    )
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Server is up; session status included", body = HealthCheckResponse)
    )
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthCheckResponse> {
    let snapshot = state.session.snapshot();
    let status = if snapshot.status == SessionStatus::Error {
        "degraded"
    } else {
        "healthy"
    };

    Json(HealthCheckResponse {
        status: status.to_string(),
        session: snapshot.status,
        last_error: snapshot.last_error,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
