//! Single and bulk registration checks

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use wacheck_core::models::CheckResult;
use wacheck_core::AppError;

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckNumberRequest {
    #[serde(default)]
    pub number: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BulkCheckRequest {
    #[serde(default)]
    pub numbers: Option<Vec<String>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckResponse {
    pub success: bool,
    pub data: CheckResult,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BulkCheckResponse {
    pub success: bool,
    pub data: Vec<CheckResult>,
}

#[utoipa::path(
    post,
    path = "/api/check-whatsapp",
    tag = "check",
    request_body = CheckNumberRequest,
    responses(
        (status = 200, description = "Check result", body = CheckResponse),
        (status = 400, description = "Missing or invalid number", body = ErrorResponse),
        (status = 503, description = "Session not connected", body = ErrorResponse),
        (status = 500, description = "Check failed", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(operation = "check_number"))]
pub async fn check_number(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CheckNumberRequest>,
) -> Result<Json<CheckResponse>, HttpAppError> {
    let number = request.number.unwrap_or_default();
    let result = state.checks.check_one(&number).await?;

    Ok(Json(CheckResponse {
        success: true,
        data: result,
    }))
}

/// Check numbers sequentially. Invalid entries and per-number failures are
/// reported in the results rather than failing the request.
#[utoipa::path(
    post,
    path = "/api/check-whatsapp-bulk",
    tag = "check",
    request_body = BulkCheckRequest,
    responses(
        (status = 200, description = "One result per input number, in order", body = BulkCheckResponse),
        (status = 400, description = "Missing list or too many numbers", body = ErrorResponse),
        (status = 503, description = "Session not connected", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(operation = "check_bulk"))]
pub async fn check_bulk(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<BulkCheckRequest>,
) -> Result<Json<BulkCheckResponse>, HttpAppError> {
    let numbers = request
        .numbers
        .ok_or_else(|| AppError::InvalidInput("Numbers list is required".to_string()))?;

    let results = state.checks.check_bulk(&numbers).await?;

    Ok(Json(BulkCheckResponse {
        success: true,
        data: results,
    }))
}
