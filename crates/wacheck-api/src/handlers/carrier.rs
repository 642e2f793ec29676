//! Carrier lookup from the static prefix tables

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;
use wacheck_core::models::CarrierResult;
use wacheck_core::AppError;

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CarrierRequest {
    #[serde(default)]
    pub number: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CarrierBulkRequest {
    #[validate(length(min = 1, max = 10000, message = "Provide between 1 and 10000 numbers"))]
    pub numbers: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CarrierResponse {
    pub success: bool,
    pub data: CarrierResult,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CarrierBulkResponse {
    pub success: bool,
    pub data: Vec<CarrierResult>,
}

#[utoipa::path(
    post,
    path = "/api/carrier",
    tag = "carrier",
    request_body = CarrierRequest,
    responses(
        (status = 200, description = "Carrier information; `error` set when undetermined", body = CarrierResponse),
        (status = 400, description = "Missing number", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(operation = "lookup_carrier"))]
pub async fn lookup_carrier(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CarrierRequest>,
) -> Result<Json<CarrierResponse>, HttpAppError> {
    let number = request
        .number
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| AppError::InvalidInput("Phone number is required".to_string()))?;

    Ok(Json(CarrierResponse {
        success: true,
        data: state.carriers.lookup_raw(&number),
    }))
}

#[utoipa::path(
    post,
    path = "/api/carrier-bulk",
    tag = "carrier",
    request_body = CarrierBulkRequest,
    responses(
        (status = 200, description = "One result per input number, in order", body = CarrierBulkResponse),
        (status = 400, description = "Empty or oversized list", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(operation = "lookup_carrier_bulk"))]
pub async fn lookup_carrier_bulk(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CarrierBulkRequest>,
) -> Result<Json<CarrierBulkResponse>, HttpAppError> {
    request.validate()?;

    let results = state.carriers.lookup_many(&request.numbers);
    let undetermined = results.iter().filter(|r| r.error.is_some()).count();
    tracing::debug!(count = results.len(), undetermined, "Carrier lookup finished");

    Ok(Json(CarrierBulkResponse {
        success: true,
        data: results,
    }))
}
