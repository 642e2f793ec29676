//! CSV export of check results

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::Response,
};
use chrono::Utc;
use serde::Deserialize;
use utoipa::ToSchema;
use wacheck_core::export::export_results as render_csv;
use wacheck_core::models::CheckResult;
use wacheck_core::{AppError, ResultFilter};

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ExportRequest {
    pub results: Vec<CheckResult>,
    #[serde(default)]
    pub filter: ResultFilter,
}

#[utoipa::path(
    post,
    path = "/api/export",
    tag = "results",
    request_body = ExportRequest,
    responses(
        (status = 200, description = "CSV file (UTF-8 with BOM)", body = String, content_type = "text/csv"),
        (status = 400, description = "No results match the filter", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(operation = "export_results", filter = %request.filter))]
pub async fn export_results(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<ExportRequest>,
) -> Result<Response, HttpAppError> {
    let export = render_csv(
        &request.results,
        request.filter,
        &state.carriers,
        Utc::now().date_naive(),
    );

    if export.rows == 0 {
        return Err(AppError::BadRequest("No results to export".to_string()).into());
    }

    tracing::info!(file_name = %export.file_name, rows = export.rows, "Results exported");

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/csv; charset=utf-8")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", export.file_name),
        )
        .body(Body::from(export.content))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {}", e)))?;

    Ok(response)
}
