//! Number list upload and parsing

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use wacheck_core::parse_list;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::upload::extract_multipart_text;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParsedList {
    pub file_name: String,
    pub count: usize,
    pub numbers: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ParsedListResponse {
    pub success: bool,
    pub data: ParsedList,
}

/// Extract candidate numbers from an uploaded `.txt` or `.csv` list.
/// Candidates are validated later, when they are checked.
#[utoipa::path(
    post,
    path = "/api/lists/parse",
    tag = "lists",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Candidate numbers in file order", body = ParsedListResponse),
        (status = 400, description = "Empty file or CSV without numbers", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "parse_list"))]
pub async fn parse_list_file(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<ParsedListResponse>, HttpAppError> {
    let form = extract_multipart_text(multipart, state.config.server.max_upload_size_bytes).await?;

    let numbers = parse_list(&form.content, &form.file_name)?;
    tracing::info!(file_name = %form.file_name, count = numbers.len(), "List parsed");

    Ok(Json(ParsedListResponse {
        success: true,
        data: ParsedList {
            file_name: form.file_name,
            count: numbers.len(),
            numbers,
        },
    }))
}
