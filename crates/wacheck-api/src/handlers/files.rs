//! List file tools: split into chunks, add or remove a prefix

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;
use wacheck_core::file_tools::{apply_prefix, split_lines, zip_chunks, PrefixMode};
use wacheck_core::models::UploadedFileData;
use wacheck_core::AppError;

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use crate::utils::upload::extract_multipart_text;

const DEFAULT_CHUNK_SIZE: usize = 100;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PrefixRequest {
    pub content: String,
    #[validate(length(min = 1, max = 32, message = "Prefix must be 1 to 32 characters"))]
    pub prefix: String,
    pub mode: PrefixMode,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PrefixedContent {
    pub content: String,
    pub line_count: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PrefixResponse {
    pub success: bool,
    pub data: PrefixedContent,
}

/// Split an uploaded list into `<name>_part_<n>.txt` chunks, returned as a zip archive.
/// Multipart fields: `file`, optional `chunkSize` (default 100).
#[utoipa::path(
    post,
    path = "/api/files/split",
    tag = "files",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Zip archive of chunk files", body = Vec<u8>, content_type = "application/zip"),
        (status = 400, description = "Empty file or invalid chunk size", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "split_file"))]
pub async fn split_file(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Response, HttpAppError> {
    let form = extract_multipart_text(multipart, state.config.server.max_upload_size_bytes).await?;

    let chunk_size = match form.field("chunkSize") {
        Some(raw) => raw.trim().parse::<usize>().map_err(|_| {
            AppError::InvalidInput(format!("Invalid chunk size: {}", raw))
        })?,
        None => DEFAULT_CHUNK_SIZE,
    };

    let file = UploadedFileData::new(form.file_name, form.content);
    let chunks = split_lines(&file, chunk_size)?;

    let archive = zip_chunks(&chunks).map_err(|e| {
        tracing::error!(error = %e, "Failed to create archive");
        AppError::Internal(format!("Failed to create archive: {}", e))
    })?;

    let archive_name = format!("{}_split.zip", file.stem());
    tracing::info!(file = %file.name, chunks = chunks.len(), "File split");

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/zip")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", archive_name),
        )
        .body(Body::from(archive))
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to build archive response");
            AppError::Internal(format!("Failed to build response: {}", e))
        })?;

    Ok(response)
}

#[utoipa::path(
    post,
    path = "/api/files/prefix",
    tag = "files",
    request_body = PrefixRequest,
    responses(
        (status = 200, description = "Rewritten content, one number per line", body = PrefixResponse),
        (status = 400, description = "Invalid prefix or mode", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(request), fields(operation = "prefix_lines"))]
pub async fn prefix_lines(
    ValidatedJson(request): ValidatedJson<PrefixRequest>,
) -> Result<Json<PrefixResponse>, HttpAppError> {
    request.validate()?;

    let file = UploadedFileData::new("content", request.content);
    let lines = apply_prefix(&file.lines, &request.prefix, request.mode);

    Ok(Json(PrefixResponse {
        success: true,
        data: PrefixedContent {
            line_count: lines.len(),
            content: lines.join("\n"),
        },
    }))
}
