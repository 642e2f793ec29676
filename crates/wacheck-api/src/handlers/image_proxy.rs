//! Profile picture pass-through for the dashboard

use axum::{extract::Query, Json};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use wacheck_core::AppError;

use crate::error::{ErrorResponse, HttpAppError};

#[derive(Debug, Deserialize, IntoParams)]
pub struct ImageProxyQuery {
    /// Image URL or `data:image/...` URL
    pub url: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageProxyResponse {
    pub success: bool,
    pub image_url: String,
}

/// Returns the URL unchanged; no bytes are fetched.
#[utoipa::path(
    get,
    path = "/api/image-proxy",
    tag = "check",
    params(ImageProxyQuery),
    responses(
        (status = 200, description = "The same URL", body = ImageProxyResponse),
        (status = 400, description = "Missing url", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(query), fields(operation = "image_proxy"))]
pub async fn image_proxy(
    Query(query): Query<ImageProxyQuery>,
) -> Result<Json<ImageProxyResponse>, HttpAppError> {
    let url = query
        .url
        .filter(|u| !u.is_empty())
        .ok_or_else(|| AppError::InvalidInput("Image URL is required".to_string()))?;

    Ok(Json(ImageProxyResponse {
        success: true,
        image_url: url,
    }))
}
