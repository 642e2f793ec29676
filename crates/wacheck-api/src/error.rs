//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`. Anything that
//! converts into `AppError` converts into `HttpAppError` and renders as
//! `{success:false, error, code, recoverable, ...}`.

use axum::{
    extract::rejection::JsonRejection,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Serialize};
use utoipa::ToSchema;
use wacheck_core::{AppError, ErrorMetadata, ListParseError, LogLevel};
use wacheck_services::SessionError;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Always false
    pub success: bool,
    pub error: String,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Whether this error is recoverable (can be retried)
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
    /// Current session status, for session errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl ErrorResponse {
    fn from_app_error(app_error: &AppError, show_details: bool) -> Self {
        Self {
            success: false,
            error: app_error.client_message(),
            code: app_error.error_code().to_string(),
            recoverable: app_error.is_recoverable(),
            details: show_details.then(|| app_error.detailed_message()),
            error_type: show_details.then(|| app_error.error_type().to_string()),
            suggested_action: app_error.suggested_action().map(String::from),
            status: app_error.session_status().map(String::from),
        }
    }
}

/// Wrapper type for AppError to implement IntoResponse
/// This is necessary because of Rust's orphan rules - we can't implement
/// IntoResponse (external trait) for AppError (external type from wacheck-core)
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

impl From<SessionError> for HttpAppError {
    fn from(err: SessionError) -> Self {
        HttpAppError(err.into())
    }
}

impl From<ListParseError> for HttpAppError {
    fn from(err: ListParseError) -> Self {
        HttpAppError(err.into())
    }
}

impl From<validator::ValidationErrors> for HttpAppError {
    fn from(err: validator::ValidationErrors) -> Self {
        HttpAppError(err.into())
    }
}

/// Convert JSON body deserialization failures into a 400 with our ErrorResponse format.
impl From<JsonRejection> for HttpAppError {
    fn from(rejection: JsonRejection) -> Self {
        HttpAppError(AppError::InvalidInput(format!(
            "Invalid request body: {}",
            rejection.body_text()
        )))
    }
}

/// JSON body extractor that returns our ErrorResponse format (400 + JSON) on deserialization failure.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = HttpAppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(inner) = Json::<T>::from_request(req, state)
            .await
            .map_err(HttpAppError::from)?;
        Ok(ValidatedJson(inner))
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Error occurred");
        }
    }
}

fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .map(|env| env.to_lowercase() == "production" || env.to_lowercase() == "prod")
        .unwrap_or(false)
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        // Details are hidden in production and for sensitive errors
        let show_details = !is_production_env() && !app_error.is_sensitive();
        let body = ErrorResponse::from_app_error(app_error, show_details);

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wacheck_core::models::SessionStatus;

    #[test]
    fn test_from_session_error_not_connected() {
        let HttpAppError(app_err) = SessionError::NotConnected(SessionStatus::QrReady).into();
        match app_err {
            AppError::SessionNotConnected { status } => assert_eq!(status, "qr_ready"),
            _ => panic!("Expected SessionNotConnected variant"),
        }
    }

    #[test]
    fn test_from_list_parse_error() {
        let HttpAppError(app_err) = ListParseError::EmptyFile.into();
        assert_eq!(app_err.http_status_code(), 400);
    }

    #[test]
    fn test_error_response_shape() {
        let err = AppError::SessionNotConnected {
            status: "initializing".to_string(),
        };
        let json = serde_json::to_value(ErrorResponse::from_app_error(&err, false)).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["code"], "SESSION_NOT_CONNECTED");
        assert_eq!(json["status"], "initializing");
        assert_eq!(json["recoverable"], true);
        assert!(json.get("details").is_none());
        assert!(json.get("errorType").is_none());
    }

    #[test]
    fn test_error_response_details_when_allowed() {
        let err = AppError::InvalidInput("Phone number must start with +".to_string());
        let json = serde_json::to_value(ErrorResponse::from_app_error(&err, true)).unwrap();
        assert_eq!(json["errorType"], "InvalidInput");
        assert!(json["details"].as_str().unwrap().contains("start with +"));
        assert!(json.get("status").is_none());
    }
}
