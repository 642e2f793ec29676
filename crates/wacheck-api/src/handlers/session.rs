//! Session status, QR code, restart and disconnect

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;
use wacheck_core::models::{QrResponse, SessionStatus, StatusResponse};

use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct RestartResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DisconnectResponse {
    pub success: bool,
    pub message: String,
    pub status: SessionStatus,
}

/// Current session status, with the QR payload and paired account when available
#[utoipa::path(
    get,
    path = "/api/status",
    tag = "session",
    responses(
        (status = 200, description = "Session status", body = StatusResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "get_status"))]
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let snapshot = state.session.snapshot();
    let connected = snapshot.status.is_connected();
    let account_info = if connected {
        state.session.account_info().await
    } else {
        None
    };

    Json(StatusResponse {
        status: snapshot.status,
        qr_code: snapshot.qr_code,
        connected,
        account_info,
    })
}

/// QR code to pair the session
#[utoipa::path(
    get,
    path = "/api/qr",
    tag = "session",
    responses(
        (status = 200, description = "QR code, or null with the current status", body = QrResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "get_qr"))]
pub async fn get_qr(State(state): State<Arc<AppState>>) -> Json<QrResponse> {
    let response = match state.session.qr_code() {
        Some(qr) => QrResponse {
            qr_code: Some(qr),
            status: "ready".to_string(),
        },
        None => QrResponse {
            qr_code: None,
            status: state.session.status().to_string(),
        },
    };
    Json(response)
}

#[utoipa::path(
    post,
    path = "/api/restart",
    tag = "session",
    responses(
        (status = 200, description = "Client closed; a new one is created shortly", body = RestartResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "restart"))]
pub async fn restart(State(state): State<Arc<AppState>>) -> Json<RestartResponse> {
    state.session.restart().await;
    Json(RestartResponse {
        success: true,
        message: "WhatsApp client restarted successfully".to_string(),
    })
}

#[utoipa::path(
    post,
    path = "/api/disconnect",
    tag = "session",
    responses(
        (status = 200, description = "Client closed", body = DisconnectResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "disconnect"))]
pub async fn disconnect(State(state): State<Arc<AppState>>) -> Json<DisconnectResponse> {
    let status = state.session.disconnect().await;
    Json(DisconnectResponse {
        success: true,
        message: "WhatsApp client disconnected successfully".to_string(),
        status,
    })
}
