use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Lifecycle status of the messaging session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Disconnected,
    Initializing,
    QrReady,
    Connected,
    Error,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Disconnected => "disconnected",
            SessionStatus::Initializing => "initializing",
            SessionStatus::QrReady => "qr_ready",
            SessionStatus::Connected => "connected",
            SessionStatus::Error => "error",
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, SessionStatus::Connected)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The paired account, when connected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    pub name: String,
    pub number: String,
    pub device: String,
    pub platform: String,
    pub connected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub status: SessionStatus,
    pub qr_code: Option<String>,
    pub connected: bool,
    pub account_info: Option<AccountInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QrResponse {
    pub qr_code: Option<String>,
    /// `ready` when a QR code is available, otherwise the session status
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_value(SessionStatus::QrReady).unwrap(),
            "qr_ready"
        );
        assert_eq!(SessionStatus::Connected.to_string(), "connected");
        assert!(!SessionStatus::Initializing.is_connected());
    }
}
