use wacheck_core::AppError;

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("Bridge request timed out: {0}")]
    Timeout(String),

    #[error("Connection refused by bridge: {0}")]
    ConnectionRefused(String),

    #[error("Bridge rejected credentials: {0}")]
    Unauthorized(String),

    #[error("Bridge returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid bridge response: {0}")]
    InvalidResponse(String),

    #[error("Bridge configuration error: {0}")]
    Config(String),

    #[error("Bridge request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for BridgeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BridgeError::Timeout(err.to_string())
        } else if err.is_connect() {
            BridgeError::ConnectionRefused(err.to_string())
        } else if err.is_decode() {
            BridgeError::InvalidResponse(err.to_string())
        } else {
            BridgeError::Request(err.to_string())
        }
    }
}

impl From<BridgeError> for AppError {
    fn from(err: BridgeError) -> Self {
        AppError::Bridge(err.to_string())
    }
}
