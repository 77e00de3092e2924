//! Error types for the Pemilu API client

use thiserror::Error;

/// Main error type for client operations
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level failure (connection refused, DNS, TLS, timeout)
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-2xx response other than 401
    #[error("{message}")]
    Http { status: u16, message: String },

    /// 401 response. The local session has already been cleared; the host
    /// application should navigate to `redirect_to`.
    #[error("Unauthorized - Session expired")]
    SessionExpired { redirect_to: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid header: {0}")]
    InvalidHeader(String),
}

impl ClientError {
    /// True when the call failed because the session expired (HTTP 401)
    pub fn is_session_expired(&self) -> bool {
        matches!(self, ClientError::SessionExpired { .. })
    }

    /// HTTP status code carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            ClientError::SessionExpired { .. } => Some(401),
            ClientError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;
