//! Error types for server access

use thiserror::Error;

/// Errors from talking to the platform server
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    /// Request could not be sent or the connection failed
    #[error("network error: {0}")]
    Network(String),

    /// Server rejected the credentials
    #[error("not signed in or session expired")]
    Unauthorized,

    /// Signed in but not allowed to do this
    #[error("access denied: {0}")]
    Forbidden(String),

    /// Any other non-success response
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Response body was not what we expected
    #[error("could not decode response: {0}")]
    Decode(String),

    /// Base URL or path could not be turned into a URL
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// Operational modules failed validation
    #[error(transparent)]
    Modules(#[from] rx_core::RxError),

    /// Background refresh task did not complete
    #[error("status refresh did not complete: {0}")]
    Refresh(String),
}

impl ClientError {
    /// Short message suitable for showing to the user as-is
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Network(_) => {
                "Could not reach the server. Check the base URL and your connection.".to_string()
            }
            ClientError::Unauthorized => "Sign in again; the auth token was rejected.".to_string(),
            ClientError::Forbidden(_) => "You are not allowed to start exports.".to_string(),
            ClientError::Server { message, .. } if !message.trim().is_empty() => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

/// Result type alias for server access
pub type Result<T> = std::result::Result<T, ClientError>;
