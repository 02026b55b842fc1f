//! Errors produced by the emote API client.

use thiserror::Error;

use super::ErrorCategory;
use crate::traits::HttpError;

/// Failure of a single API request.
///
/// Cheap to clone so it can sit inside a
/// [`FetchState::Failure`](crate::fetch_state::FetchState::Failure).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request never produced a response.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// The server rejected the credentials (HTTP 401).
    #[error("unauthorized")]
    Unauthorized,

    /// Any other non-2xx status.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The body was not the expected JSON.
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Build the error for a non-2xx response.
    pub fn from_status(status: u16, body: &str) -> Self {
        if status == 401 {
            return ApiError::Unauthorized;
        }
        let message = body.trim();
        let message = if message.is_empty() {
            "no response body".to_string()
        } else {
            message.chars().take(200).collect()
        };
        ApiError::Status { status, message }
    }

    /// Classify the error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            ApiError::Http(_) => ErrorCategory::Network,
            ApiError::Unauthorized => ErrorCategory::Auth,
            ApiError::Status { status, .. } if *status >= 500 || *status == 429 => {
                ErrorCategory::Server
            }
            ApiError::Status { status: 403, .. } => ErrorCategory::Auth,
            ApiError::Status { .. } | ApiError::Decode(_) => ErrorCategory::Client,
        }
    }

    /// Check if the request is worth repeating as-is.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Http(HttpError::InvalidUrl(_)) => false,
            ApiError::Status { status: 408, .. } => true,
            other => other.category().is_retryable(),
        }
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Http(HttpError::Timeout(_)) => {
                "The server took too long to respond. Please try again.".to_string()
            }
            ApiError::Http(HttpError::InvalidUrl(url)) => {
                format!("The configured API address is invalid: {}", url)
            }
            ApiError::Http(_) => {
                "Unable to connect to the server. Please check your internet connection."
                    .to_string()
            }
            ApiError::Unauthorized => "Authentication required. Please sign in again.".to_string(),
            ApiError::Status { status, .. } => match *status {
                403 => "Access denied. You don't have permission for this action.".to_string(),
                404 => "The requested resource was not found.".to_string(),
                429 => "Too many requests. Please wait a moment and try again.".to_string(),
                500..=599 => {
                    "The server is experiencing issues. Please try again later.".to_string()
                }
                _ => format!(
                    "The server returned an error (HTTP {}). Please try again.",
                    status
                ),
            },
            ApiError::Decode(_) => {
                "Received an invalid response from the server. Please try again.".to_string()
            }
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Http(HttpError::Timeout(_)) => "E_NET_TIMEOUT",
            ApiError::Http(HttpError::ConnectionFailed(_)) => "E_NET_CONN",
            ApiError::Http(_) => "E_NET_OTHER",
            ApiError::Unauthorized => "E_AUTH_UNAUTHORIZED",
            ApiError::Status { .. } => "E_NET_HTTP",
            ApiError::Decode(_) => "E_NET_DECODE",
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}
