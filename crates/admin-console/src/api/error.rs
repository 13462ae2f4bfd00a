//! API client error types.

use reqwest::StatusCode;
use thiserror::Error;

/// Result type for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors that can occur while talking to the backend.
///
/// The console tells apart a backend that could not be reached (`Client`,
/// `Connection`, `Decode`) from one that answered with a failure: `Server`
/// carries the message from its JSON body, `Unexpected` had no JSON body.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP client could not be constructed.
    #[error("Failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Request never completed (refused, reset, timed out).
    #[error("Failed to connect to {url}: {source}")]
    Connection {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Backend answered with a non-OK status.
    #[error("Server error ({status}): {message}")]
    Server { status: StatusCode, message: String },

    /// Backend answered with a non-OK status and a body that is not JSON,
    /// e.g. a plain-text 403 from an access check.
    #[error("Unexpected response ({status})")]
    Unexpected { status: StatusCode },

    /// Backend answered with a body that does not match the contract.
    #[error("Failed to parse response: {0}")]
    Decode(String),
}

impl ApiError {
    /// The backend's own message, when the failure was reported by it.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Server { message, .. } if !message.is_empty() => Some(message),
            _ => None,
        }
    }

    pub fn is_connection(&self) -> bool {
        matches!(
            self,
            Self::Client(_) | Self::Connection { .. } | Self::Decode(_)
        )
    }
}
