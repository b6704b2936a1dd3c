//! Error types for the tracker SDK.

use serde::{Deserialize, Serialize};

/// Result type for SDK operations.
pub type TrackerResult<T> = Result<T, TrackerError>;

/// Error types that can occur when using the tracker SDK.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server returned a non-success HTTP status.
    #[error("API error (status {status}): {message}")]
    Api {
        status: u16,
        message: String,
        details: Option<String>,
    },

    /// Server answered with a JSON-RPC error object.
    #[error("MCP error {code}: {message}")]
    Rpc {
        code: i32,
        message: String,
        data: Option<serde_json::Value>,
    },

    /// Server answered a request with neither result nor error.
    #[error("Empty response to '{0}'")]
    EmptyResponse(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl TrackerError {
    /// Whether re-sending the request could succeed.
    ///
    /// Rate limiting and gateway failures mean the server never ran the
    /// call, and a refused connection means it never arrived, so those are
    /// always safe to repeat. A timeout or a 500 may have happened after
    /// the call ran, so they are retried only when `idempotent` is set.
    /// JSON-RPC errors are answers, not transport faults, and are final.
    pub fn is_retryable(&self, idempotent: bool) -> bool {
        match self {
            Self::Api { status, .. } => match status {
                429 | 502 | 503 | 504 => true,
                500 => idempotent,
                _ => false,
            },
            Self::Http(e) if e.is_connect() => true,
            Self::Http(e) if e.is_timeout() => idempotent,
            _ => false,
        }
    }

    /// Create an API error from a status code and response body.
    pub fn from_response(status: u16, body: &str) -> Self {
        // Try to parse as ErrorResponse
        if let Ok(error_response) = serde_json::from_str::<ErrorResponse>(body) {
            Self::Api {
                status,
                message: error_response.error,
                details: error_response.details,
            }
        } else {
            Self::Api {
                status,
                message: body.to_string(),
                details: None,
            }
        }
    }
}

impl From<tracker_mcp::protocol::JsonRpcError> for TrackerError {
    fn from(err: tracker_mcp::protocol::JsonRpcError) -> Self {
        Self::Rpc {
            code: err.code,
            message: err.message,
            data: err.data,
        }
    }
}

/// Error body returned by the server for non-MCP failures.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
