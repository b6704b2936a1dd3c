// Error types for tool registration and dispatch

use crate::protocol::{error_codes, JsonRpcError};
use thiserror::Error;
use tracker_core::DataIntegrityError;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Structural faults raised by the registry and dispatcher.
///
/// Business "no result" outcomes (unknown project, empty search) are not
/// errors; handlers return them as ordinary text.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("unknown tool: {0}")]
    UnknownOperation(String),

    #[error("tool already registered: {0}")]
    DuplicateOperation(String),

    #[error("tool '{operation}' is missing required argument '{parameter}'")]
    MissingArgument { operation: String, parameter: String },

    #[error("tool '{operation}' argument '{parameter}' must be {expected}")]
    ArgumentType {
        operation: String,
        parameter: String,
        expected: String,
    },

    #[error("tool '{operation}' failed: {source}")]
    HandlerExecution {
        operation: String,
        #[source]
        source: BoxError,
    },

    #[error("tool '{operation}' found malformed data: {source}")]
    DataIntegrity {
        operation: String,
        #[source]
        source: DataIntegrityError,
    },
}

impl ToolError {
    /// JSON-RPC error code used when this fault reaches the transport
    pub fn code(&self) -> i32 {
        match self {
            Self::UnknownOperation(_)
            | Self::MissingArgument { .. }
            | Self::ArgumentType { .. } => error_codes::INVALID_PARAMS,
            Self::DuplicateOperation(_)
            | Self::HandlerExecution { .. }
            | Self::DataIntegrity { .. } => error_codes::INTERNAL_ERROR,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::UnknownOperation(_) => "unknown_operation",
            Self::DuplicateOperation(_) => "duplicate_operation",
            Self::MissingArgument { .. } => "missing_argument",
            Self::ArgumentType { .. } => "argument_type",
            Self::HandlerExecution { .. } => "handler_execution",
            Self::DataIntegrity { .. } => "data_integrity",
        }
    }
}

impl From<&ToolError> for JsonRpcError {
    fn from(err: &ToolError) -> Self {
        JsonRpcError::custom(err.code(), err.to_string())
            .with_data(serde_json::json!({ "kind": err.kind() }))
    }
}
