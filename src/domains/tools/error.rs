//! Tool-specific error types.

use rmcp::ErrorData as McpError;
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur when dispatching a tool by name.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The requested tool was not found.
    #[error("Tool not found: {0}")]
    NotFound(String),

    /// Arguments were not a JSON object.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// The security layer or argument decoding refused the call.
    #[error("Rejected: {message}")]
    Rejected {
        message: String,
        data: Option<Value>,
    },
}

impl ToolError {
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    pub fn invalid_arguments(msg: impl Into<String>) -> Self {
        Self::InvalidArguments(msg.into())
    }

    /// Structured rejection payload, if any.
    pub fn data(&self) -> Option<&Value> {
        match self {
            Self::Rejected { data, .. } => data.as_ref(),
            _ => None,
        }
    }
}

impl From<McpError> for ToolError {
    fn from(error: McpError) -> Self {
        Self::Rejected {
            message: error.message.into_owned(),
            data: error.data,
        }
    }
}

impl From<ToolError> for McpError {
    fn from(error: ToolError) -> Self {
        match error {
            ToolError::NotFound(name) => {
                McpError::invalid_params(format!("Tool not found: {}", name), None)
            }
            ToolError::InvalidArguments(msg) => McpError::invalid_params(msg, None),
            ToolError::Rejected { message, data } => McpError::invalid_params(message, data),
        }
    }
}
