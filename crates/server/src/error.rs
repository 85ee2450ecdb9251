//! Structured errors raised by the tool layer itself.
//!
//! Errors from the cache and upstream layers arrive as `courtside_core::Error`
//! and carry their own codes.

use rmcp::model::{ErrorCode, ErrorData as McpError};

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// A parameter combination the tool cannot serve.
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Tool output could not be rendered as JSON.
    #[error("SERIALIZE_FAILED: {0}")]
    Serialize(String),
}

impl From<ToolError> for McpError {
    fn from(err: ToolError) -> Self {
        let code = match &err {
            ToolError::InvalidInput(_) => -32602,
            ToolError::Serialize(_) => -32603,
        };

        McpError { code: ErrorCode(code), message: err.to_string().into(), data: None }
    }
}
