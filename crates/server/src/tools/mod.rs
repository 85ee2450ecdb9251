//! MCP tool implementations.
//!
//! This module contains all tools exposed by the courtside server.

pub mod cache;
pub mod game;
pub mod game_poll;
pub mod games_batch;
pub mod health;
pub mod scoreboard;

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;

use crate::error::ToolError;

/// Render `output` as the single pretty-printed text block of a tool result.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output).map_err(|e| ToolError::Serialize(e.to_string()))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}
