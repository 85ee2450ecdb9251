//! games_batch tool implementation.
//!
//! Fetches box scores or play-by-play logs for many games at once with
//! bounded concurrency. Per-game failures are reported in place.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use courtside_client::Courtside;
use courtside_core::ResourceClass;

use super::json_result;
use crate::error::ToolError;

/// Input parameters for the games_batch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GamesBatchParams {
    /// Game ids to fetch (at most the configured batch limit, default 30).
    pub game_ids: Vec<String>,

    /// "boxscore" (default) or "pbp".
    #[serde(default = "default_resource")]
    pub resource: ResourceClass,
}

fn default_resource() -> ResourceClass {
    ResourceClass::LiveDetail
}

/// Implementation of the games_batch tool.
pub async fn games_batch_impl(service: &Courtside, params: GamesBatchParams) -> Result<CallToolResult, McpError> {
    if !matches!(params.resource, ResourceClass::LiveDetail | ResourceClass::EventLog) {
        return Err(ToolError::InvalidInput(format!("resource must be boxscore or pbp, got {}", params.resource)).into());
    }

    let outcome = service.fetch_many(params.resource, &params.game_ids).await?;
    json_result(&outcome)
}
