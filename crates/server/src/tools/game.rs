//! game_boxscore and game_pbp tool implementations.
//!
//! Return the raw upstream document for one game, falling back to the last
//! cached copy when the CDN is failing.

use std::sync::Arc;

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use courtside_client::Courtside;
use courtside_core::ResourceClass;

use super::json_result;

/// Input parameters for the per-game tools.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GameParams {
    /// Ten-digit game id, e.g. "0022400500".
    pub game_id: String,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GameOutput {
    pub game_id: String,
    #[schemars(with = "Value")]
    pub data: Arc<Value>,
    pub from_cache: bool,
    pub stale: bool,
}

pub async fn boxscore_impl(service: &Courtside, params: GameParams) -> Result<CallToolResult, McpError> {
    game_impl(service, ResourceClass::LiveDetail, params).await
}

pub async fn pbp_impl(service: &Courtside, params: GameParams) -> Result<CallToolResult, McpError> {
    game_impl(service, ResourceClass::EventLog, params).await
}

async fn game_impl(service: &Courtside, class: ResourceClass, params: GameParams) -> Result<CallToolResult, McpError> {
    let resolved = service.resource_or_last_known(class, &params.game_id).await?;
    json_result(&GameOutput {
        game_id: params.game_id.trim().to_string(),
        data: resolved.value,
        from_cache: resolved.from_cache,
        stale: resolved.stale,
    })
}
