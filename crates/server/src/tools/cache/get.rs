//! cache_get tool implementation.
//!
//! Returns the cached entry for a resource without contacting upstream.

use std::sync::Arc;

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use courtside_client::{Courtside, Gateway};
use courtside_core::{Error, ResourceClass};

use crate::tools::json_result;

/// Parameters for the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetParams {
    /// Resource class: "scoreboard", "boxscore", "pbp" or "schedule".
    pub resource: ResourceClass,

    /// Game id, required for "boxscore" and "pbp".
    #[serde(default)]
    pub game_id: Option<String>,
}

/// Output from the cache_get tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CacheGetOutput {
    pub key: String,
    #[schemars(with = "Value")]
    pub value: Arc<Value>,
    /// Seconds since the entry was stored.
    pub age_secs: f64,
    /// RFC 3339 time the entry was fetched.
    pub fetched_at: String,
    pub terminal: bool,
}

/// Implementation of the cache_get tool.
pub async fn get_impl(service: &Courtside, params: CacheGetParams) -> Result<CallToolResult, McpError> {
    let key = Gateway::key_for(params.resource, params.game_id.as_deref().unwrap_or_default())?;

    let entry = service
        .cache()
        .lookup(key.as_str())
        .await
        .ok_or_else(|| Error::CacheMiss(key.to_string()))?;

    json_result(&CacheGetOutput {
        key: key.to_string(),
        value: entry.value,
        age_secs: entry.age.as_secs_f64(),
        fetched_at: entry.fetched_at.to_rfc3339(),
        terminal: entry.terminal,
    })
}
