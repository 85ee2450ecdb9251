//! cache_purge tool implementation.
//!
//! Purges cache entries by age, or all of them.

use std::time::Duration;

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use courtside_client::Courtside;

use crate::error::ToolError;
use crate::tools::json_result;

/// Parameters for the cache_purge tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeParams {
    /// Purge entries stored more than this many seconds ago.
    #[serde(default)]
    pub older_than_secs: Option<u64>,

    /// Purge every entry.
    #[serde(default)]
    pub all: bool,
}

/// Output from the cache_purge tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeOutput {
    /// Number of entries deleted.
    pub deleted: usize,
}

/// Implementation of the cache_purge tool.
pub async fn purge_impl(service: &Courtside, params: CachePurgeParams) -> Result<CallToolResult, McpError> {
    let deleted = match (params.all, params.older_than_secs) {
        (true, _) => service.cache().clear().await,
        (false, Some(secs)) => service.cache().sweep(Duration::from_secs(secs)).await,
        (false, None) => {
            return Err(ToolError::InvalidInput("one of older_than_secs or all must be specified".into()).into());
        }
    };

    tracing::info!(deleted, "purged cache entries");
    json_result(&CachePurgeOutput { deleted })
}
