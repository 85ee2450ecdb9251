//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.

use std::sync::Arc;

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

use courtside_client::Courtside;

use crate::tools::{
    cache::{CacheGetParams, CachePurgeParams, get_impl, purge_impl},
    game::{GameParams, boxscore_impl, pbp_impl},
    game_poll::{GamePollParams, poll_impl},
    games_batch::{GamesBatchParams, games_batch_impl},
    health::health_impl,
    scoreboard::{ScoreboardParams, scoreboard_impl},
};

/// The main MCP server handler for courtside.
#[derive(Clone)]
pub struct CourtsideServer {
    service: Arc<Courtside>,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl CourtsideServer {
    /// Create a new server handler around a shared service.
    pub fn new(service: Arc<Courtside>) -> Self {
        Self { service, tool_router: Self::tool_router() }
    }

    #[tool(
        description = "Today's live scoreboard, or the game ids scheduled around a YYYY-MM-DD date (one day either side)."
    )]
    async fn scoreboard(&self, params: Parameters<ScoreboardParams>) -> Result<CallToolResult, McpError> {
        scoreboard_impl(&self.service, params.0).await
    }

    #[tool(description = "Raw box score for one game. Finished games are served from cache for up to an hour.")]
    async fn game_boxscore(&self, params: Parameters<GameParams>) -> Result<CallToolResult, McpError> {
        boxscore_impl(&self.service, params.0).await
    }

    #[tool(description = "Raw play-by-play log for one game.")]
    async fn game_pbp(&self, params: Parameters<GameParams>) -> Result<CallToolResult, McpError> {
        pbp_impl(&self.service, params.0).await
    }

    /// Fetch many games concurrently.
    ///
    /// Results come back in input order; failed games carry an error instead of a value.
    #[tool(description = "Fetch box scores or play-by-play for many games concurrently. Per-game errors are reported in place.")]
    async fn games_batch(&self, params: Parameters<GamesBatchParams>) -> Result<CallToolResult, McpError> {
        games_batch_impl(&self.service, params.0).await
    }

    #[tool(
        description = "Compact live view (status, scores, player points) with an etag. Pass the etag back as if_none_match to get not_modified when nothing changed."
    )]
    async fn game_poll(&self, params: Parameters<GamePollParams>) -> Result<CallToolResult, McpError> {
        poll_impl(&self.service, params.0).await
    }

    #[tool(description = "Inspect a cached entry (value, age, fetch time, terminal flag) without contacting upstream.")]
    async fn cache_get(&self, params: Parameters<CacheGetParams>) -> Result<CallToolResult, McpError> {
        get_impl(&self.service, params.0).await
    }

    #[tool(description = "Purge cached entries older than a number of seconds, or all entries.")]
    async fn cache_purge(&self, params: Parameters<CachePurgeParams>) -> Result<CallToolResult, McpError> {
        purge_impl(&self.service, params.0).await
    }

    #[tool(description = "Liveness check with cache entry counts.")]
    async fn health(&self) -> Result<CallToolResult, McpError> {
        health_impl(&self.service).await
    }
}

impl ServerHandler for CourtsideServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "courtside".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(
                "Cached access to live basketball scoreboards, box scores and play-by-play. \
                 Use game_poll with if_none_match for cheap repeated polling."
                    .into(),
            ),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::service;
    use wiremock::MockServer;

    #[tokio::test]
    async fn test_registers_every_tool() {
        let server = MockServer::start().await;
        let handler = CourtsideServer::new(Arc::new(service(&server)));

        let mut names: Vec<String> = handler.tool_router.list_all().into_iter().map(|t| t.name.to_string()).collect();
        names.sort();
        assert_eq!(
            names,
            vec!["cache_get", "cache_purge", "game_boxscore", "game_pbp", "game_poll", "games_batch", "health", "scoreboard"]
        );
    }

    #[tokio::test]
    async fn test_server_info() {
        let server = MockServer::start().await;
        let info = CourtsideServer::new(Arc::new(service(&server))).get_info();
        assert_eq!(info.server_info.name, "courtside");
        assert!(info.capabilities.tools.is_some());
    }
}
