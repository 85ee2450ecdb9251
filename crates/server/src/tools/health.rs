//! health tool implementation.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::Serialize;

use courtside_client::Courtside;

use super::json_result;

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct CacheHealth {
    pub entries: usize,
    pub terminal: usize,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct HealthOutput {
    pub ok: bool,
    pub cache: CacheHealth,
}

pub async fn health_impl(service: &Courtside) -> Result<CallToolResult, McpError> {
    let stats = service.cache().stats().await;
    json_result(&HealthOutput { ok: true, cache: CacheHealth { entries: stats.entries, terminal: stats.terminal } })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{output, service};
    use serde_json::json;
    use wiremock::MockServer;

    #[tokio::test]
    async fn test_health_reports_cache_stats() {
        let server = MockServer::start().await;
        let service = service(&server);
        service.cache().set("box:a", json!({}), true).await;
        service.cache().set("scoreboard:today", json!({}), false).await;

        let out = output(&health_impl(&service).await.unwrap());
        assert_eq!(out, json!({"ok": true, "cache": {"entries": 2, "terminal": 1}}));
    }
}
