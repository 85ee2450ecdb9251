//! scoreboard tool implementation.
//!
//! Without a date, returns today's live scoreboard. With a date, returns the
//! game ids the season schedule lists around that day.

use std::sync::Arc;

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use courtside_client::{Courtside, parse_iso_date};

use super::json_result;

/// Input parameters for the scoreboard tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ScoreboardParams {
    /// Calendar date as YYYY-MM-DD. Omit for today's live scoreboard.
    #[serde(default)]
    pub date: Option<String>,
}

/// Today's scoreboard.
#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LiveScoreboardOutput {
    #[schemars(with = "Value")]
    pub data: Arc<Value>,
    pub from_cache: bool,
    /// Refresh failed and the last known scoreboard was served.
    pub stale: bool,
}

/// Game ids scheduled around a date.
#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DateScoreboardOutput {
    pub date: String,
    pub game_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule_version: Option<u32>,
    /// Refresh failed and the last resolved schedule was used.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub stale: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Implementation of the scoreboard tool.
pub async fn scoreboard_impl(service: &Courtside, params: ScoreboardParams) -> Result<CallToolResult, McpError> {
    let Some(date) = params.date.filter(|d| !d.trim().is_empty()) else {
        let resolved = service.scoreboard_today().await?;
        return json_result(&LiveScoreboardOutput {
            data: resolved.value,
            from_cache: resolved.from_cache,
            stale: resolved.stale,
        });
    };

    let day = parse_iso_date(&date)?;
    let output = match service.game_ids_for_date(day).await {
        Ok(games) => DateScoreboardOutput {
            date: games.date.to_string(),
            game_ids: games.game_ids,
            schedule_version: Some(games.schedule_version),
            stale: games.stale,
            error: None,
        },
        Err(err) => {
            tracing::warn!(date = %day, error = %err, "schedule lookup failed");
            DateScoreboardOutput {
                date: day.to_string(),
                game_ids: Vec::new(),
                schedule_version: None,
                stale: false,
                error: Some(err.to_string()),
            }
        }
    };

    json_result(&output)
}
