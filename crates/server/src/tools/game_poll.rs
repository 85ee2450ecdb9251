//! game_poll tool implementation.
//!
//! Returns a slim live view of one game with an entity tag. When the caller
//! passes back a tag that still matches, only the tag is returned.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use courtside_client::{Courtside, Negotiation, SlimView};

use super::json_result;

/// Input parameters for the game_poll tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GamePollParams {
    /// Ten-digit game id, e.g. "0022400500".
    pub game_id: String,

    /// Entity tag from a previous poll (bare, quoted or W/"...").
    #[serde(default)]
    pub if_none_match: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PollStatus {
    Modified,
    NotModified,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct GamePollOutput {
    pub status: PollStatus,
    pub etag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<SlimView>,
    /// The view was built from a cached box score after a failed refresh.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub stale: bool,
}

/// Implementation of the game_poll tool.
pub async fn poll_impl(service: &Courtside, params: GamePollParams) -> Result<CallToolResult, McpError> {
    let outcome = service.poll(&params.game_id, params.if_none_match.as_deref()).await?;

    let output = match outcome.negotiation {
        Negotiation::NotModified { token } => {
            GamePollOutput { status: PollStatus::NotModified, etag: token, data: None, stale: outcome.stale }
        }
        Negotiation::Modified { view, token } => {
            GamePollOutput { status: PollStatus::Modified, etag: token, data: Some(view), stale: outcome.stale }
        }
    };

    json_result(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{output, service};
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_modified_then_not_modified() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/static/json/liveData/boxscore/boxscore_0022400500.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"game": {
                "gameStatusText": "Q2 3:00", "period": 2,
                "homeTeam": {"score": 40}, "awayTeam": {"score": 38}
            }})))
            .mount(&server)
            .await;

        let service = service(&server);
        let params = GamePollParams { game_id: "0022400500".into(), if_none_match: None };
        let first = output(&poll_impl(&service, params).await.unwrap());
        assert_eq!(first["status"], "modified");
        assert_eq!(first["data"]["status"]["period"], 2);
        assert_eq!(first["data"]["scores"]["home"]["score"], 40);
        assert!(first.get("stale").is_none());

        let etag = first["etag"].as_str().unwrap().to_string();
        let params = GamePollParams { game_id: "0022400500".into(), if_none_match: Some(format!("W/\"{etag}\"")) };
        let second = output(&poll_impl(&service, params).await.unwrap());
        assert_eq!(second, json!({"status": "not_modified", "etag": etag}));
    }
}
