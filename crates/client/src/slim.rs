//! Compact live-game view and conditional-request negotiation.
//!
//! The raw box score is large and changes shape between game phases.
//! [`project`] pulls out the handful of fields a poller needs, tolerating
//! missing sections and numbers sent as strings, and [`negotiate`] compares
//! the view's fingerprint against a caller-supplied validator.

use schemars::JsonSchema;
use serde::Serialize;
use serde_json::{Map, Value, json};

use courtside_core::Error;
use courtside_core::cache::{fingerprint, fingerprint_value};

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SlimView {
    pub game_id: String,
    pub status: Option<GameStatus>,
    pub scores: Option<Scores>,
    pub players: Rosters,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GameStatus {
    pub game_status_text: Option<String>,
    pub game_clock: Option<String>,
    pub period: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct Scores {
    pub home: TeamScore,
    pub away: TeamScore,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamScore {
    pub team_id: Option<u64>,
    pub tri_code: Option<String>,
    pub score: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, JsonSchema)]
pub struct Rosters {
    pub home: Vec<PlayerLine>,
    pub away: Vec<PlayerLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlayerLine {
    pub player_id: Option<u64>,
    pub jersey_num: Option<String>,
    pub name: Option<String>,
    pub pts: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oncourt: Option<bool>,
}

impl SlimView {
    /// View for a game with no usable detail yet (pregame or unknown id).
    pub fn minimal(game_id: &str) -> Self {
        Self { game_id: game_id.to_string(), status: None, scores: None, players: Rosters::default() }
    }
}

/// Project a raw live-detail document into a [`SlimView`]. Never fails.
pub fn project(game_id: &str, raw: &Value) -> SlimView {
    let game = match raw.get("game") {
        Some(Value::Object(game)) if !game.is_empty() => game,
        _ => return SlimView::minimal(game_id),
    };

    let empty = Map::new();
    let home = game.get("homeTeam").and_then(Value::as_object).unwrap_or(&empty);
    let away = game.get("awayTeam").and_then(Value::as_object).unwrap_or(&empty);

    SlimView {
        game_id: game_id.to_string(),
        status: Some(GameStatus {
            game_status_text: text(game.get("gameStatusText")),
            game_clock: text(game.get("gameClock")),
            period: period(game.get("period")),
        }),
        scores: Some(Scores { home: team_score(home), away: team_score(away) }),
        players: Rosters { home: roster(home), away: roster(away) },
    }
}

/// Fingerprint of a view, falling back to a reduced subset if the full view
/// cannot be canonicalized.
pub fn view_token(view: &SlimView) -> String {
    token_or_minimal(view, fingerprint(view))
}

fn token_or_minimal(view: &SlimView, full: Result<String, Error>) -> String {
    match full {
        Ok(token) => token,
        Err(err) => {
            tracing::warn!(game_id = %view.game_id, error = %err, "falling back to minimal fingerprint");
            fingerprint_value(&minimal_subset(view))
        }
    }
}

fn minimal_subset(view: &SlimView) -> Value {
    let scores = view.scores.as_ref();
    json!({
        "gameId": view.game_id,
        "h": scores.and_then(|s| s.home.score),
        "a": scores.and_then(|s| s.away.score),
        "p": view.status.as_ref().and_then(|s| s.period),
        "t": view.status.as_ref().and_then(|s| s.game_clock.clone()),
    })
}

/// Result of comparing a view against a caller's validator.
#[derive(Debug, Clone, PartialEq)]
pub enum Negotiation {
    NotModified { token: String },
    Modified { view: SlimView, token: String },
}

impl Negotiation {
    pub fn token(&self) -> &str {
        match self {
            Negotiation::NotModified { token } | Negotiation::Modified { token, .. } => token,
        }
    }

    pub fn is_modified(&self) -> bool {
        matches!(self, Negotiation::Modified { .. })
    }
}

pub fn negotiate(view: SlimView, validator: Option<&str>) -> Negotiation {
    let token = view_token(&view);
    match validator {
        Some(validator) if validator_matches(validator, &token) => Negotiation::NotModified { token },
        _ => Negotiation::Modified { view, token },
    }
}

/// Whether an `If-None-Match`-style validator names `token`.
///
/// Accepts the bare token, `"token"`, `W/"token"`, a comma-separated list of
/// those, or `*`.
pub fn validator_matches(validator: &str, token: &str) -> bool {
    validator.split(',').map(str::trim).filter(|v| !v.is_empty()).any(|candidate| {
        if candidate == "*" {
            return true;
        }
        let candidate = candidate.strip_prefix("W/").unwrap_or(candidate);
        let candidate = candidate.strip_prefix('"').and_then(|c| c.strip_suffix('"')).unwrap_or(candidate);
        candidate == token
    })
}

fn team_score(team: &Map<String, Value>) -> TeamScore {
    TeamScore {
        team_id: number(team.get("teamId")),
        tri_code: text(team.get("teamTricode")),
        score: number(team.get("score")),
    }
}

fn roster(team: &Map<String, Value>) -> Vec<PlayerLine> {
    let Some(players) = team.get("players").and_then(Value::as_array) else {
        return Vec::new();
    };
    players
        .iter()
        .filter_map(Value::as_object)
        .map(|player| PlayerLine {
            player_id: number(player.get("personId")),
            jersey_num: text(player.get("jerseyNum")),
            name: text(player.get("name")),
            pts: number(player.get("statistics").and_then(|s| s.get("points"))),
            oncourt: flag(player.get("oncourt")),
        })
        .collect()
}

fn period(value: Option<&Value>) -> Option<u64> {
    match value? {
        Value::Object(period) => number(period.get("current")),
        other => number(Some(other)),
    }
}

/// Non-negative integer from a number or numeric string.
fn number(value: Option<&Value>) -> Option<u64> {
    match value? {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().filter(|f| *f >= 0.0 && f.fract() == 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn flag(value: Option<&Value>) -> Option<bool> {
    match value? {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => match s.trim() {
            "1" | "true" => Some(true),
            "0" | "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}
