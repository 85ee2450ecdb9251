//! Resource classes and the cache keys derived from them.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A category of upstream document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ResourceClass {
    /// Today's live scoreboard.
    Scoreboard,
    /// Per-game box score.
    #[serde(alias = "boxscore", alias = "box")]
    LiveDetail,
    /// Per-game play-by-play log.
    #[serde(alias = "pbp", alias = "playbyplay")]
    EventLog,
    /// Versioned season schedule.
    Schedule,
}

impl ResourceClass {
    /// Short tag used as the key prefix.
    pub fn tag(self) -> &'static str {
        match self {
            ResourceClass::Scoreboard => "scoreboard",
            ResourceClass::LiveDetail => "box",
            ResourceClass::EventLog => "pbp",
            ResourceClass::Schedule => "schedule",
        }
    }

    /// Whether fetched values of this class are inspected for a finished state.
    pub fn tracks_terminal(self) -> bool {
        matches!(self, ResourceClass::LiveDetail)
    }
}

impl fmt::Display for ResourceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Cache key addressing a single upstream resource.
///
/// Built only through the constructors here so every request path
/// (single fetch, batch, slim poll) lands on the same entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceKey(String);

impl ResourceKey {
    pub fn new(class: ResourceClass, id: &str) -> Self {
        Self(format!("{}:{}", class.tag(), id.trim()))
    }

    pub fn scoreboard() -> Self {
        Self::new(ResourceClass::Scoreboard, "today")
    }

    pub fn schedule() -> Self {
        Self::new(ResourceClass::Schedule, "json")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ResourceKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
