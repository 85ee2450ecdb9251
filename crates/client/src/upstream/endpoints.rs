//! Upstream URL catalogue.

use courtside_core::{Error, ResourceClass};

/// Error type for base URL validation failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Builds CDN URLs for each resource class.
#[derive(Debug, Clone)]
pub struct Endpoints {
    base: String,
}

impl Endpoints {
    /// Validate `base_url` and build the catalogue.
    ///
    /// Normalization steps:
    /// 1. Trim whitespace
    /// 2. Require http or https
    /// 3. Lowercase the host, drop query and fragment
    /// 4. Strip trailing slashes
    pub fn new(base_url: &str) -> Result<Self, UrlError> {
        let trimmed = base_url.trim();
        if trimmed.is_empty() {
            return Err(UrlError::Empty);
        }

        let mut parsed = url::Url::parse(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

        match parsed.scheme() {
            "http" | "https" => {}
            scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
        }

        if let Some(host) = parsed.host_str() {
            let host = host.to_lowercase();
            parsed
                .set_host(Some(&host))
                .map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
        }
        parsed.set_query(None);
        parsed.set_fragment(None);

        Ok(Self { base: parsed.as_str().trim_end_matches('/').to_string() })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn scoreboard_today(&self) -> String {
        format!("{}/static/json/liveData/scoreboard/todaysScoreboard_00.json", self.base)
    }

    pub fn live_detail(&self, id: &str) -> String {
        format!("{}/static/json/liveData/boxscore/boxscore_{id}.json", self.base)
    }

    pub fn event_log(&self, id: &str) -> String {
        format!("{}/static/json/liveData/playbyplay/playbyplay_{id}.json", self.base)
    }

    pub fn schedule(&self, version: u32) -> String {
        format!("{}/static/json/staticData/scheduleLeagueV2_{version}.json", self.base)
    }

    /// URL for a resource class and id.
    ///
    /// The scoreboard ignores `id`; the schedule needs a version and is
    /// resolved by [`crate::schedule::ScheduleResolver`] instead.
    pub fn resource(&self, class: ResourceClass, id: &str) -> Result<String, Error> {
        match class {
            ResourceClass::Scoreboard => Ok(self.scoreboard_today()),
            ResourceClass::LiveDetail => Ok(self.live_detail(validate_resource_id(id)?)),
            ResourceClass::EventLog => Ok(self.event_log(validate_resource_id(id)?)),
            ResourceClass::Schedule => {
                Err(Error::InvalidInput("schedule documents are resolved by version, not id".into()))
            }
        }
    }
}

/// Check that `id` is safe to splice into a URL path.
///
/// Accepts ASCII alphanumerics, `-` and `_`; surrounding whitespace is trimmed.
pub fn validate_resource_id(id: &str) -> Result<&str, Error> {
    let id = id.trim();
    if id.is_empty() {
        return Err(Error::InvalidInput("game id cannot be empty".into()));
    }
    if id.len() > 32 {
        return Err(Error::InvalidInput(format!("game id too long: {} chars", id.len())));
    }
    if !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err(Error::InvalidInput(format!("invalid game id: {id:?}")));
    }
    Ok(id)
}
