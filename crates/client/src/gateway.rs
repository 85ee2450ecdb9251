//! Cache-aware fetch path shared by direct, batch and polling requests.
//!
//! Every resource goes through [`Gateway::fetch`]: consult the cache,
//! fetch on miss, detect terminal state, store. Entries marked terminal are
//! served for the extended terminal TTL instead of their class TTL.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use courtside_core::{AppConfig, Error, ResourceClass, ResourceKey, TtlCache};

use crate::upstream::{Endpoints, UpstreamClient, validate_resource_id};

/// Result of a gateway fetch.
#[derive(Debug, Clone)]
pub struct Fetched {
    pub value: Arc<Value>,
    /// Served from cache without contacting upstream.
    pub from_cache: bool,
    /// The stored entry represents a finished game.
    pub terminal: bool,
}

/// Freshness policy for the gateway.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub scoreboard_ttl: Duration,
    pub live_detail_ttl: Duration,
    pub event_log_ttl: Duration,
    pub schedule_ttl: Duration,
    pub terminal_ttl: Duration,
    /// Status text that marks a finished game (compared case-insensitively).
    pub final_marker: String,
}

impl GatewayConfig {
    pub fn ttl_for(&self, class: ResourceClass) -> Duration {
        match class {
            ResourceClass::Scoreboard => self.scoreboard_ttl,
            ResourceClass::LiveDetail => self.live_detail_ttl,
            ResourceClass::EventLog => self.event_log_ttl,
            ResourceClass::Schedule => self.schedule_ttl,
        }
    }
}

impl From<&AppConfig> for GatewayConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            scoreboard_ttl: config.ttl_for(ResourceClass::Scoreboard),
            live_detail_ttl: config.ttl_for(ResourceClass::LiveDetail),
            event_log_ttl: config.ttl_for(ResourceClass::EventLog),
            schedule_ttl: config.ttl_for(ResourceClass::Schedule),
            terminal_ttl: config.terminal_ttl(),
            final_marker: config.final_status_marker.clone(),
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

/// Upstream fetches with cache short-circuiting and terminal promotion.
#[derive(Debug, Clone)]
pub struct Gateway {
    cache: TtlCache,
    upstream: UpstreamClient,
    endpoints: Endpoints,
    config: GatewayConfig,
}

impl Gateway {
    pub fn new(cache: TtlCache, upstream: UpstreamClient, endpoints: Endpoints, config: GatewayConfig) -> Self {
        Self { cache, upstream, endpoints, config }
    }

    /// Fetch `url` through the cache under `key`.
    ///
    /// A cached entry younger than `ttl` (or the terminal TTL, for entries
    /// marked terminal) is returned without contacting upstream. Upstream
    /// failures are returned as [`Error::Upstream`] and leave the cache as is.
    pub async fn fetch(
        &self, key: &ResourceKey, url: &str, ttl: Duration, track_terminal: bool,
    ) -> Result<Fetched, Error> {
        if let Some(entry) = self.cache.lookup(key.as_str()).await {
            let effective = if entry.terminal { self.config.terminal_ttl } else { ttl };
            if entry.is_fresh(effective) {
                tracing::debug!(key = %key, age_ms = entry.age.as_millis() as u64, terminal = entry.terminal, "cache hit");
                return Ok(Fetched { value: entry.value, from_cache: true, terminal: entry.terminal });
            }
        }

        tracing::debug!(key = %key, "cache miss, fetching {}", url);
        let value = self.upstream.get_json(url).await.map_err(|e| e.for_key(key))?;

        let terminal = track_terminal && is_terminal(&value, &self.config.final_marker);
        if terminal {
            tracing::debug!(key = %key, "marking entry terminal");
        }

        let value = Arc::new(value);
        self.cache.set(key.as_str(), Arc::clone(&value), terminal).await;

        Ok(Fetched { value, from_cache: false, terminal })
    }

    /// Fetch a resource by class and id with the class TTL.
    pub async fn fetch_resource(&self, class: ResourceClass, id: &str) -> Result<Fetched, Error> {
        self.fetch_resource_with_ttl(class, id, self.config.ttl_for(class)).await
    }

    /// Fetch a resource by class and id with an explicit TTL.
    pub async fn fetch_resource_with_ttl(
        &self, class: ResourceClass, id: &str, ttl: Duration,
    ) -> Result<Fetched, Error> {
        let (key, url) = self.locate(class, id)?;
        self.fetch(&key, &url, ttl, class.tracks_terminal()).await
    }

    /// Last stored value for a resource, however old.
    pub async fn last_known(&self, class: ResourceClass, id: &str) -> Result<Option<Arc<Value>>, Error> {
        let key = Self::key_for(class, id)?;
        Ok(self.cache.peek(key.as_str()).await)
    }

    /// Cache key for a resource, validating the id where one is used.
    pub fn key_for(class: ResourceClass, id: &str) -> Result<ResourceKey, Error> {
        match class {
            ResourceClass::Scoreboard => Ok(ResourceKey::scoreboard()),
            ResourceClass::Schedule => Ok(ResourceKey::schedule()),
            ResourceClass::LiveDetail | ResourceClass::EventLog => {
                Ok(ResourceKey::new(class, validate_resource_id(id)?))
            }
        }
    }

    fn locate(&self, class: ResourceClass, id: &str) -> Result<(ResourceKey, String), Error> {
        let key = Self::key_for(class, id)?;
        let url = self.endpoints.resource(class, id)?;
        Ok((key, url))
    }

    pub fn cache(&self) -> &TtlCache {
        &self.cache
    }

    pub fn upstream(&self) -> &UpstreamClient {
        &self.upstream
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Whether a live-detail document describes a finished game.
pub fn is_terminal(value: &Value, marker: &str) -> bool {
    value
        .pointer("/game/gameStatusText")
        .and_then(Value::as_str)
        .is_some_and(|status| status.trim().eq_ignore_ascii_case(marker.trim()))
}
