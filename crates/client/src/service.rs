//! Facade wiring the gateway, schedule resolver and batch coordinator
//! around one shared cache.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use serde_json::Value;

use courtside_core::{AppConfig, Error, ResourceClass, TtlCache};

use crate::batch::{BatchConfig, BatchCoordinator, BatchOutcome};
use crate::gateway::{Gateway, GatewayConfig};
use crate::schedule::{ScheduleConfig, ScheduleLayout, ScheduleResolver, VersionedDocument, ids_for_date};
use crate::slim::{Negotiation, negotiate, project};
use crate::upstream::{Endpoints, UpstreamClient, UpstreamConfig};

/// A resource value with where it came from.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub value: Arc<Value>,
    pub from_cache: bool,
    /// Served from an expired entry because the refresh failed.
    pub stale: bool,
}

/// Game ids for a calendar date, with the schedule version they came from.
#[derive(Debug, Clone)]
pub struct DateGames {
    pub date: NaiveDate,
    pub game_ids: Vec<String>,
    pub schedule_version: u32,
    /// Schedule refresh failed and the last resolved schedule was used.
    pub stale: bool,
}

#[derive(Debug, Clone)]
pub struct PollOutcome {
    pub negotiation: Negotiation,
    pub stale: bool,
}

#[derive(Debug)]
pub struct Courtside {
    gateway: Arc<Gateway>,
    resolver: ScheduleResolver,
    batch: BatchCoordinator,
    fuzzy_days: u32,
    layout: ScheduleLayout,
}

impl Courtside {
    /// Build every component from `config` around the injected `cache`.
    pub fn from_config(config: &AppConfig, cache: TtlCache) -> Result<Self, Error> {
        let endpoints = Endpoints::new(&config.cdn_base_url)
            .map_err(|e| Error::InvalidInput(format!("cdn_base_url: {e}")))?;
        let upstream = UpstreamClient::new(UpstreamConfig::from(config))
            .map_err(|e| Error::Internal(format!("failed to build upstream client: {e}")))?;

        let gateway = Arc::new(Gateway::new(
            cache.clone(),
            upstream.clone(),
            endpoints.clone(),
            GatewayConfig::from(config),
        ));
        let resolver = ScheduleResolver::new(cache, upstream, endpoints, ScheduleConfig::from(config));
        let batch = BatchCoordinator::new(Arc::clone(&gateway), BatchConfig::from(config));

        Ok(Self { gateway, resolver, batch, fuzzy_days: config.fuzzy_days, layout: ScheduleLayout::from(config) })
    }

    pub async fn scoreboard_today(&self) -> Result<Resolved, Error> {
        self.resource_or_last_known(ResourceClass::Scoreboard, "today").await
    }

    pub async fn resource(&self, class: ResourceClass, id: &str) -> Result<Resolved, Error> {
        let fetched = self.gateway.fetch_resource(class, id).await?;
        Ok(Resolved { value: fetched.value, from_cache: fetched.from_cache, stale: false })
    }

    pub async fn resource_with_ttl(&self, class: ResourceClass, id: &str, ttl: Duration) -> Result<Resolved, Error> {
        let fetched = self.gateway.fetch_resource_with_ttl(class, id, ttl).await?;
        Ok(Resolved { value: fetched.value, from_cache: fetched.from_cache, stale: false })
    }

    /// Like [`resource`](Self::resource), but an upstream failure serves the
    /// last cached value (marked stale) when there is one.
    pub async fn resource_or_last_known(&self, class: ResourceClass, id: &str) -> Result<Resolved, Error> {
        match self.resource(class, id).await {
            Ok(resolved) => Ok(resolved),
            Err(err @ Error::Upstream { .. }) => match self.gateway.last_known(class, id).await? {
                Some(value) => {
                    tracing::warn!(class = %class, id, error = %err, "serving stale value after upstream failure");
                    Ok(Resolved { value, from_cache: true, stale: true })
                }
                None => Err(err),
            },
            Err(err) => Err(err),
        }
    }

    pub async fn schedule(&self) -> Result<VersionedDocument, Error> {
        self.resolver.resolve_latest().await
    }

    /// Game ids near `date` using the configured fuzz window.
    pub async fn game_ids_for_date(&self, date: NaiveDate) -> Result<DateGames, Error> {
        self.game_ids_for_date_with(date, self.fuzzy_days).await
    }

    pub async fn game_ids_for_date_with(&self, date: NaiveDate, fuzzy_days: u32) -> Result<DateGames, Error> {
        let (schedule, stale) = self.schedule_or_last_known().await?;
        let game_ids = ids_for_date(schedule.document(), date, fuzzy_days, &self.layout);
        Ok(DateGames { date, game_ids, schedule_version: schedule.version(), stale })
    }

    /// Latest schedule, or the last resolved one (marked stale) if every
    /// version fails to refresh.
    pub async fn schedule_or_last_known(&self) -> Result<(VersionedDocument, bool), Error> {
        match self.resolver.resolve_latest().await {
            Ok(schedule) => Ok((schedule, false)),
            Err(err @ Error::UpstreamUnavailable(_)) => match self.resolver.last_known().await {
                Some(schedule) => {
                    tracing::warn!(version = schedule.version(), error = %err, "serving stale schedule");
                    Ok((schedule, true))
                }
                None => Err(err),
            },
            Err(err) => Err(err),
        }
    }

    pub async fn fetch_many(&self, class: ResourceClass, ids: &[String]) -> Result<BatchOutcome, Error> {
        self.batch.fetch_many(class, ids).await
    }

    /// Slim live view of a game, negotiated against `validator`.
    pub async fn poll(&self, game_id: &str, validator: Option<&str>) -> Result<PollOutcome, Error> {
        let resolved = self.resource_or_last_known(ResourceClass::LiveDetail, game_id).await?;
        let view = project(game_id.trim(), &resolved.value);
        Ok(PollOutcome { negotiation: negotiate(view, validator), stale: resolved.stale })
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    pub fn cache(&self) -> &TtlCache {
        self.gateway.cache()
    }
}
