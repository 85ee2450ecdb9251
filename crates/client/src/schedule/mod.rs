//! Versioned schedule resolution.
//!
//! The CDN publishes the season schedule under several numbered file
//! versions, and older or newer ones may be missing or empty at any time.
//! [`ScheduleResolver`] probes versions newest first and keeps the first one
//! that carries a non-empty list of dates.

pub mod dates;

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use tokio::sync::Mutex;

use courtside_core::{AppConfig, Error, ResourceClass, ResourceKey, TtlCache};

use crate::upstream::{Endpoints, UpstreamClient};

pub use dates::{ids_for_date, parse_iso_date};

/// Where the list of dates lives inside a schedule document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleLayout {
    /// Top-level section (default: "leagueSchedule")
    pub section: String,
    /// Array of dated entries within the section (default: "gameDates")
    pub dates_field: String,
    /// chrono format of the first token of `gameDate` (default: "%m/%d/%Y")
    pub date_format: String,
}

impl Default for ScheduleLayout {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for ScheduleLayout {
    fn from(config: &AppConfig) -> Self {
        Self {
            section: config.schedule_section.clone(),
            dates_field: config.schedule_dates_field.clone(),
            date_format: config.schedule_date_format.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    /// Versions to probe, in order.
    pub versions: Vec<u32>,
    pub ttl: Duration,
    /// Per-probe request timeout.
    pub timeout: Duration,
    pub layout: ScheduleLayout,
}

impl From<&AppConfig> for ScheduleConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            versions: config.schedule_versions.clone(),
            ttl: config.ttl_for(ResourceClass::Schedule),
            timeout: config.schedule_timeout(),
            layout: ScheduleLayout::from(config),
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

/// A schedule document together with the version that produced it.
///
/// Cached as a single envelope value `{"version", "url", "document"}`.
#[derive(Debug, Clone)]
pub struct VersionedDocument {
    version: u32,
    source_url: String,
    envelope: Arc<Value>,
}

impl VersionedDocument {
    fn new(version: u32, source_url: String, document: Value) -> Self {
        let envelope = json!({"version": version, "url": source_url, "document": document});
        Self { version, source_url, envelope: Arc::new(envelope) }
    }

    /// Rebuild from a cached envelope; `None` if the envelope is not one of ours.
    fn from_envelope(envelope: Arc<Value>) -> Option<Self> {
        let version = envelope.get("version")?.as_u64().and_then(|v| u32::try_from(v).ok())?;
        let source_url = envelope.get("url")?.as_str()?.to_string();
        envelope.get("document")?;
        Some(Self { version, source_url, envelope })
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn document(&self) -> &Value {
        &self.envelope["document"]
    }

    fn envelope(&self) -> Arc<Value> {
        Arc::clone(&self.envelope)
    }
}

/// Finds and caches the newest usable schedule version.
#[derive(Debug)]
pub struct ScheduleResolver {
    cache: TtlCache,
    upstream: UpstreamClient,
    endpoints: Endpoints,
    config: ScheduleConfig,
    probe_lock: Mutex<()>,
}

impl ScheduleResolver {
    pub fn new(cache: TtlCache, upstream: UpstreamClient, endpoints: Endpoints, config: ScheduleConfig) -> Self {
        Self { cache, upstream, endpoints, config, probe_lock: Mutex::new(()) }
    }

    /// Latest usable schedule, from cache when still fresh.
    ///
    /// Concurrent callers that miss the cache queue behind one probe and
    /// pick up its result.
    pub async fn resolve_latest(&self) -> Result<VersionedDocument, Error> {
        if let Some(doc) = self.cached().await {
            return Ok(doc);
        }

        let _guard = self.probe_lock.lock().await;
        if let Some(doc) = self.cached().await {
            return Ok(doc);
        }

        let doc = self.probe().await?;
        self.cache.set(ResourceKey::schedule().as_str(), doc.envelope(), false).await;
        Ok(doc)
    }

    /// Last resolved schedule, however old.
    pub async fn last_known(&self) -> Option<VersionedDocument> {
        let envelope = self.cache.peek(ResourceKey::schedule().as_str()).await?;
        VersionedDocument::from_envelope(envelope)
    }

    async fn cached(&self) -> Option<VersionedDocument> {
        let envelope = self.cache.get(ResourceKey::schedule().as_str(), self.config.ttl).await?;
        let doc = VersionedDocument::from_envelope(envelope);
        if doc.is_none() {
            tracing::warn!("ignoring unrecognized schedule cache entry");
        }
        doc
    }

    async fn probe(&self) -> Result<VersionedDocument, Error> {
        for &version in &self.config.versions {
            let url = self.endpoints.schedule(version);
            let document = match self.upstream.get_json_with_timeout(&url, self.config.timeout).await {
                Ok(document) => document,
                Err(err) => {
                    tracing::debug!(version, error = %err, "schedule version unavailable");
                    continue;
                }
            };

            if let Err(err) = check_marker(&document, version, &self.config.layout) {
                tracing::debug!(version, error = %err, "schedule version rejected");
                continue;
            }

            tracing::info!(version, url = %url, "resolved schedule version");
            return Ok(VersionedDocument::new(version, url, document));
        }

        Err(Error::UpstreamUnavailable(format!(
            "no usable schedule among versions {:?}",
            self.config.versions
        )))
    }

    pub fn config(&self) -> &ScheduleConfig {
        &self.config
    }
}

/// Accept a document whose dates array is present and non-empty.
pub fn check_marker(document: &Value, version: u32, layout: &ScheduleLayout) -> Result<(), Error> {
    let section = document.get(&layout.section).ok_or_else(|| Error::MalformedSchedule {
        version,
        reason: format!("missing section {:?}", layout.section),
    })?;

    match section.get(&layout.dates_field) {
        Some(Value::Array(dates)) if !dates.is_empty() => Ok(()),
        Some(Value::Array(_)) => {
            Err(Error::MalformedSchedule { version, reason: format!("{:?} is empty", layout.dates_field) })
        }
        _ => Err(Error::MalformedSchedule { version, reason: format!("missing {:?} array", layout.dates_field) }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::UpstreamConfig;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn schedule_path(version: u32) -> String {
        format!("/static/json/staticData/scheduleLeagueV2_{version}.json")
    }

    fn valid_schedule(marker: &str) -> Value {
        json!({"leagueSchedule": {"gameDates": [
            {"gameDate": "03/10/2025 00:00:00", "games": [{"gameId": marker}]}
        ]}})
    }

    fn resolver(server: &MockServer, versions: Vec<u32>) -> ScheduleResolver {
        let upstream = UpstreamClient::new(UpstreamConfig { max_retries: 0, ..Default::default() }).unwrap();
        let endpoints = Endpoints::new(&server.uri()).unwrap();
        let config = ScheduleConfig { versions, ..Default::default() };
        ScheduleResolver::new(TtlCache::new(), upstream, endpoints, config)
    }

    #[test]
    fn test_check_marker() {
        let layout = ScheduleLayout::default();
        assert!(check_marker(&valid_schedule("g"), 1, &layout).is_ok());
        assert!(matches!(
            check_marker(&json!({"leagueSchedule": {"gameDates": []}}), 4, &layout),
            Err(Error::MalformedSchedule { version: 4, .. })
        ));
        assert!(check_marker(&json!({"leagueSchedule": {}}), 1, &layout).is_err());
        assert!(check_marker(&json!({"other": {}}), 1, &layout).is_err());
        assert!(check_marker(&json!({"leagueSchedule": {"gameDates": {}}}), 1, &layout).is_err());
    }

    #[tokio::test]
    async fn test_resolves_third_version_and_stops() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(schedule_path(12)))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(schedule_path(11)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"leagueSchedule": {"gameDates": []}})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(schedule_path(10)))
            .respond_with(ResponseTemplate::new(200).set_body_json(valid_schedule("v10")))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(schedule_path(9)))
            .respond_with(ResponseTemplate::new(200).set_body_json(valid_schedule("v9")))
            .expect(0)
            .mount(&server)
            .await;

        let resolver = resolver(&server, vec![12, 11, 10, 9]);
        let doc = resolver.resolve_latest().await.unwrap();
        assert_eq!(doc.version(), 10);
        assert!(doc.source_url().ends_with(&schedule_path(10)));
        assert_eq!(doc.document(), &valid_schedule("v10"));
    }

    #[tokio::test]
    async fn test_second_call_served_from_cache() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(schedule_path(5)))
            .respond_with(ResponseTemplate::new(200).set_body_json(valid_schedule("g")))
            .expect(1)
            .mount(&server)
            .await;

        let resolver = resolver(&server, vec![5]);
        let first = resolver.resolve_latest().await.unwrap();
        let second = resolver.resolve_latest().await.unwrap();
        assert_eq!(first.version(), second.version());
        assert_eq!(second.document(), &valid_schedule("g"));
    }

    #[tokio::test]
    async fn test_concurrent_cold_callers_probe_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(schedule_path(3)))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(valid_schedule("g"))
                    .set_delay(Duration::from_millis(50)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let resolver = Arc::new(resolver(&server, vec![3]));
        let mut handles = Vec::new();
        for _ in 0..4 {
            let resolver = Arc::clone(&resolver);
            handles.push(tokio::spawn(async move { resolver.resolve_latest().await.map(|d| d.version()) }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), 3);
        }
    }

    #[tokio::test]
    async fn test_all_versions_fail() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .mount(&server)
            .await;

        let resolver = resolver(&server, vec![2, 1]);
        let err = resolver.resolve_latest().await.unwrap_err();
        assert!(matches!(err, Error::UpstreamUnavailable(_)));
        assert!(resolver.cache.is_empty().await);
    }

    #[test]
    fn test_envelope_roundtrip() {
        let doc = VersionedDocument::new(7, "https://cdn.example/s_7.json".into(), valid_schedule("g"));
        let restored = VersionedDocument::from_envelope(doc.envelope()).unwrap();
        assert_eq!(restored.version(), 7);
        assert_eq!(restored.source_url(), "https://cdn.example/s_7.json");
        assert_eq!(restored.document(), doc.document());
        assert!(VersionedDocument::from_envelope(Arc::new(json!({"leagueSchedule": {}}))).is_none());
    }

    #[tokio::test]
    async fn test_last_known_survives_expiry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(schedule_path(1)))
            .respond_with(ResponseTemplate::new(200).set_body_json(valid_schedule("g")))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(schedule_path(1)))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let mut resolver = resolver(&server, vec![1]);
        resolver.config.ttl = Duration::ZERO;
        assert!(resolver.last_known().await.is_none());

        resolver.resolve_latest().await.unwrap();
        assert!(matches!(resolver.resolve_latest().await, Err(Error::UpstreamUnavailable(_))));

        let last = resolver.last_known().await.unwrap();
        assert_eq!(last.version(), 1);
        assert_eq!(last.document(), &valid_schedule("g"));
    }
}
