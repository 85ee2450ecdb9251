//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (COURTSIDE_*)
//! 2. TOML config file (if COURTSIDE_CONFIG_FILE set)
//! 3. Built-in defaults

use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::cache::ResourceClass;

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (COURTSIDE_*)
/// 2. TOML config file (if COURTSIDE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the sports-data CDN.
    ///
    /// Set via COURTSIDE_CDN_BASE_URL environment variable.
    #[serde(default = "default_cdn_base_url")]
    pub cdn_base_url: String,

    /// User-Agent sent upstream. The CDN rejects unidentified clients.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Origin header sent upstream.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Referer header sent upstream.
    #[serde(default = "default_referer")]
    pub referer: String,

    /// Per-request timeout for live resources in milliseconds.
    ///
    /// Set via COURTSIDE_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Per-request timeout for schedule probes in milliseconds.
    #[serde(default = "default_schedule_timeout_ms")]
    pub schedule_timeout_ms: u64,

    /// Retries after the first attempt on transient failures (429, 5xx, network).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Initial backoff between retries in milliseconds; doubles per attempt.
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,

    /// Upper bound on a single backoff sleep in milliseconds.
    #[serde(default = "default_backoff_max_ms")]
    pub backoff_max_ms: u64,

    /// Idle pooled connections kept per upstream host.
    #[serde(default = "default_pool_max_idle_per_host")]
    pub pool_max_idle_per_host: usize,

    /// Freshness of today's scoreboard in seconds.
    #[serde(default = "default_scoreboard_ttl_secs")]
    pub scoreboard_ttl_secs: u64,

    /// Freshness of a live box score in seconds.
    #[serde(default = "default_live_ttl_secs")]
    pub live_detail_ttl_secs: u64,

    /// Freshness of a play-by-play log in seconds.
    #[serde(default = "default_live_ttl_secs")]
    pub event_log_ttl_secs: u64,

    /// Freshness of the resolved season schedule in seconds.
    #[serde(default = "default_schedule_ttl_secs")]
    pub schedule_ttl_secs: u64,

    /// Freshness applied instead of the class TTL once a resource is final.
    #[serde(default = "default_terminal_ttl_secs")]
    pub terminal_ttl_secs: u64,

    /// Status text marking a finished game (compared case-insensitively).
    #[serde(default = "default_final_status_marker")]
    pub final_status_marker: String,

    /// Schedule file versions to probe, newest first.
    ///
    /// Set via COURTSIDE_SCHEDULE_VERSIONS environment variable (e.g. `[13, 12, 11]`).
    #[serde(default = "default_schedule_versions")]
    pub schedule_versions: Vec<u32>,

    /// Top-level section of the schedule document.
    #[serde(default = "default_schedule_section")]
    pub schedule_section: String,

    /// Field under the section holding the dated entries; must be non-empty to accept a version.
    #[serde(default = "default_schedule_dates_field")]
    pub schedule_dates_field: String,

    /// chrono format of the date part of each schedule entry.
    #[serde(default = "default_schedule_date_format")]
    pub schedule_date_format: String,

    /// Symmetric day tolerance when matching dates against the schedule.
    #[serde(default = "default_fuzzy_days")]
    pub fuzzy_days: u32,

    /// Maximum ids accepted by a single batch call.
    #[serde(default = "default_batch_max_keys")]
    pub batch_max_keys: usize,

    /// Maximum concurrent upstream fetches within a batch.
    #[serde(default = "default_batch_concurrency")]
    pub batch_concurrency: usize,

    /// Overall deadline for a batch call in milliseconds.
    #[serde(default = "default_batch_deadline_ms")]
    pub batch_deadline_ms: u64,

    /// How often the cache sweeper runs, in seconds.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    /// Entries older than this many seconds are removed by the sweeper.
    #[serde(default = "default_sweep_max_age_secs")]
    pub sweep_max_age_secs: u64,
}

fn default_cdn_base_url() -> String {
    "https://cdn.nba.com".into()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/115.0.0.0 Safari/537.36"
        .into()
}

fn default_origin() -> String {
    "https://www.nba.com".into()
}

fn default_referer() -> String {
    "https://www.nba.com/".into()
}

fn default_timeout_ms() -> u64 {
    12_000
}

fn default_schedule_timeout_ms() -> u64 {
    20_000
}

fn default_max_retries() -> u32 {
    3
}

fn default_backoff_base_ms() -> u64 {
    400
}

fn default_backoff_max_ms() -> u64 {
    5_000
}

fn default_pool_max_idle_per_host() -> usize {
    16
}

fn default_scoreboard_ttl_secs() -> u64 {
    12
}

fn default_live_ttl_secs() -> u64 {
    10
}

fn default_schedule_ttl_secs() -> u64 {
    12 * 60 * 60
}

fn default_terminal_ttl_secs() -> u64 {
    60 * 60
}

fn default_final_status_marker() -> String {
    "Final".into()
}

fn default_schedule_versions() -> Vec<u32> {
    (1..=12).rev().collect()
}

fn default_schedule_section() -> String {
    "leagueSchedule".into()
}

fn default_schedule_dates_field() -> String {
    "gameDates".into()
}

fn default_schedule_date_format() -> String {
    "%m/%d/%Y".into()
}

fn default_fuzzy_days() -> u32 {
    1
}

fn default_batch_max_keys() -> usize {
    30
}

fn default_batch_concurrency() -> usize {
    8
}

fn default_batch_deadline_ms() -> u64 {
    20_000
}

fn default_sweep_interval_secs() -> u64 {
    5 * 60
}

fn default_sweep_max_age_secs() -> u64 {
    24 * 60 * 60
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cdn_base_url: default_cdn_base_url(),
            user_agent: default_user_agent(),
            origin: default_origin(),
            referer: default_referer(),
            timeout_ms: default_timeout_ms(),
            schedule_timeout_ms: default_schedule_timeout_ms(),
            max_retries: default_max_retries(),
            backoff_base_ms: default_backoff_base_ms(),
            backoff_max_ms: default_backoff_max_ms(),
            pool_max_idle_per_host: default_pool_max_idle_per_host(),
            scoreboard_ttl_secs: default_scoreboard_ttl_secs(),
            live_detail_ttl_secs: default_live_ttl_secs(),
            event_log_ttl_secs: default_live_ttl_secs(),
            schedule_ttl_secs: default_schedule_ttl_secs(),
            terminal_ttl_secs: default_terminal_ttl_secs(),
            final_status_marker: default_final_status_marker(),
            schedule_versions: default_schedule_versions(),
            schedule_section: default_schedule_section(),
            schedule_dates_field: default_schedule_dates_field(),
            schedule_date_format: default_schedule_date_format(),
            fuzzy_days: default_fuzzy_days(),
            batch_max_keys: default_batch_max_keys(),
            batch_concurrency: default_batch_concurrency(),
            batch_deadline_ms: default_batch_deadline_ms(),
            sweep_interval_secs: default_sweep_interval_secs(),
            sweep_max_age_secs: default_sweep_max_age_secs(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn schedule_timeout(&self) -> Duration {
        Duration::from_millis(self.schedule_timeout_ms)
    }

    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }

    pub fn backoff_max(&self) -> Duration {
        Duration::from_millis(self.backoff_max_ms)
    }

    /// Default freshness window for a resource class.
    pub fn ttl_for(&self, class: ResourceClass) -> Duration {
        let secs = match class {
            ResourceClass::Scoreboard => self.scoreboard_ttl_secs,
            ResourceClass::LiveDetail => self.live_detail_ttl_secs,
            ResourceClass::EventLog => self.event_log_ttl_secs,
            ResourceClass::Schedule => self.schedule_ttl_secs,
        };
        Duration::from_secs(secs)
    }

    pub fn terminal_ttl(&self) -> Duration {
        Duration::from_secs(self.terminal_ttl_secs)
    }

    pub fn batch_deadline(&self) -> Duration {
        Duration::from_millis(self.batch_deadline_ms)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn sweep_max_age(&self) -> Duration {
        Duration::from_secs(self.sweep_max_age_secs)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `COURTSIDE_`
    /// 2. TOML file from `COURTSIDE_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("COURTSIDE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("COURTSIDE_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.cdn_base_url, "https://cdn.nba.com");
        assert!(config.user_agent.starts_with("Mozilla/5.0"));
        assert_eq!(config.origin, "https://www.nba.com");
        assert_eq!(config.timeout_ms, 12_000);
        assert_eq!(config.schedule_versions.first(), Some(&12));
        assert_eq!(config.schedule_versions.last(), Some(&1));
        assert_eq!(config.schedule_versions.len(), 12);
        assert_eq!(config.fuzzy_days, 1);
        assert_eq!(config.final_status_marker, "Final");
        assert_eq!(config.batch_concurrency, 8);
    }

    #[test]
    fn test_ttl_for_class() {
        let config = AppConfig::default();
        assert_eq!(config.ttl_for(ResourceClass::Scoreboard), Duration::from_secs(12));
        assert_eq!(config.ttl_for(ResourceClass::LiveDetail), Duration::from_secs(10));
        assert_eq!(config.ttl_for(ResourceClass::EventLog), Duration::from_secs(10));
        assert_eq!(config.ttl_for(ResourceClass::Schedule), Duration::from_secs(43_200));
        assert!(config.terminal_ttl() >= config.ttl_for(ResourceClass::LiveDetail) * 10);
    }

    #[test]
    fn test_duration_helpers() {
        let config = AppConfig::default();
        assert_eq!(config.timeout(), Duration::from_millis(12_000));
        assert_eq!(config.schedule_timeout(), Duration::from_millis(20_000));
        assert_eq!(config.batch_deadline(), Duration::from_millis(20_000));
        assert_eq!(config.sweep_interval(), Duration::from_secs(300));
    }

    #[test]
    fn test_load_env_overrides() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("COURTSIDE_TIMEOUT_MS", "5000");
            jail.set_env("COURTSIDE_FUZZY_DAYS", "2");
            jail.set_env("COURTSIDE_SCHEDULE_VERSIONS", "[14, 13]");

            let config = AppConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.timeout_ms, 5000);
            assert_eq!(config.fuzzy_days, 2);
            assert_eq!(config.schedule_versions, vec![14, 13]);
            assert_eq!(config.batch_max_keys, 30);
            Ok(())
        });
    }

    #[test]
    fn test_load_toml_file_then_env() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("courtside.toml", "batch_concurrency = 4\nlive_detail_ttl_secs = 5\n")?;
            jail.set_env("COURTSIDE_CONFIG_FILE", "courtside.toml");
            jail.set_env("COURTSIDE_BATCH_CONCURRENCY", "6");

            let config = AppConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.batch_concurrency, 6);
            assert_eq!(config.live_detail_ttl_secs, 5);
            Ok(())
        });
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("COURTSIDE_BATCH_CONCURRENCY", "0");
            let result = AppConfig::load();
            assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "batch_concurrency"));
            Ok(())
        });
    }
}
