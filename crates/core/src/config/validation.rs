//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `cdn_base_url` is not an http(s) URL
    /// - a timeout is below 100ms or above 5 minutes
    /// - `user_agent` or `final_status_marker` is empty
    /// - `batch_concurrency` is outside 1..=64 or `batch_max_keys` outside 1..=500
    /// - `fuzzy_days` exceeds 7 or `sweep_interval_secs` is 0
    ///
    /// Returns `ConfigError::Missing` if `schedule_versions` is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.cdn_base_url.starts_with("https://") || self.cdn_base_url.starts_with("http://")) {
            return Err(invalid("cdn_base_url", "must be an http or https URL"));
        }

        for (field, value) in [
            ("timeout_ms", self.timeout_ms),
            ("schedule_timeout_ms", self.schedule_timeout_ms),
            ("batch_deadline_ms", self.batch_deadline_ms),
        ] {
            if value < 100 {
                return Err(invalid(field, "must be at least 100ms"));
            }
            if value > 300_000 {
                return Err(invalid(field, "must not exceed 5 minutes (300000ms)"));
            }
        }

        if self.backoff_max_ms < self.backoff_base_ms {
            return Err(invalid("backoff_max_ms", "must not be smaller than backoff_base_ms"));
        }

        if self.user_agent.is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }
        if self.final_status_marker.trim().is_empty() {
            return Err(invalid("final_status_marker", "must not be empty"));
        }

        if self.schedule_versions.is_empty() {
            return Err(ConfigError::Missing {
                field: "schedule_versions".into(),
                hint: "Set COURTSIDE_SCHEDULE_VERSIONS to a list such as [12, 11, 10]".into(),
            });
        }
        if self.schedule_section.is_empty() || self.schedule_dates_field.is_empty() {
            return Err(invalid("schedule_section", "schedule marker path must not be empty"));
        }

        if self.batch_concurrency == 0 || self.batch_concurrency > 64 {
            return Err(invalid("batch_concurrency", "must be between 1 and 64"));
        }
        if self.batch_max_keys == 0 || self.batch_max_keys > 500 {
            return Err(invalid("batch_max_keys", "must be between 1 and 500"));
        }
        if self.pool_max_idle_per_host < self.batch_concurrency {
            tracing::warn!(
                pool_max_idle_per_host = self.pool_max_idle_per_host,
                batch_concurrency = self.batch_concurrency,
                "connection pool is smaller than batch concurrency; batches will open extra connections"
            );
        }

        if self.fuzzy_days > 7 {
            return Err(invalid("fuzzy_days", "must not exceed 7"));
        }

        if self.sweep_interval_secs == 0 {
            return Err(invalid("sweep_interval_secs", "must be at least 1 second"));
        }

        if self.terminal_ttl_secs < self.live_detail_ttl_secs.saturating_mul(10) {
            tracing::warn!(
                terminal_ttl_secs = self.terminal_ttl_secs,
                live_detail_ttl_secs = self.live_detail_ttl_secs,
                "terminal TTL is less than 10x the live TTL; finished games will be refetched often"
            );
        }
        if self.sweep_max_age_secs < self.schedule_ttl_secs.max(self.terminal_ttl_secs) {
            tracing::warn!(
                sweep_max_age_secs = self.sweep_max_age_secs,
                "sweep max age is shorter than the schedule or terminal TTL; \
                 long-lived entries will be evicted early"
            );
        }

        Ok(())
    }
}
