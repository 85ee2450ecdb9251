//! HTTP access to the sports-data CDN.
//!
//! ### Identification
//! - The CDN rejects unidentified clients, so every request carries a
//!   browser-like header set (User-Agent, Accept, Origin, Referer).
//!
//! ### Pooling
//! - One `reqwest::Client` per process; its idle pool is sized for peak
//!   batch concurrency plus ordinary traffic.
//!
//! ### Retries
//! - 429, 5xx, timeouts and connection errors are retried with capped
//!   exponential backoff: `min(base * 2^attempt, max)`.
//! - Only GET is ever issued, so every request is safe to repeat.

pub mod endpoints;
pub mod error;

use std::time::{Duration, Instant};

use reqwest::{Client, header};
use serde_json::Value;

use courtside_core::AppConfig;

pub use endpoints::{Endpoints, UrlError, validate_resource_id};
pub use error::UpstreamError;

/// Configuration for the upstream client.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// User agent string (default: a desktop Chrome UA)
    pub user_agent: String,

    /// Origin header (default: "https://www.nba.com")
    pub origin: String,

    /// Referer header (default: "https://www.nba.com/")
    pub referer: String,

    /// Per-request timeout (default: 12s)
    pub timeout: Duration,

    /// Retries after the first attempt (default: 3)
    pub max_retries: u32,

    /// First backoff sleep (default: 400ms)
    pub backoff_base: Duration,

    /// Longest backoff sleep (default: 5s)
    pub backoff_max: Duration,

    /// Idle connections kept per host (default: 16)
    pub pool_max_idle_per_host: usize,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for UpstreamConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            origin: config.origin.clone(),
            referer: config.referer.clone(),
            timeout: config.timeout(),
            max_retries: config.max_retries,
            backoff_base: config.backoff_base(),
            backoff_max: config.backoff_max(),
            pool_max_idle_per_host: config.pool_max_idle_per_host,
        }
    }
}

/// Pooled JSON client with retry.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: Client,
    config: UpstreamConfig,
}

impl UpstreamClient {
    /// Create a new upstream client with the given configuration.
    pub fn new(config: UpstreamConfig) -> Result<Self, UpstreamError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json,text/plain,*/*"));
        headers.insert(
            header::ORIGIN,
            header::HeaderValue::from_str(&config.origin)
                .map_err(|e| UpstreamError::InvalidRequest(format!("invalid origin header: {e}")))?,
        );
        headers.insert(
            header::REFERER,
            header::HeaderValue::from_str(&config.referer)
                .map_err(|e| UpstreamError::InvalidRequest(format!("invalid referer header: {e}")))?,
        );

        let http = Client::builder()
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .timeout(config.timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| UpstreamError::InvalidRequest(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    /// GET `url` and parse the body as JSON, retrying transient failures.
    pub async fn get_json(&self, url: &str) -> Result<Value, UpstreamError> {
        self.get_json_with_timeout(url, self.config.timeout).await
    }

    /// Like [`get_json`](Self::get_json) with a per-attempt timeout override.
    pub async fn get_json_with_timeout(&self, url: &str, timeout: Duration) -> Result<Value, UpstreamError> {
        let mut attempt = 0u32;
        loop {
            match self.attempt(url, timeout).await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt < self.config.max_retries => {
                    let delay = self.backoff_delay(attempt);
                    tracing::debug!(url, attempt, delay_ms = delay.as_millis() as u64, error = %err, "retrying upstream request");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    if attempt > 0 {
                        tracing::warn!(url, attempts = attempt + 1, error = %err, "upstream request failed after retries");
                    }
                    return Err(err);
                }
            }
        }
    }

    async fn attempt(&self, url: &str, timeout: Duration) -> Result<Value, UpstreamError> {
        let start = Instant::now();

        let response = self.http.get(url).timeout(timeout).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status { status: status.as_u16() });
        }

        let body = response.bytes().await?;
        let value = serde_json::from_slice(&body).map_err(|e| UpstreamError::Decode(e.to_string()))?;

        tracing::debug!("fetched {} in {}ms ({} bytes)", url, start.elapsed().as_millis(), body.len());

        Ok(value)
    }

    /// Backoff before retry number `attempt + 1`.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = 1u32 << attempt.min(16);
        self.config.backoff_base.saturating_mul(factor).min(self.config.backoff_max)
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &UpstreamConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fast_config() -> UpstreamConfig {
        UpstreamConfig {
            timeout: Duration::from_secs(2),
            max_retries: 2,
            backoff_base: Duration::from_millis(1),
            backoff_max: Duration::from_millis(4),
            ..Default::default()
        }
    }

    #[test]
    fn test_upstream_config_default() {
        let config = UpstreamConfig::default();
        assert!(config.user_agent.starts_with("Mozilla/5.0"));
        assert_eq!(config.origin, "https://www.nba.com");
        assert_eq!(config.referer, "https://www.nba.com/");
        assert_eq!(config.timeout, Duration::from_millis(12_000));
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.pool_max_idle_per_host, 16);
    }

    #[test]
    fn test_backoff_is_capped() {
        let client = UpstreamClient::new(UpstreamConfig::default()).unwrap();
        assert_eq!(client.backoff_delay(0), Duration::from_millis(400));
        assert_eq!(client.backoff_delay(1), Duration::from_millis(800));
        assert_eq!(client.backoff_delay(2), Duration::from_millis(1600));
        assert_eq!(client.backoff_delay(4), Duration::from_millis(5000));
        assert_eq!(client.backoff_delay(40), Duration::from_millis(5000));
    }

    #[test]
    fn test_rejects_invalid_header_values() {
        let config = UpstreamConfig { origin: "bad\norigin".into(), ..Default::default() };
        assert!(matches!(UpstreamClient::new(config), Err(UpstreamError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_sends_browser_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data.json"))
            .and(header("origin", "https://www.nba.com"))
            .and(header("referer", "https://www.nba.com/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let client = UpstreamClient::new(fast_config()).unwrap();
        let value = client.get_json(&format!("{}/data.json", server.uri())).await.unwrap();
        assert_eq!(value, json!({"ok": true}));
    }

    #[tokio::test]
    async fn test_retries_transient_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/flaky.json"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/flaky.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"attempt": 3})))
            .expect(1)
            .mount(&server)
            .await;

        let client = UpstreamClient::new(fast_config()).unwrap();
        let value = client.get_json(&format!("{}/flaky.json", server.uri())).await.unwrap();
        assert_eq!(value["attempt"], 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/down.json"))
            .respond_with(ResponseTemplate::new(429))
            .expect(3)
            .mount(&server)
            .await;

        let client = UpstreamClient::new(fast_config()).unwrap();
        let result = client.get_json(&format!("{}/down.json", server.uri())).await;
        assert!(matches!(result, Err(UpstreamError::Status { status: 429 })));
    }

    #[tokio::test]
    async fn test_does_not_retry_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing.json"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let client = UpstreamClient::new(fast_config()).unwrap();
        let result = client.get_json(&format!("{}/missing.json", server.uri())).await;
        assert!(matches!(result, Err(UpstreamError::Status { status: 404 })));
    }

    #[tokio::test]
    async fn test_decode_error_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/html.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .expect(1)
            .mount(&server)
            .await;

        let client = UpstreamClient::new(fast_config()).unwrap();
        let result = client.get_json(&format!("{}/html.json", server.uri())).await;
        assert!(matches!(result, Err(UpstreamError::Decode(_))));
    }

    #[tokio::test]
    async fn test_timeout_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/slow.json"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let config = UpstreamConfig { max_retries: 0, ..fast_config() };
        let client = UpstreamClient::new(config).unwrap();
        let result = client
            .get_json_with_timeout(&format!("{}/slow.json", server.uri()), Duration::from_millis(50))
            .await;
        assert!(matches!(result, Err(UpstreamError::Timeout)));
    }
}
