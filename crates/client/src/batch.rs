//! Bounded-concurrency fetch of many resources of one class.
//!
//! Each id runs as its own task on a `JoinSet`, gated by a `Semaphore`, and
//! goes through [`Gateway::fetch_resource`] so batch items share cache
//! entries and terminal policy with single fetches. Per-item failures are
//! reported in place and never cancel siblings.

use std::sync::Arc;
use std::time::Duration;

use schemars::JsonSchema;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;

use courtside_core::{AppConfig, Error, ResourceClass};

use crate::gateway::Gateway;

#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Most ids accepted in one call (default: 30)
    pub max_keys: usize,
    /// Most fetches in flight at once (default: 8)
    pub concurrency: usize,
    /// Wall-clock bound on the whole batch (default: 20s)
    pub deadline: Duration,
}

impl From<&AppConfig> for BatchConfig {
    fn from(config: &AppConfig) -> Self {
        Self { max_keys: config.batch_max_keys, concurrency: config.batch_concurrency, deadline: config.batch_deadline() }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

/// Outcome for one requested id.
#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchItem {
    pub id: String,
    /// Cache key the item was fetched under (empty if the id was rejected).
    pub key: String,
    #[schemars(with = "Option<Value>")]
    pub value: Option<Arc<Value>>,
    pub error: Option<String>,
    pub from_cache: bool,
    /// Refresh failed and the last cached value was served instead.
    pub stale: bool,
}

impl BatchItem {
    fn failed(id: String, key: String, error: &Error) -> Self {
        Self { id, key, value: None, error: Some(error.to_string()), from_cache: false, stale: false }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, JsonSchema)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub cached: usize,
    pub stale: usize,
    pub failed: usize,
}

/// Items in input order plus counts.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct BatchOutcome {
    pub items: Vec<BatchItem>,
    pub summary: BatchSummary,
}

impl BatchOutcome {
    fn from_items(items: Vec<BatchItem>) -> Self {
        let mut summary = BatchSummary { total: items.len(), ..Default::default() };
        for item in &items {
            if item.error.is_some() {
                summary.failed += 1;
            } else {
                summary.succeeded += 1;
                if item.from_cache {
                    summary.cached += 1;
                }
                if item.stale {
                    summary.stale += 1;
                }
            }
        }
        Self { items, summary }
    }
}

#[derive(Debug, Clone)]
pub struct BatchCoordinator {
    gateway: Arc<Gateway>,
    config: BatchConfig,
}

impl BatchCoordinator {
    pub fn new(gateway: Arc<Gateway>, config: BatchConfig) -> Self {
        Self { gateway, config }
    }

    /// Fetch every id of `class` concurrently.
    ///
    /// Fails only when the input exceeds `max_keys`; everything else,
    /// including the batch deadline, is reported per item.
    pub async fn fetch_many(&self, class: ResourceClass, ids: &[String]) -> Result<BatchOutcome, Error> {
        if ids.len() > self.config.max_keys {
            return Err(Error::TooManyKeys { count: ids.len(), max: self.config.max_keys });
        }
        if ids.is_empty() {
            return Ok(BatchOutcome::from_items(Vec::new()));
        }

        let deadline = Instant::now() + self.config.deadline;
        let semaphore = Arc::new(Semaphore::new(self.config.concurrency.max(1)));
        let mut slots: Vec<Option<BatchItem>> = vec![None; ids.len()];
        let mut join_set = JoinSet::new();

        for (index, id) in ids.iter().enumerate() {
            let key = match Gateway::key_for(class, id) {
                Ok(key) => key.to_string(),
                Err(err) => {
                    slots[index] = Some(BatchItem::failed(id.clone(), String::new(), &err));
                    continue;
                }
            };

            let gateway = Arc::clone(&self.gateway);
            let semaphore = Arc::clone(&semaphore);
            let id = id.clone();
            join_set.spawn(async move {
                let item = match semaphore.acquire_owned().await {
                    Ok(_permit) => fetch_item(&gateway, class, id, key).await,
                    Err(_) => BatchItem::failed(id, key, &Error::Internal("batch semaphore closed".into())),
                };
                (index, item)
            });
        }

        let mut timed_out = false;
        loop {
            match tokio::time::timeout_at(deadline, join_set.join_next()).await {
                Ok(Some(Ok((index, item)))) => slots[index] = Some(item),
                Ok(Some(Err(err))) => tracing::warn!(error = %err, "batch worker failed"),
                Ok(None) => break,
                Err(_) => {
                    timed_out = true;
                    break;
                }
            }
        }

        if timed_out {
            let pending = join_set.len();
            join_set.abort_all();
            tracing::warn!(pending, deadline_ms = self.config.deadline.as_millis() as u64, "batch deadline elapsed");
        }

        let items = slots
            .into_iter()
            .zip(ids)
            .map(|(slot, id)| {
                slot.unwrap_or_else(|| {
                    let key = Gateway::key_for(class, id).map(|k| k.to_string()).unwrap_or_default();
                    let err = if timed_out {
                        Error::Timeout(format!("batch deadline of {:?} elapsed", self.config.deadline))
                    } else {
                        Error::Internal("batch worker failed".into())
                    };
                    BatchItem::failed(id.clone(), key, &err)
                })
            })
            .collect();

        let outcome = BatchOutcome::from_items(items);
        tracing::debug!(class = %class, total = outcome.summary.total, failed = outcome.summary.failed, "batch complete");
        Ok(outcome)
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }
}

/// Fetch one id, serving the last cached value when upstream fails.
async fn fetch_item(gateway: &Gateway, class: ResourceClass, id: String, key: String) -> BatchItem {
    let err = match gateway.fetch_resource(class, &id).await {
        Ok(fetched) => {
            return BatchItem {
                id,
                key,
                value: Some(fetched.value),
                error: None,
                from_cache: fetched.from_cache,
                stale: false,
            };
        }
        Err(err) => err,
    };

    if matches!(err, Error::Upstream { .. })
        && let Ok(Some(value)) = gateway.last_known(class, &id).await
    {
        tracing::warn!(key = %key, error = %err, "serving stale batch item after upstream failure");
        return BatchItem { id, key, value: Some(value), error: None, from_cache: true, stale: true };
    }

    BatchItem::failed(id, key, &err)
}
