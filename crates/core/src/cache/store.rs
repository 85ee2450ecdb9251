//! In-memory TTL cache shared by every request path.
//!
//! Entries are `(value, stored_at, terminal)` triples behind one tokio
//! `RwLock`, so a reader always sees a whole triple written by a single
//! `set`. Expired entries are never removed on read; eviction belongs to
//! [`TtlCache::sweep`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::RwLock;
use tokio::time::Instant;

struct CacheEntry {
    value: Arc<Value>,
    stored_at: Instant,
    fetched_at: DateTime<Utc>,
    terminal: bool,
}

impl CacheEntry {
    fn age(&self) -> Duration {
        self.stored_at.elapsed()
    }
}

/// Consistent snapshot of one entry.
#[derive(Debug, Clone)]
pub struct CacheLookup {
    pub value: Arc<Value>,
    pub age: Duration,
    pub fetched_at: DateTime<Utc>,
    pub terminal: bool,
}

impl CacheLookup {
    /// Whether the entry is younger than `ttl`.
    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.age < ttl
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub terminal: usize,
}

/// Process-wide response cache.
///
/// Cloning is cheap and every clone shares the same map.
#[derive(Clone, Default)]
pub struct TtlCache {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
}

impl TtlCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the value for `key` if it was stored less than `ttl` ago.
    pub async fn get(&self, key: &str, ttl: Duration) -> Option<Arc<Value>> {
        let entries = self.entries.read().await;
        let entry = entries.get(key)?;
        if entry.age() < ttl { Some(Arc::clone(&entry.value)) } else { None }
    }

    /// Read the whole entry regardless of age.
    pub async fn lookup(&self, key: &str) -> Option<CacheLookup> {
        let entries = self.entries.read().await;
        entries.get(key).map(|entry| CacheLookup {
            value: Arc::clone(&entry.value),
            age: entry.age(),
            fetched_at: entry.fetched_at,
            terminal: entry.terminal,
        })
    }

    /// Last stored value, however old.
    pub async fn peek(&self, key: &str) -> Option<Arc<Value>> {
        let entries = self.entries.read().await;
        entries.get(key).map(|entry| Arc::clone(&entry.value))
    }

    pub async fn is_terminal(&self, key: &str) -> bool {
        let entries = self.entries.read().await;
        entries.get(key).is_some_and(|entry| entry.terminal)
    }

    /// Store `value` under `key`, replacing any previous entry and resetting its age.
    pub async fn set(&self, key: impl Into<String>, value: impl Into<Arc<Value>>, terminal: bool) {
        let entry = CacheEntry { value: value.into(), stored_at: Instant::now(), fetched_at: Utc::now(), terminal };
        let mut entries = self.entries.write().await;
        entries.insert(key.into(), entry);
    }

    pub async fn remove(&self, key: &str) -> bool {
        let mut entries = self.entries.write().await;
        entries.remove(key).is_some()
    }

    /// Remove every entry older than `max_age`, returning how many were removed.
    pub async fn sweep(&self, max_age: Duration) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.age() <= max_age);
        before - entries.len()
    }

    /// Remove everything, returning how many entries were dropped.
    pub async fn clear(&self) -> usize {
        let mut entries = self.entries.write().await;
        let count = entries.len();
        entries.clear();
        count
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub async fn stats(&self) -> CacheStats {
        let entries = self.entries.read().await;
        CacheStats { entries: entries.len(), terminal: entries.values().filter(|entry| entry.terminal).count() }
    }
}

impl std::fmt::Debug for TtlCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache").finish_non_exhaustive()
    }
}
