//! Cache client over a pluggable key-value store.
//!
//! Caching is a performance optimization, never a correctness dependency: a
//! store failure on read degrades to a miss and a failure on write is logged
//! and swallowed. Every read increments a hit or miss counter through the
//! injected metrics sink.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use serde::{de::DeserializeOwned, Serialize};
use tokio::time::Instant;

use crate::metrics::MetricsSink;

/// Default entry lifetime, one hour.
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Contract of the backing key-value store.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;
    async fn delete(&self, key: &str) -> Result<()>;
}

/// In-process store with per-entry deadlines. Expired entries are evicted
/// lazily on the next read.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, (String, Instant)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let expired = match self.entries.get(key) {
            None => return Ok(None),
            Some(entry) => {
                let (value, deadline) = entry.value();
                if Instant::now() < *deadline {
                    return Ok(Some(value.clone()));
                }
                true
            }
        };
        if expired {
            self.entries.remove(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        self.entries
            .insert(key.to_string(), (value.to_string(), Instant::now() + ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Client wrapper the pipeline stages share. Cheap to clone.
#[derive(Clone)]
pub struct CacheClient {
    store: Arc<dyn CacheStore>,
    metrics: Arc<dyn MetricsSink>,
    default_ttl: Duration,
}

impl CacheClient {
    pub fn new(store: Arc<dyn CacheStore>, metrics: Arc<dyn MetricsSink>) -> Self {
        Self {
            store,
            metrics,
            default_ttl: DEFAULT_TTL,
        }
    }

    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Read a key. Store failures degrade to a miss.
    pub async fn get(&self, key: &str) -> Option<String> {
        match self.store.get(key).await {
            Ok(Some(value)) => {
                tracing::debug!(key, "cache hit");
                self.metrics.increment("cache_hit");
                Some(value)
            }
            Ok(None) => {
                tracing::debug!(key, "cache miss");
                self.metrics.increment("cache_miss");
                None
            }
            Err(err) => {
                tracing::warn!(key, error = %err, "cache get failed, treating as miss");
                self.metrics.increment("cache_miss");
                None
            }
        }
    }

    /// Write a key with the default TTL. Failures are logged and swallowed.
    pub async fn set(&self, key: &str, value: &str) {
        self.set_with_ttl(key, value, self.default_ttl).await
    }

    pub async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) {
        if let Err(err) = self.store.set(key, value, ttl).await {
            tracing::warn!(key, error = %err, "cache set failed");
        }
    }

    /// Delete exactly one key. The error propagates so the invalidation
    /// endpoint can report a backing-store failure; pipeline stages never
    /// delete.
    pub async fn delete(&self, key: &str) -> Result<()> {
        self.store.delete(key).await
    }

    /// Typed read for JSON-encoded entries. A value that no longer parses is
    /// treated as a miss.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get(key).await?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(key, error = %err, "cache entry failed to parse, ignoring");
                None
            }
        }
    }

    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(raw) => self.set(key, &raw).await,
            Err(err) => tracing::warn!(key, error = %err, "failed to encode cache value"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::CounterMetrics;
    use anyhow::anyhow;

    struct FailStore;

    #[async_trait]
    impl CacheStore for FailStore {
        async fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(anyhow!("store unavailable"))
        }
        async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<()> {
            Err(anyhow!("store unavailable"))
        }
        async fn delete(&self, _key: &str) -> Result<()> {
            Err(anyhow!("store unavailable"))
        }
    }

    fn client_over(store: Arc<dyn CacheStore>) -> (CacheClient, Arc<CounterMetrics>) {
        let metrics = Arc::new(CounterMetrics::new());
        (CacheClient::new(store, metrics.clone()), metrics)
    }

    #[tokio::test]
    async fn test_round_trip_and_delete() {
        let (client, metrics) = client_over(Arc::new(MemoryStore::new()));

        client.set("k", "v").await;
        assert_eq!(client.get("k").await.as_deref(), Some("v"));

        client.delete("k").await.unwrap();
        assert_eq!(client.get("k").await, None);

        assert_eq!(metrics.get("cache_hit"), 1);
        assert_eq!(metrics.get("cache_miss"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_after_ttl() {
        let (client, _metrics) = client_over(Arc::new(MemoryStore::new()));

        client.set_with_ttl("k", "v", Duration::from_secs(60)).await;
        assert_eq!(client.get("k").await.as_deref(), Some("v"));

        tokio::time::advance(Duration::from_secs(61)).await;
        assert_eq!(client.get("k").await, None);
    }

    #[tokio::test]
    async fn test_store_failure_degrades_to_miss() {
        let (client, metrics) = client_over(Arc::new(FailStore));

        // Reads are misses, writes and deletes do not panic or propagate
        // past the client boundary.
        assert_eq!(client.get("k").await, None);
        client.set("k", "v").await;
        assert!(client.delete("k").await.is_err());

        assert_eq!(metrics.get("cache_miss"), 1);
        assert_eq!(metrics.get("cache_hit"), 0);
    }

    #[tokio::test]
    async fn test_json_round_trip() {
        let (client, _metrics) = client_over(Arc::new(MemoryStore::new()));

        let value = vec!["a".to_string(), "b".to_string()];
        client.set_json("k", &value).await;
        assert_eq!(client.get_json::<Vec<String>>("k").await, Some(value));
    }

    #[tokio::test]
    async fn test_corrupt_json_entry_is_a_miss() {
        let (client, _metrics) = client_over(Arc::new(MemoryStore::new()));

        client.set("k", "not json").await;
        assert_eq!(client.get_json::<Vec<String>>("k").await, None);
    }
}
