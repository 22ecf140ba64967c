//! Application State
//!
//! Shared handles passed to every handler and background task, plus the
//! operations that pair each store mutation with its change event.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use crate::cache::{CacheStats, CacheStore, Snapshot};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::feed::{ChangeEvent, ChangeFeed};

/// Application state shared across all handlers.
///
/// Every mutation publishes its change event while the store's write lock
/// is still held, so events for a key leave in commit order.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Thread-safe cache store
    pub cache: Arc<RwLock<CacheStore>>,
    /// Change feed for live subscribers
    pub feed: ChangeFeed,
    /// TTL applied when a set request carries none
    pub default_ttl: Duration,
}

impl AppState {
    pub fn new(cache: CacheStore, feed: ChangeFeed, default_ttl: Duration) -> Self {
        Self {
            cache: Arc::new(RwLock::new(cache)),
            feed,
            default_ttl,
        }
    }

    /// Creates the state from configuration and spawns the feed dispatcher.
    ///
    /// Returns the dispatcher's handle so it can be stopped on shutdown.
    pub fn from_config(config: &Config) -> (Self, JoinHandle<()>) {
        let (feed, dispatcher) = ChangeFeed::spawn(config.subscriber_buffer);
        let state = Self::new(
            CacheStore::new(config.max_entries),
            feed,
            config.default_ttl(),
        );
        (state, dispatcher)
    }

    /// Looks up `key`, promoting it on a hit.
    ///
    /// Finding the entry expired removes it, so a deletion event is
    /// published before the error is returned.
    pub async fn get(&self, key: &str) -> Result<Value> {
        let mut cache = self.cache.write().await;
        match cache.get(key) {
            Err(CacheError::Expired(key)) => {
                self.feed.publish(ChangeEvent::delete(key.clone()));
                Err(CacheError::Expired(key))
            }
            other => other,
        }
    }

    /// Stores `value` under `key` for `ttl_secs` (or the default TTL) and
    /// announces it.
    pub async fn set(&self, key: String, value: Value, ttl_secs: Option<u64>) -> Result<DateTime<Utc>> {
        let ttl = ttl_secs.map(Duration::from_secs).unwrap_or(self.default_ttl);

        let mut cache = self.cache.write().await;
        let expires_at = cache.set(key.clone(), value.clone(), ttl)?;
        self.feed.publish(ChangeEvent::set(key, value, expires_at));

        Ok(expires_at)
    }

    /// Deletes `key` and announces the deletion.
    ///
    /// The event goes out even when the key is already gone: subscribers may
    /// still hold a key the store evicted silently. Returns whether an entry
    /// was removed.
    pub async fn delete(&self, key: &str) -> bool {
        let mut cache = self.cache.write().await;
        let removed = cache.delete(key);
        self.feed.publish(ChangeEvent::delete(key));
        removed
    }

    pub async fn snapshot(&self) -> Snapshot {
        self.cache.read().await.snapshot()
    }

    pub async fn stats(&self) -> CacheStats {
        self.cache.read().await.stats()
    }
}
