//! Expiry Reaper
//!
//! Background task that periodically removes expired cache entries,
//! independent of request traffic.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheStore;
use crate::feed::{ChangeEvent, ChangeFeed};

/// Runs one sweep: removes every expired entry and publishes a deletion
/// event for each.
///
/// The write lock is taken once for the whole sweep and the events are
/// published before it is released, so readers see the removals as one
/// batch and subscribers see them after any earlier write to the same key.
///
/// Returns the number of entries removed.
pub async fn reap_expired(cache: &RwLock<CacheStore>, feed: &ChangeFeed) -> usize {
    let mut cache_guard = cache.write().await;
    let expired = cache_guard.expire_all();
    let removed = expired.len();

    for key in expired {
        feed.publish(ChangeEvent::delete(key));
    }

    removed
}

/// Spawns the reaper loop.
///
/// The task sleeps for `interval` between sweeps and runs until aborted.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(RwLock::new(CacheStore::new(100)));
/// let (feed, _dispatcher) = ChangeFeed::spawn(256);
/// let reaper = spawn_reaper_task(cache.clone(), feed, Duration::from_secs(5));
/// // Later, during shutdown:
/// reaper.abort();
/// ```
pub fn spawn_reaper_task(
    cache: Arc<RwLock<CacheStore>>,
    feed: ChangeFeed,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(interval_secs = interval.as_secs_f64(), "Starting expiry reaper");

        loop {
            tokio::time::sleep(interval).await;

            let removed = reap_expired(&cache, &feed).await;

            if removed > 0 {
                info!("Expiry reaper: removed {} expired entries", removed);
            } else {
                debug!("Expiry reaper: no expired entries found");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CacheError;
    use serde_json::json;

    #[tokio::test]
    async fn test_reaper_removes_expired_entries_and_announces_them() {
        let cache = Arc::new(RwLock::new(CacheStore::new(100)));
        let (feed, dispatcher) = ChangeFeed::spawn(16);
        let mut sub = feed.subscribe();

        cache
            .write()
            .await
            .set("expire_soon".to_string(), json!("value"), Duration::from_secs(1))
            .unwrap();

        let handle = spawn_reaper_task(cache.clone(), feed.clone(), Duration::from_millis(500));

        // Wait for entry to expire and a sweep to run
        tokio::time::sleep(Duration::from_millis(2000)).await;

        {
            let cache_guard = cache.read().await;
            assert!(cache_guard.is_empty(), "Expired entry should have been reaped");
            assert_eq!(cache_guard.stats().expirations, 1);
        }

        let event = sub.receiver.recv().await.unwrap();
        assert!(event.is_delete());
        assert_eq!(event.key, "expire_soon");

        handle.abort();
        dispatcher.abort();
    }

    #[tokio::test]
    async fn test_reaper_preserves_valid_entries() {
        let cache = Arc::new(RwLock::new(CacheStore::new(100)));
        let (feed, dispatcher) = ChangeFeed::spawn(16);

        cache
            .write()
            .await
            .set("long_lived".to_string(), json!("value"), Duration::from_secs(3600))
            .unwrap();

        let handle = spawn_reaper_task(cache.clone(), feed, Duration::from_millis(200));

        tokio::time::sleep(Duration::from_millis(700)).await;

        {
            let mut cache_guard = cache.write().await;
            assert_eq!(cache_guard.get("long_lived"), Ok(json!("value")));
        }

        handle.abort();
        dispatcher.abort();
    }

    #[tokio::test]
    async fn test_single_sweep_publishes_one_event_per_key() {
        let cache = RwLock::new(CacheStore::new(100));
        let (feed, dispatcher) = ChangeFeed::spawn(16);
        let mut sub = feed.subscribe();

        {
            let mut cache_guard = cache.write().await;
            cache_guard.set("a".to_string(), json!(1), Duration::ZERO).unwrap();
            cache_guard.set("b".to_string(), json!(2), Duration::ZERO).unwrap();
            cache_guard.set("c".to_string(), json!(3), Duration::from_secs(60)).unwrap();
        }

        assert_eq!(reap_expired(&cache, &feed).await, 2);
        assert_eq!(reap_expired(&cache, &feed).await, 0);

        let mut keys = vec![
            sub.receiver.recv().await.unwrap().key.clone(),
            sub.receiver.recv().await.unwrap().key.clone(),
        ];
        keys.sort();
        assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);
        assert!(sub.receiver.try_recv().is_err());

        let mut cache_guard = cache.write().await;
        assert!(matches!(cache_guard.get("a"), Err(CacheError::NotFound(_))));
        assert!(cache_guard.get("c").is_ok());

        dispatcher.abort();
    }

    #[tokio::test]
    async fn test_reaper_can_be_aborted() {
        let cache = Arc::new(RwLock::new(CacheStore::new(100)));
        let (feed, _dispatcher) = ChangeFeed::new(16);

        let handle = spawn_reaper_task(cache, feed, Duration::from_secs(1));

        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
