//! Cache Store Module
//!
//! Main cache engine combining a key index with a recency list and TTL
//! expiration.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, RecencyList, MAX_KEY_LENGTH, MAX_VALUE_SIZE};
use crate::error::{CacheError, Result};

// == Snapshot ==
/// One live entry as seen by a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotItem {
    pub value: Value,
    #[serde(rename = "expiresAt")]
    pub expires_at: DateTime<Utc>,
}

/// Point-in-time view of every unexpired entry, ordered by key.
pub type Snapshot = BTreeMap<String, SnapshotItem>;

// == Cache Store ==
/// Bounded cache storage with LRU eviction and TTL support.
///
/// `index` maps each key to its slot in `recency`; the two are only ever
/// updated together so every indexed key appears exactly once in the list.
#[derive(Debug)]
pub struct CacheStore {
    /// Key to recency-list slot
    index: HashMap<String, usize>,
    /// Entries ordered from most to least recently used
    recency: RecencyList<CacheEntry>,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries allowed
    capacity: usize,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a new CacheStore holding at most `capacity` entries.
    ///
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        Self {
            index: HashMap::new(),
            recency: RecencyList::new(),
            stats: CacheStats::new(),
            capacity: capacity.max(1),
        }
    }

    // == Set ==
    /// Stores a key-value pair expiring `ttl` from now.
    ///
    /// An existing key is overwritten in place and promoted to most recently
    /// used. A new key inserted at capacity first evicts the least recently
    /// used entry. A zero `ttl` is accepted and yields an entry that is
    /// already expired.
    ///
    /// Returns the new expiration deadline.
    pub fn set(&mut self, key: String, value: Value, ttl: Duration) -> Result<DateTime<Utc>> {
        validate(&key, &value)?;

        if let Some(&idx) = self.index.get(&key) {
            if let Some(entry) = self.recency.get_mut(idx) {
                entry.refresh(value, ttl);
                let expires_at = entry.expires_at;
                self.recency.move_to_front(idx);
                return Ok(expires_at);
            }
            // Index pointed at a freed slot; drop it and insert fresh
            self.index.remove(&key);
        }

        if self.recency.len() >= self.capacity {
            self.evict();
        }

        let entry = CacheEntry::new(key.clone(), value, ttl);
        let expires_at = entry.expires_at;
        let idx = self.recency.push_front(entry);
        self.index.insert(key, idx);

        Ok(expires_at)
    }

    // == Get ==
    /// Retrieves a value by key and promotes it to most recently used.
    ///
    /// An entry found past its deadline is removed on the spot and reported
    /// as [`CacheError::Expired`] so the caller can announce the removal.
    pub fn get(&mut self, key: &str) -> Result<Value> {
        let Some(&idx) = self.index.get(key) else {
            self.stats.record_miss();
            return Err(CacheError::NotFound(key.to_string()));
        };

        match self.recency.get(idx) {
            Some(entry) if !entry.is_expired() => {
                let value = entry.value.clone();
                self.recency.move_to_front(idx);
                self.stats.record_hit();
                Ok(value)
            }
            _ => {
                self.delete(key);
                self.stats.record_miss();
                self.stats.record_expirations(1);
                Err(CacheError::Expired(key.to_string()))
            }
        }
    }

    // == Delete ==
    /// Removes an entry by key.
    ///
    /// Deleting an absent key is a no-op. Returns whether an entry was removed.
    pub fn delete(&mut self, key: &str) -> bool {
        match self.index.remove(key) {
            Some(idx) => {
                self.recency.remove(idx);
                true
            }
            None => false,
        }
    }

    // == Evict ==
    /// Removes the least recently used entry, if any.
    fn evict(&mut self) -> Option<String> {
        let entry = self.recency.pop_back()?;
        self.index.remove(&entry.key);
        self.stats.record_eviction();
        debug!(key = %entry.key, "evicted least recently used entry");
        Some(entry.key)
    }

    // == Snapshot ==
    /// Returns every unexpired entry as of a single instant.
    ///
    /// Expired entries that have not been reaped yet are left out.
    pub fn snapshot(&self) -> Snapshot {
        let now = Utc::now();
        self.recency
            .iter()
            .filter(|entry| !entry.is_expired_at(now))
            .map(|entry| {
                (
                    entry.key.clone(),
                    SnapshotItem {
                        value: entry.value.clone(),
                        expires_at: entry.expires_at,
                    },
                )
            })
            .collect()
    }

    // == Expire All ==
    /// Removes all expired entries in one pass.
    ///
    /// Returns the keys that were removed.
    pub fn expire_all(&mut self) -> Vec<String> {
        let now = Utc::now();
        let expired: Vec<String> = self
            .recency
            .iter()
            .filter(|entry| entry.is_expired_at(now))
            .map(|entry| entry.key.clone())
            .collect();

        for key in &expired {
            self.delete(key);
        }

        self.stats.record_expirations(expired.len());
        expired
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.recency.len());
        stats
    }

    /// Returns the number of entries, including expired ones not yet reaped.
    pub fn len(&self) -> usize {
        self.recency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recency.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns keys from most to least recently used.
    #[cfg(test)]
    pub(crate) fn keys_by_recency(&self) -> Vec<String> {
        self.recency.iter().map(|entry| entry.key.clone()).collect()
    }
}

fn validate(key: &str, value: &Value) -> Result<()> {
    if key.len() > MAX_KEY_LENGTH {
        return Err(CacheError::InvalidRequest(format!(
            "Key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        )));
    }

    let size = serde_json::to_vec(value)
        .map_err(|err| CacheError::Internal(err.to_string()))?
        .len();
    if size > MAX_VALUE_SIZE {
        return Err(CacheError::InvalidRequest(format!(
            "Value exceeds maximum size of {} bytes",
            MAX_VALUE_SIZE
        )));
    }

    Ok(())
}
