//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::Value;

// == Cache Entry ==
/// A single cached key/value pair with its expiration deadline.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    /// The key this entry is stored under
    pub key: String,
    /// The stored value, opaque to the cache
    pub value: Value,
    /// Absolute expiration deadline
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry expiring `ttl` from now.
    pub fn new(key: String, value: Value, ttl: Duration) -> Self {
        Self {
            key,
            value,
            expires_at: deadline_after(Utc::now(), ttl),
        }
    }

    // == Refresh ==
    /// Overwrites the value and restarts the TTL from now.
    pub fn refresh(&mut self, value: Value, ttl: Duration) {
        self.value = value;
        self.expires_at = deadline_after(Utc::now(), ttl);
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once the current time reaches its deadline, so a
    /// zero TTL produces an entry that is already expired.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Checks expiration against a caller-supplied clock reading.
    ///
    /// Used by whole-store passes so every entry is judged against the same
    /// instant.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

// == Utility Functions ==
/// Returns `now + ttl`, saturating at the largest representable timestamp.
pub fn deadline_after(now: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(ttl)
        .ok()
        .and_then(|ttl| now.checked_add_signed(ttl))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
