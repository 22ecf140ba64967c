//! Change Event Module
//!
//! Describes one mutation of the cache as delivered to subscribers.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::Value;

/// Timestamp sent in place of an expiration for deletion events.
pub const ZERO_TIMESTAMP: &str = "0001-01-01T00:00:00Z";

/// What happened to the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// Key was inserted or overwritten
    Set,
    /// Key was deleted or expired
    Delete,
}

// == Change Event ==
/// A notification describing a single set or delete of a key.
///
/// Serializes as
/// `{"kind": "set"|"delete", "key": ..., "value": ..., "expiresAt": ...}`.
/// Deletions carry a `null` value and [`ZERO_TIMESTAMP`]; `kind` is what
/// tells them apart from a key set to the literal `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeEvent {
    pub kind: EventKind,
    pub key: String,
    pub value: Option<Value>,
    #[serde(rename = "expiresAt", serialize_with = "serialize_expiry")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl ChangeEvent {
    /// Builds the event announcing `key` now holds `value` until `expires_at`.
    pub fn set(key: impl Into<String>, value: Value, expires_at: DateTime<Utc>) -> Self {
        Self {
            kind: EventKind::Set,
            key: key.into(),
            value: Some(value),
            expires_at: Some(expires_at),
        }
    }

    /// Builds the event announcing `key` is gone.
    pub fn delete(key: impl Into<String>) -> Self {
        Self {
            kind: EventKind::Delete,
            key: key.into(),
            value: None,
            expires_at: None,
        }
    }

    pub fn is_delete(&self) -> bool {
        self.kind == EventKind::Delete
    }
}

fn serialize_expiry<S>(expires_at: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match expires_at {
        Some(timestamp) => timestamp.serialize(serializer),
        None => serializer.serialize_str(ZERO_TIMESTAMP),
    }
}
