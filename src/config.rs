//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Maximum number of entries the cache can hold
    pub max_entries: usize,
    /// TTL in seconds for set requests that do not carry one
    pub default_ttl: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Expiry reaper interval in seconds
    pub cleanup_interval: u64,
    /// Undelivered change events buffered per subscriber before it is dropped
    pub subscriber_buffer: usize,
    /// Allowed CORS origin; any origin when unset
    pub cors_origin: Option<String>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_ENTRIES` - Maximum cache entries (default: 100)
    /// - `DEFAULT_TTL` - Default TTL in seconds (default: 300)
    /// - `SERVER_PORT` - HTTP server port (default: 8080)
    /// - `CLEANUP_INTERVAL` - Reaper frequency in seconds (default: 5)
    /// - `SUBSCRIBER_BUFFER` - Per-subscriber event backlog (default: 256)
    /// - `CORS_ORIGIN` - Single allowed origin (default: any)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_entries: env_or("MAX_ENTRIES", defaults.max_entries),
            default_ttl: env_or("DEFAULT_TTL", defaults.default_ttl),
            server_port: env_or("SERVER_PORT", defaults.server_port),
            cleanup_interval: env_or("CLEANUP_INTERVAL", defaults.cleanup_interval),
            subscriber_buffer: env_or("SUBSCRIBER_BUFFER", defaults.subscriber_buffer),
            cors_origin: env::var("CORS_ORIGIN").ok().filter(|v| !v.trim().is_empty()),
        }
    }

    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl)
    }

    /// Reaper interval, never shorter than one second.
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval.max(1))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_entries: 100,
            default_ttl: 300,
            server_port: 8080,
            cleanup_interval: 5,
            subscriber_buffer: 256,
            cors_origin: None,
        }
    }
}

/// Parses `name` from the environment, falling back to `default` when it is
/// unset or unparsable.
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
