//! Live Cache - An in-memory cache with live change notifications
//!
//! Provides a bounded LRU store with TTL expiration whose every mutation is
//! pushed to WebSocket subscribers as it happens.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod feed;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use feed::{ChangeEvent, ChangeFeed};
pub use tasks::spawn_reaper_task;
