//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Expiry reaper: removes expired cache entries at a fixed interval and
//!   announces each removal on the change feed

mod reaper;

pub use reaper::{reap_expired, spawn_reaper_task};
