//! API Module
//!
//! HTTP and WebSocket adapters over the cache store and change feed.
//!
//! # Endpoints
//! - `GET /cache` - Snapshot of every live entry
//! - `POST /cache` - Store a key-value pair
//! - `GET /cache/:key` - Retrieve a value by key
//! - `DELETE /cache/:key` - Delete a key
//! - `GET /ws` - Live change feed
//! - `GET /stats` - Get cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;
mod state;
pub mod ws;

pub use handlers::*;
pub use routes::{build_router, cors_layer, create_router};
pub use state::AppState;
