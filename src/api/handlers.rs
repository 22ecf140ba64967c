//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::AppState;
use crate::cache::Snapshot;
use crate::error::{CacheError, Result};
use crate::models::{
    DeleteResponse, GetResponse, HealthResponse, SetRequest, SetResponse, StatsResponse,
};

/// Handler for POST /cache
///
/// Stores a key-value pair and notifies subscribers.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<(StatusCode, Json<SetResponse>)> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let expires_at = state.set(req.key.clone(), req.value, req.ttl).await?;

    Ok((StatusCode::CREATED, Json(SetResponse::new(req.key, expires_at))))
}

/// Handler for GET /cache/:key
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    let value = state.get(&key).await?;

    Ok(Json(GetResponse::new(key, value)))
}

/// Handler for DELETE /cache/:key
///
/// Succeeds whether or not the key was present.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<DeleteResponse> {
    state.delete(&key).await;

    Json(DeleteResponse::new(key))
}

/// Handler for GET /cache
///
/// Returns every unexpired entry keyed by name.
pub async fn list_handler(State(state): State<AppState>) -> Json<Snapshot> {
    Json(state.snapshot().await)
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.stats().await;

    Json(StatsResponse::new(&stats, state.feed.subscriber_count()))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheStore;
    use crate::feed::ChangeFeed;
    use serde_json::json;
    use std::time::Duration;

    fn test_state() -> AppState {
        let (feed, _dispatcher) = ChangeFeed::new(16);
        AppState::new(CacheStore::new(100), feed, Duration::from_secs(300))
    }

    fn set_request(key: &str, value: serde_json::Value) -> SetRequest {
        SetRequest {
            key: key.to_string(),
            value,
            ttl: None,
        }
    }

    #[tokio::test]
    async fn test_set_and_get_handler() {
        let state = test_state();

        let (status, _) = set_handler(State(state.clone()), Json(set_request("test_key", json!("test_value"))))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::CREATED);

        let response = get_handler(State(state.clone()), Path("test_key".to_string()))
            .await
            .unwrap();
        assert_eq!(response.value, json!("test_value"));
    }

    #[tokio::test]
    async fn test_get_nonexistent_key() {
        let state = test_state();

        let result = get_handler(State(state), Path("nonexistent".to_string())).await;
        assert!(matches!(result, Err(CacheError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_handler() {
        let state = test_state();

        set_handler(State(state.clone()), Json(set_request("to_delete", json!(1))))
            .await
            .unwrap();

        let response = delete_handler(State(state.clone()), Path("to_delete".to_string())).await;
        assert_eq!(response.key, "to_delete");

        let result = get_handler(State(state), Path("to_delete".to_string())).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_delete_absent_key_succeeds() {
        let state = test_state();

        let response = delete_handler(State(state.clone()), Path("ghost".to_string())).await;
        assert_eq!(response.key, "ghost");
    }

    #[tokio::test]
    async fn test_list_handler() {
        let state = test_state();

        set_handler(State(state.clone()), Json(set_request("a", json!(1)))).await.unwrap();
        set_handler(State(state.clone()), Json(set_request("b", json!({"x": true}))))
            .await
            .unwrap();

        let Json(snapshot) = list_handler(State(state)).await;
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot["b"].value, json!({"x": true}));
    }

    #[tokio::test]
    async fn test_stats_handler() {
        let state = test_state();
        let _sub = state.feed.subscribe();

        let response = stats_handler(State(state)).await;
        assert_eq!(response.hits, 0);
        assert_eq!(response.misses, 0);
        assert_eq!(response.subscribers, 1);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }

    #[tokio::test]
    async fn test_set_invalid_request() {
        let state = test_state();

        let result = set_handler(State(state), Json(set_request("", json!("value")))).await;
        assert!(matches!(result, Err(CacheError::InvalidRequest(_))));
    }
}
