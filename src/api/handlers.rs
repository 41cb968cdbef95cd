//! API Handlers
//!
//! HTTP request handlers for each cache endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::cache::SyncCache;
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    GetResponse, HealthResponse, KeysResponse, MessageResponse, SetRequest, StatsResponse,
    UpdateRequest,
};

/// Application state shared across all handlers.
///
/// The cache does its own locking, so handlers share it through a plain `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Thread-safe cache handle
    pub cache: Arc<SyncCache>,
}

impl AppState {
    /// Creates a new AppState around an existing cache.
    pub fn new(cache: SyncCache) -> Self {
        Self {
            cache: Arc::new(cache),
        }
    }

    /// Creates a new AppState from configuration, starting the cache's
    /// background tasks.
    pub fn from_config(config: &Config) -> Self {
        Self::new(SyncCache::from_config(config))
    }
}

/// Handler for PUT /set
///
/// Stores a new key with optional TTL. Existing keys are rejected.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<MessageResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let ttl = req.ttl();
    state.cache.set(req.key.clone(), req.value, ttl)?;

    Ok(Json(MessageResponse::for_key(req.key, "set")))
}

/// Handler for PUT /update
///
/// Replaces the value of an existing key.
pub async fn update_handler(
    State(state): State<AppState>,
    Json(req): Json<UpdateRequest>,
) -> Result<Json<MessageResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    state.cache.update(&req.key, req.value)?;

    Ok(Json(MessageResponse::for_key(req.key, "updated")))
}

/// Handler for GET /get/:key
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    let value = state.cache.get(&key)?;

    Ok(Json(GetResponse::new(key, value)))
}

/// Handler for DELETE /del/:key
///
/// Deleting a missing key also succeeds.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<MessageResponse>> {
    state.cache.remove(&key)?;

    Ok(Json(MessageResponse::for_key(key, "deleted")))
}

/// Handler for GET /keys
pub async fn keys_handler(State(state): State<AppState>) -> Json<KeysResponse> {
    Json(KeysResponse {
        keys: state.cache.keys(),
    })
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse {
        total_entries: state.cache.len(),
        last_change: state.cache.last_change(),
    })
}

/// Handler for POST /save
///
/// Writes a snapshot to the configured persistence file.
pub async fn save_handler(State(state): State<AppState>) -> Result<Json<MessageResponse>> {
    state.cache.flush().await?;

    Ok(Json(MessageResponse::new("Snapshot written")))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
