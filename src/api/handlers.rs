//! API Handlers
//!
//! HTTP request handlers for the cache admin endpoints. Authorization is
//! enforced by whatever sits in front of these routes.

use axum::{extract::State, Json};
use serde_json::Value;
use tracing::info;

use crate::cache::Cache;
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    ClearResponse, HealthResponse, InvalidateRequest, InvalidateResponse, StatsResponse,
};

/// Application state shared across all handlers.
///
/// Holds the process-wide cache. Payloads are JSON documents, the shape the
/// back-office handlers already serialize to.
#[derive(Clone)]
pub struct AppState {
    pub cache: Cache<Value>,
}

impl AppState {
    /// Creates a new AppState around an existing cache.
    pub fn new(cache: Cache<Value>) -> Self {
        Self { cache }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(Cache::from_config(config))
    }
}

/// Handler for GET /admin/cache/stats
///
/// Returns counters, hit rate, health label and recommendations.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(state.cache.report().await)
}

/// Handler for DELETE /admin/cache
///
/// Drops every entry. Lifetime counters survive.
pub async fn clear_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    let result = state.cache.invalidate_all().await;
    Json(ClearResponse::new(result.count))
}

/// Handler for POST /admin/cache/invalidate
///
/// Removes every key matching the submitted regular expression.
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Json(req): Json<InvalidateRequest>,
) -> Result<Json<InvalidateResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let invalidated = state.cache.invalidate_pattern(&req.pattern).await?;
    info!(pattern = %req.pattern, invalidated, "Cache entries invalidated by pattern");

    Ok(Json(InvalidateResponse::new(req.pattern, invalidated)))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
