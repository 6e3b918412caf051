//! API Handlers
//!
//! HTTP request handlers for each aggregation cache endpoint.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::cache::{CacheStore, MemoryStore};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    AggregateParams, AggregateResponse, ClearParams, ClearResponse, HealthResponse,
    InvalidateResponse, StatsResponse, ValueResponse,
};
use crate::orchestrator::{cache_key, CacheOrchestrator};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Cache-aside orchestrator
    pub orchestrator: Arc<CacheOrchestrator>,
    /// The store, kept for stats and health probes
    pub store: Arc<dyn CacheStore>,
    /// Dataset the aggregation engine reads on a miss
    pub dataset_path: PathBuf,
}

impl AppState {
    /// Wires up state over an already-connected store.
    ///
    /// Fails with `CacheError::Connection` when the store does not answer
    /// the health probe; the caller is expected to halt on that.
    pub fn new(
        store: Arc<dyn CacheStore>,
        dataset_path: PathBuf,
        default_ttl: u64,
    ) -> Result<Self> {
        let orchestrator = CacheOrchestrator::connect(store.clone(), default_ttl)?;
        Ok(Self {
            orchestrator: Arc::new(orchestrator),
            store,
            dataset_path,
        })
    }

    /// Creates state from configuration, connecting the in-process store.
    pub fn from_config(config: &Config) -> Result<Self> {
        let store = Arc::new(MemoryStore::connect(&config.store)?);
        Self::new(store, config.dataset_path.clone(), config.default_ttl)
    }
}

/// Handler for GET /aggregate/:group_by/:column/:func
///
/// Compute-or-fetch for one aggregation request. A cached entry is served
/// without touching the dataset; a miss computes, caches and returns the
/// native result.
pub async fn aggregate_handler(
    State(state): State<AppState>,
    Path((group_by, column, func)): Path<(String, String, String)>,
    Query(params): Query<AggregateParams>,
) -> Result<Json<AggregateResponse>> {
    let start = Instant::now();
    let outcome = state.orchestrator.compute_aggregation(
        &group_by,
        &column,
        &func,
        &state.dataset_path,
        params.ttl,
    )?;
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

    Ok(Json(AggregateResponse::new(
        outcome.query,
        outcome.cached,
        (elapsed_ms * 100.0).round() / 100.0,
        outcome.ttl_remaining,
        outcome.result,
    )))
}

/// Handler for GET /value/:group_by/:column/:func/:field
///
/// Fetches one group's value from a cached entry without retrieving the
/// whole hash. 404 when the entry or field is absent.
pub async fn value_handler(
    State(state): State<AppState>,
    Path((group_by, column, func, field)): Path<(String, String, String, String)>,
) -> Result<Json<ValueResponse>> {
    let value = state
        .orchestrator
        .get_single_value(&group_by, &column, &func, &field)?
        .ok_or_else(|| {
            CacheError::NotFound(format!(
                "No cached value for field '{}' of '{}'",
                field.trim(),
                crate::orchestrator::query_id(&group_by, &column, &func)
            ))
        })?;

    Ok(Json(ValueResponse::new(
        crate::orchestrator::query_id(&group_by, &column, &func),
        field.trim(),
        value,
    )))
}

/// Handler for DELETE /invalidate/:group_by/:column/:func
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Path((group_by, column, func)): Path<(String, String, String)>,
) -> Result<Json<InvalidateResponse>> {
    let key = cache_key(&group_by, &column, &func);
    let invalidated = state.orchestrator.invalidate(&key)?;

    Ok(Json(InvalidateResponse::new(key, invalidated)))
}

/// Handler for DELETE /clear
pub async fn clear_handler(
    State(state): State<AppState>,
    Query(params): Query<ClearParams>,
) -> Result<Json<ClearResponse>> {
    let pattern = params.pattern.as_deref().unwrap_or("cache:*").to_string();
    let cleared = state.orchestrator.clear_all(Some(&pattern))?;

    Ok(Json(ClearResponse::new(pattern, cleared)))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<StatsResponse>> {
    let stats = state.store.stats()?;
    Ok(Json(StatsResponse::from_stats(&stats)))
}

/// Handler for GET /health
///
/// Probes the store; an unanswered probe surfaces as 503.
pub async fn health_handler(State(state): State<AppState>) -> Result<Json<HealthResponse>> {
    state
        .store
        .ping()
        .map_err(|e| CacheError::StoreUnavailable(e.to_string()))?;
    Ok(Json(HealthResponse::healthy()))
}
