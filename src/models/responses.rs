//! Response DTOs for the aggregation cache API
//!
//! Defines the structure of outgoing HTTP response bodies.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::cache::FieldValue;

/// Response body for GET /aggregate/:group_by/:column/:func
#[derive(Debug, Serialize)]
pub struct AggregateResponse {
    /// Query identifier (`{func}_{column}_per_{group_by}`)
    pub query: String,
    /// "cache" when served from the store, "computed" otherwise
    pub source: String,
    /// Wall time spent serving the request, milliseconds
    pub elapsed_ms: f64,
    /// Remaining TTL of the cached entry, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl_remaining: Option<u64>,
    /// Group value -> aggregate
    pub result: BTreeMap<String, FieldValue>,
}

impl AggregateResponse {
    pub fn new(
        query: impl Into<String>,
        cached: bool,
        elapsed_ms: f64,
        ttl_remaining: Option<u64>,
        result: BTreeMap<String, FieldValue>,
    ) -> Self {
        Self {
            query: query.into(),
            source: if cached { "cache" } else { "computed" }.to_string(),
            elapsed_ms,
            ttl_remaining,
            result,
        }
    }
}

/// Response body for GET /value/:group_by/:column/:func/:field
#[derive(Debug, Serialize)]
pub struct ValueResponse {
    /// Query identifier
    pub query: String,
    /// The requested group field
    pub field: String,
    /// The decoded value
    pub value: FieldValue,
}

impl ValueResponse {
    pub fn new(query: impl Into<String>, field: impl Into<String>, value: FieldValue) -> Self {
        Self {
            query: query.into(),
            field: field.into(),
            value,
        }
    }
}

/// Response body for DELETE /invalidate/:group_by/:column/:func
#[derive(Debug, Serialize)]
pub struct InvalidateResponse {
    /// Outcome message
    pub message: String,
    /// The cache key addressed
    pub key: String,
    /// True if a live entry existed and was removed
    pub invalidated: bool,
}

impl InvalidateResponse {
    pub fn new(key: impl Into<String>, invalidated: bool) -> Self {
        let key = key.into();
        let message = if invalidated {
            format!("Invalidated cache entry '{}'", key)
        } else {
            format!("No cache entry '{}' to invalidate", key)
        };
        Self {
            message,
            key,
            invalidated,
        }
    }
}

/// Response body for DELETE /clear
#[derive(Debug, Serialize)]
pub struct ClearResponse {
    /// The glob pattern applied
    pub pattern: String,
    /// Number of entries removed
    pub cleared: usize,
}

impl ClearResponse {
    pub fn new(pattern: impl Into<String>, cleared: usize) -> Self {
        Self {
            pattern: pattern.into(),
            cleared,
        }
    }
}

/// Response body for GET /stats
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub stores: u64,
    pub deletes: u64,
    pub total_entries: usize,
    /// hits / (hits + misses)
    pub hit_rate: f64,
}

impl StatsResponse {
    pub fn from_stats(stats: &crate::cache::StoreStats) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            stores: stats.stores,
            deletes: stats.deletes,
            total_entries: stats.total_entries,
            hit_rate: stats.hit_rate(),
        }
    }
}

/// Response body for GET /health
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
