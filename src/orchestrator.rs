//! Cache Orchestrator Module
//!
//! Cache-aside composition of store, engine and codec: check the store,
//! compute on miss, populate, return. Also exposes the lifecycle
//! operations on cached entries (invalidate, bulk clear).
//!
//! There is no state machine beyond each entry's presence or absence, and
//! no sweeping here: TTL expiry is the store's job. Concurrent misses for
//! one key race benignly; `set_hash` replaces the field map wholesale, so
//! the loser's write leaves a complete result, only wasted work.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tracing::info;

use crate::cache::{codec, CacheStore, FieldValue};
use crate::engine::{AggFunc, AggregationEngine, Dataset};
use crate::error::{CacheError, Result};

/// Default TTL in seconds for cached aggregation entries.
pub const DEFAULT_TTL_SECONDS: u64 = 900;

// == Cache Key ==
/// Derives the cache key for an aggregation request.
///
/// Pure function of its three inputs; identical inputs always produce the
/// byte-identical key, across calls and processes. The format is part of
/// the wire contract with other consumers of the store.
pub fn cache_key(group_by: &str, column: &str, func: &str) -> String {
    format!("cache:{}_{}_per_{}", func, column, group_by)
}

/// The query identifier used in logs and responses (the key without its
/// `cache:` prefix).
pub fn query_id(group_by: &str, column: &str, func: &str) -> String {
    format!("{}_{}_per_{}", func, column, group_by)
}

// == Aggregation Outcome ==
/// Result of a compute-or-fetch call.
///
/// On a hit every value passed through the codec and numeric-looking text
/// may surface as a number; on a miss the engine's native result is
/// returned untouched. Callers must tolerate that representation
/// difference for identical parameters.
#[derive(Debug)]
pub struct AggregationOutcome {
    /// Query identifier (`{func}_{column}_per_{group_by}`)
    pub query: String,
    /// True if served from the store without computing
    pub cached: bool,
    /// Remaining TTL of the entry, when known
    pub ttl_remaining: Option<u64>,
    /// Group value -> aggregate
    pub result: BTreeMap<String, FieldValue>,
}

// == Cache Orchestrator ==
pub struct CacheOrchestrator {
    store: Arc<dyn CacheStore>,
    default_ttl: u64,
}

impl CacheOrchestrator {
    // == Constructor ==
    /// Wires the orchestrator to a store, probing connectivity first.
    ///
    /// A store that does not answer the probe fails construction with
    /// `CacheError::Connection`; this is the only fatal-at-startup
    /// condition and the caller is expected to halt on it.
    pub fn connect(store: Arc<dyn CacheStore>, default_ttl: u64) -> Result<Self> {
        store
            .ping()
            .map_err(|e| CacheError::Connection(e.to_string()))?;
        Ok(Self { store, default_ttl })
    }

    // == Compute Aggregation ==
    /// Compute-or-fetch for one aggregation request.
    ///
    /// The key is derived before any validation, mirroring the lookup
    /// order of the stored contract: a seeded entry is served even for
    /// requests that would fail validation on the computation path.
    /// Validation failures are never cached.
    pub fn compute_aggregation(
        &self,
        group_by: &str,
        column: &str,
        func: &str,
        dataset_path: &Path,
        ttl_seconds: Option<u64>,
    ) -> Result<AggregationOutcome> {
        let query = query_id(group_by, column, func);
        let key = cache_key(group_by, column, func);

        let start = Instant::now();
        if let Some(fields) = self.store.get_hash(&key)? {
            if !fields.is_empty() {
                let ttl = self.store.ttl_remaining(&key)?;
                info!(
                    query = %query,
                    elapsed_ms = elapsed_ms(start),
                    ttl = ttl,
                    "Cache hit"
                );
                let result = fields
                    .into_iter()
                    .map(|(group, raw)| (group, codec::decode(&raw)))
                    .collect();
                return Ok(AggregationOutcome {
                    query,
                    cached: true,
                    ttl_remaining: ttl,
                    result,
                });
            }
        }
        info!(query = %query, elapsed_ms = elapsed_ms(start), "Cache miss");

        let func: AggFunc = func.parse()?;

        let start = Instant::now();
        let dataset = Dataset::open(dataset_path)?;
        let computed = AggregationEngine::aggregate(&dataset, group_by, column, func)?;
        info!(
            query = %query,
            elapsed_ms = elapsed_ms(start),
            "Computed from dataset"
        );

        let encoded = computed
            .iter()
            .map(|(group, value)| (group.clone(), codec::encode(&FieldValue::Number(*value))))
            .collect();
        let ttl = ttl_seconds.unwrap_or(self.default_ttl);
        self.store.set_hash(&key, encoded, ttl)?;
        info!(query = %query, ttl = ttl, "Cached result");

        // Fresh path: the native result, not passed back through the decoder
        let result = computed
            .into_iter()
            .map(|(group, value)| (group, FieldValue::Number(value)))
            .collect();
        Ok(AggregationOutcome {
            query,
            cached: false,
            ttl_remaining: Some(ttl),
            result,
        })
    }

    // == Get Single Value ==
    /// Fetches one field of a cached entry without retrieving the whole
    /// hash. Absent key or field yields None; present values are decoded.
    pub fn get_single_value(
        &self,
        group_by: &str,
        column: &str,
        func: &str,
        field: &str,
    ) -> Result<Option<FieldValue>> {
        let query = query_id(group_by, column, func);
        let key = cache_key(group_by, column, func);
        let field = field.trim();

        let start = Instant::now();
        match self.store.get_field(&key, field)? {
            Some(raw) => {
                let ttl = self.store.ttl_remaining(&key)?;
                info!(
                    query = %query,
                    field = %field,
                    elapsed_ms = elapsed_ms(start),
                    ttl = ttl,
                    "Cache hit"
                );
                Ok(Some(codec::decode(&raw)))
            }
            None => {
                info!(query = %query, field = %field, "Cache miss");
                Ok(None)
            }
        }
    }

    // == Invalidate ==
    /// Deletes one entry. Returns true if a live entry existed.
    pub fn invalidate(&self, key: &str) -> Result<bool> {
        let start = Instant::now();
        let removed = self.store.delete(key)?;
        if removed {
            info!(key = %key, elapsed_ms = elapsed_ms(start), "Invalidated cache entry");
        } else {
            info!(key = %key, elapsed_ms = elapsed_ms(start), "No cache entry to invalidate");
        }
        Ok(removed)
    }

    // == Clear All ==
    /// Bulk-deletes entries matching `pattern` (default `cache:*`).
    /// Returns the number removed, 0 if none matched.
    pub fn clear_all(&self, pattern: Option<&str>) -> Result<usize> {
        let pattern = pattern.unwrap_or("cache:*");
        let start = Instant::now();
        let removed = self.store.delete_by_pattern(pattern)?;
        info!(
            pattern = %pattern,
            removed = removed,
            elapsed_ms = elapsed_ms(start),
            "Cleared cache entries"
        );
        Ok(removed)
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    (start.elapsed().as_secs_f64() * 1000.0 * 100.0).round() / 100.0
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStore;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const FLIGHTS: &str = "AIRLINE,ARRIVAL_DELAY\nAA,10\nAA,20\nUA,5\n";

    fn flights_file() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(FLIGHTS.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn orchestrator() -> (CacheOrchestrator, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::default());
        let orch = CacheOrchestrator::connect(store.clone(), DEFAULT_TTL_SECONDS).unwrap();
        (orch, store)
    }

    struct UnreachableStore;

    impl CacheStore for UnreachableStore {
        fn ping(&self) -> Result<()> {
            Err(CacheError::StoreUnavailable("connection refused".to_string()))
        }
        fn exists(&self, _: &str) -> Result<bool> {
            unreachable!()
        }
        fn set_hash(&self, _: &str, _: HashMap<String, String>, _: u64) -> Result<()> {
            unreachable!()
        }
        fn get_hash(&self, _: &str) -> Result<Option<HashMap<String, String>>> {
            unreachable!()
        }
        fn get_field(&self, _: &str, _: &str) -> Result<Option<String>> {
            unreachable!()
        }
        fn field_exists(&self, _: &str, _: &str) -> Result<bool> {
            unreachable!()
        }
        fn ttl_remaining(&self, _: &str) -> Result<Option<u64>> {
            unreachable!()
        }
        fn delete(&self, _: &str) -> Result<bool> {
            unreachable!()
        }
        fn delete_by_pattern(&self, _: &str) -> Result<usize> {
            unreachable!()
        }
        fn purge_expired(&self) -> Result<usize> {
            unreachable!()
        }
        fn stats(&self) -> Result<crate::cache::StoreStats> {
            unreachable!()
        }
    }

    #[test]
    fn test_cache_key_format() {
        assert_eq!(
            cache_key("AIRLINE", "ARRIVAL_DELAY", "mean"),
            "cache:mean_ARRIVAL_DELAY_per_AIRLINE"
        );
    }

    #[test]
    fn test_cache_key_stability() {
        let a = cache_key("AIRLINE", "ARRIVAL_DELAY", "std");
        let b = cache_key("AIRLINE", "ARRIVAL_DELAY", "std");
        assert_eq!(a, b);
    }

    #[test]
    fn test_connect_fails_fast_on_unreachable_store() {
        let result = CacheOrchestrator::connect(Arc::new(UnreachableStore), DEFAULT_TTL_SECONDS);
        assert!(matches!(result, Err(CacheError::Connection(_))));
    }

    #[test]
    fn test_mean_scenario() {
        let (orch, _) = orchestrator();
        let file = flights_file();

        let outcome = orch
            .compute_aggregation("AIRLINE", "ARRIVAL_DELAY", "mean", file.path(), None)
            .unwrap();

        assert!(!outcome.cached);
        assert_eq!(outcome.query, "mean_ARRIVAL_DELAY_per_AIRLINE");
        assert_eq!(outcome.result["AA"], FieldValue::Number(15.0));
        assert_eq!(outcome.result["UA"], FieldValue::Number(5.0));
    }

    #[test]
    fn test_hit_after_miss() {
        let (orch, store) = orchestrator();
        let file = flights_file();

        let first = orch
            .compute_aggregation("AIRLINE", "ARRIVAL_DELAY", "mean", file.path(), None)
            .unwrap();
        assert!(!first.cached);
        assert_eq!(store.stats().unwrap().stores, 1);

        // Remove the dataset: a second identical call must be served
        // entirely from the store, with zero computation.
        let path = file.path().to_path_buf();
        drop(file);

        let second = orch
            .compute_aggregation("AIRLINE", "ARRIVAL_DELAY", "mean", &path, None)
            .unwrap();
        assert!(second.cached);
        assert_eq!(second.result, first.result);
        assert_eq!(store.stats().unwrap().stores, 1);
    }

    #[test]
    fn test_validation_error_is_not_cached() {
        let (orch, store) = orchestrator();
        let file = flights_file();

        let err = orch
            .compute_aggregation("NOPE", "ARRIVAL_DELAY", "mean", file.path(), None)
            .unwrap_err();
        assert!(matches!(err, CacheError::Validation(_)));
        assert!(err.to_string().contains("NOPE"));

        assert!(!store
            .exists(&cache_key("NOPE", "ARRIVAL_DELAY", "mean"))
            .unwrap());
    }

    #[test]
    fn test_unsupported_function() {
        let (orch, _) = orchestrator();
        let file = flights_file();

        let err = orch
            .compute_aggregation("AIRLINE", "ARRIVAL_DELAY", "median", file.path(), None)
            .unwrap_err();
        assert!(matches!(err, CacheError::Validation(_)));
        assert!(err.to_string().contains("median"));
    }

    #[test]
    fn test_get_single_value() {
        let (orch, _) = orchestrator();
        let file = flights_file();

        orch.compute_aggregation("AIRLINE", "ARRIVAL_DELAY", "mean", file.path(), None)
            .unwrap();

        let value = orch
            .get_single_value("AIRLINE", "ARRIVAL_DELAY", "mean", "AA")
            .unwrap();
        assert_eq!(value, Some(FieldValue::Number(15.0)));

        // Lookup normalizes surrounding whitespace
        let value = orch
            .get_single_value("AIRLINE", "ARRIVAL_DELAY", "mean", " AA ")
            .unwrap();
        assert_eq!(value, Some(FieldValue::Number(15.0)));

        let absent = orch
            .get_single_value("AIRLINE", "ARRIVAL_DELAY", "mean", "DL")
            .unwrap();
        assert_eq!(absent, None);
    }

    #[test]
    fn test_get_single_value_absent_key() {
        let (orch, _) = orchestrator();
        let value = orch
            .get_single_value("AIRLINE", "ARRIVAL_DELAY", "mean", "AA")
            .unwrap();
        assert_eq!(value, None);
    }

    #[test]
    fn test_invalidate() {
        let (orch, _) = orchestrator();
        let file = flights_file();

        orch.compute_aggregation("AIRLINE", "ARRIVAL_DELAY", "mean", file.path(), None)
            .unwrap();

        let key = cache_key("AIRLINE", "ARRIVAL_DELAY", "mean");
        assert!(orch.invalidate(&key).unwrap());
        assert!(!orch.invalidate(&key).unwrap());
    }

    #[test]
    fn test_clear_all() {
        let (orch, _) = orchestrator();
        let file = flights_file();

        orch.compute_aggregation("AIRLINE", "ARRIVAL_DELAY", "mean", file.path(), None)
            .unwrap();
        orch.compute_aggregation("AIRLINE", "ARRIVAL_DELAY", "max", file.path(), None)
            .unwrap();

        assert_eq!(orch.clear_all(None).unwrap(), 2);
        assert_eq!(orch.clear_all(None).unwrap(), 0);
    }

    #[test]
    fn test_hit_path_decodes_nan_as_text() {
        let (orch, _) = orchestrator();
        let file = flights_file();

        // UA has a single sample, so its sample std is NaN
        let fresh = orch
            .compute_aggregation("AIRLINE", "ARRIVAL_DELAY", "std", file.path(), None)
            .unwrap();
        match fresh.result["UA"] {
            FieldValue::Number(n) => assert!(n.is_nan()),
            ref other => panic!("fresh path should be numeric, got {:?}", other),
        }

        // On the hit path the stored "NaN" string fails the digits
        // heuristic and comes back as text. Documented asymmetry.
        let hit = orch
            .compute_aggregation("AIRLINE", "ARRIVAL_DELAY", "std", file.path(), None)
            .unwrap();
        assert!(hit.cached);
        assert_eq!(hit.result["UA"], FieldValue::Text("NaN".to_string()));
        assert_eq!(hit.result["AA"], FieldValue::Number(7.07));
    }

    #[test]
    fn test_ttl_override() {
        let (orch, store) = orchestrator();
        let file = flights_file();

        orch.compute_aggregation("AIRLINE", "ARRIVAL_DELAY", "mean", file.path(), Some(60))
            .unwrap();

        let ttl = store
            .ttl_remaining(&cache_key("AIRLINE", "ARRIVAL_DELAY", "mean"))
            .unwrap()
            .unwrap();
        assert!(ttl <= 60 && ttl >= 59);
    }

    #[test]
    fn test_ttl_expiry_forces_recompute() {
        let (orch, _) = orchestrator();
        let file = flights_file();

        orch.compute_aggregation("AIRLINE", "ARRIVAL_DELAY", "mean", file.path(), Some(1))
            .unwrap();

        std::thread::sleep(std::time::Duration::from_millis(1100));

        let outcome = orch
            .compute_aggregation("AIRLINE", "ARRIVAL_DELAY", "mean", file.path(), None)
            .unwrap();
        assert!(!outcome.cached);
    }
}
