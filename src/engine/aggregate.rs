//! Aggregation Engine Module
//!
//! Computes grouped statistics over a dataset for one
//! (group-by, column, function) request. The engine holds no cross-call
//! state; the orchestrator only invokes it on a confirmed cache miss.

use std::collections::BTreeMap;

use crate::engine::{AggFunc, Dataset};
use crate::error::{CacheError, Result};

// == Group Samples ==
/// Per-group accumulator over the target column.
#[derive(Debug, Default)]
struct GroupSamples {
    /// Cells that parsed as numbers
    values: Vec<f64>,
    /// Cells that were present at all (what `count` reports)
    non_empty: usize,
}

// == Aggregation Engine ==
pub struct AggregationEngine;

impl AggregationEngine {
    /// Partitions `dataset` rows by `group_by` and computes `func` over
    /// `column` within each partition, rounding every result to 2 decimals.
    ///
    /// Both columns must exist in the dataset schema; a missing column is a
    /// validation error naming the offending column, never a store error.
    /// Cells that do not parse as numbers are treated as missing for the
    /// numeric statistics.
    pub fn aggregate(
        dataset: &Dataset,
        group_by: &str,
        column: &str,
        func: AggFunc,
    ) -> Result<BTreeMap<String, f64>> {
        let group_idx = dataset
            .column_index(group_by)
            .ok_or_else(|| CacheError::Validation(format!("Column not found: {}", group_by)))?;
        let target_idx = dataset
            .column_index(column)
            .ok_or_else(|| CacheError::Validation(format!("Column not found: {}", column)))?;

        let mut groups: BTreeMap<String, GroupSamples> = BTreeMap::new();

        for row in dataset.rows() {
            let Some(group_value) = row.get(group_idx) else {
                continue;
            };
            let samples = groups.entry(group_value.to_string()).or_default();

            if let Some(cell) = row.get(target_idx) {
                let cell = cell.trim();
                if !cell.is_empty() {
                    samples.non_empty += 1;
                    if let Ok(value) = cell.parse::<f64>() {
                        samples.values.push(value);
                    }
                }
            }
        }

        Ok(groups
            .into_iter()
            .map(|(group, samples)| {
                let value = func.apply(&samples.values, samples.non_empty);
                (group, round2(value))
            })
            .collect())
    }
}

// == Rounding ==
/// Rounds to 2 decimal places (NaN passes through).
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn dataset(raw: &str) -> Dataset {
        Dataset::from_reader(Cursor::new(raw.to_string())).unwrap()
    }

    const FLIGHTS: &str = "AIRLINE,ARRIVAL_DELAY\nAA,10\nAA,20\nUA,5\n";

    #[test]
    fn test_mean_per_group() {
        let ds = dataset(FLIGHTS);
        let result =
            AggregationEngine::aggregate(&ds, "AIRLINE", "ARRIVAL_DELAY", AggFunc::Mean).unwrap();

        assert_eq!(result["AA"], 15.0);
        assert_eq!(result["UA"], 5.0);
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_min_max_sum_count() {
        let ds = dataset(FLIGHTS);

        let min =
            AggregationEngine::aggregate(&ds, "AIRLINE", "ARRIVAL_DELAY", AggFunc::Min).unwrap();
        assert_eq!(min["AA"], 10.0);

        let max =
            AggregationEngine::aggregate(&ds, "AIRLINE", "ARRIVAL_DELAY", AggFunc::Max).unwrap();
        assert_eq!(max["AA"], 20.0);

        let sum =
            AggregationEngine::aggregate(&ds, "AIRLINE", "ARRIVAL_DELAY", AggFunc::Sum).unwrap();
        assert_eq!(sum["AA"], 30.0);

        let count =
            AggregationEngine::aggregate(&ds, "AIRLINE", "ARRIVAL_DELAY", AggFunc::Count).unwrap();
        assert_eq!(count["AA"], 2.0);
        assert_eq!(count["UA"], 1.0);
    }

    #[test]
    fn test_std_rounded() {
        let ds = dataset(FLIGHTS);
        let result =
            AggregationEngine::aggregate(&ds, "AIRLINE", "ARRIVAL_DELAY", AggFunc::Std).unwrap();

        // sqrt(50) = 7.0710... -> 7.07
        assert_eq!(result["AA"], 7.07);
        // Single sample has no sample deviation
        assert!(result["UA"].is_nan());
    }

    #[test]
    fn test_unknown_group_column() {
        let ds = dataset(FLIGHTS);
        let err =
            AggregationEngine::aggregate(&ds, "NOPE", "ARRIVAL_DELAY", AggFunc::Mean).unwrap_err();

        assert!(matches!(err, CacheError::Validation(_)));
        assert!(err.to_string().contains("NOPE"));
    }

    #[test]
    fn test_unknown_target_column() {
        let ds = dataset(FLIGHTS);
        let err = AggregationEngine::aggregate(&ds, "AIRLINE", "MISSING", AggFunc::Mean)
            .unwrap_err();

        assert!(matches!(err, CacheError::Validation(_)));
        assert!(err.to_string().contains("MISSING"));
    }

    #[test]
    fn test_empty_cells_are_missing() {
        let ds = dataset("AIRLINE,ARRIVAL_DELAY\nAA,10\nAA,\nAA,20\n");
        let result =
            AggregationEngine::aggregate(&ds, "AIRLINE", "ARRIVAL_DELAY", AggFunc::Mean).unwrap();

        // The empty cell does not drag the mean down
        assert_eq!(result["AA"], 15.0);

        let count =
            AggregationEngine::aggregate(&ds, "AIRLINE", "ARRIVAL_DELAY", AggFunc::Count).unwrap();
        assert_eq!(count["AA"], 2.0);
    }

    #[test]
    fn test_negative_values() {
        let ds = dataset("AIRLINE,ARRIVAL_DELAY\nAA,-12\nAA,2\n");
        let result =
            AggregationEngine::aggregate(&ds, "AIRLINE", "ARRIVAL_DELAY", AggFunc::Mean).unwrap();

        assert_eq!(result["AA"], -5.0);
    }

    #[test]
    fn test_rounding_to_two_decimals() {
        let ds = dataset("AIRLINE,ARRIVAL_DELAY\nAA,1\nAA,1\nAA,2\n");
        let result =
            AggregationEngine::aggregate(&ds, "AIRLINE", "ARRIVAL_DELAY", AggFunc::Mean).unwrap();

        // 4/3 = 1.3333... -> 1.33
        assert_eq!(result["AA"], 1.33);
    }

    #[test]
    fn test_empty_dataset_yields_no_groups() {
        let ds = dataset("AIRLINE,ARRIVAL_DELAY\n");
        let result =
            AggregationEngine::aggregate(&ds, "AIRLINE", "ARRIVAL_DELAY", AggFunc::Mean).unwrap();

        assert!(result.is_empty());
    }

    #[test]
    fn test_determinism() {
        let ds = dataset(FLIGHTS);
        let a = AggregationEngine::aggregate(&ds, "AIRLINE", "ARRIVAL_DELAY", AggFunc::Mean)
            .unwrap();
        let b = AggregationEngine::aggregate(&ds, "AIRLINE", "ARRIVAL_DELAY", AggFunc::Mean)
            .unwrap();

        assert_eq!(a, b);
    }
}
