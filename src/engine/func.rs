//! Aggregation Function Module
//!
//! The closed set of supported statistics and their pure computation
//! routines. Selection is an explicit match, so an unsupported name is
//! rejected at parse time and can never reach the computation path.

use std::fmt;
use std::str::FromStr;

use crate::error::CacheError;

// == Aggregation Function ==
/// The fixed set of supported grouped statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggFunc {
    Mean,
    Min,
    Max,
    Std,
    Sum,
    Count,
}

impl AggFunc {
    /// Canonical lowercase name, as used in cache keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            AggFunc::Mean => "mean",
            AggFunc::Min => "min",
            AggFunc::Max => "max",
            AggFunc::Std => "std",
            AggFunc::Sum => "sum",
            AggFunc::Count => "count",
        }
    }

    // == Apply ==
    /// Computes this statistic over one group's samples.
    ///
    /// `values` holds the numeric samples of the target column;
    /// `non_empty` counts rows whose target cell was present at all,
    /// which is what `count` reports.
    pub fn apply(&self, values: &[f64], non_empty: usize) -> f64 {
        match self {
            AggFunc::Mean => mean(values),
            AggFunc::Min => min(values),
            AggFunc::Max => max(values),
            AggFunc::Std => std_dev(values),
            AggFunc::Sum => sum(values),
            AggFunc::Count => non_empty as f64,
        }
    }
}

impl fmt::Display for AggFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AggFunc {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mean" => Ok(AggFunc::Mean),
            "min" => Ok(AggFunc::Min),
            "max" => Ok(AggFunc::Max),
            "std" => Ok(AggFunc::Std),
            "sum" => Ok(AggFunc::Sum),
            "count" => Ok(AggFunc::Count),
            other => Err(CacheError::Validation(format!(
                "Unsupported aggregation function: {}",
                other
            ))),
        }
    }
}

// == Computation Routines ==

fn sum(values: &[f64]) -> f64 {
    values.iter().sum()
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        f64::NAN
    } else {
        sum(values) / values.len() as f64
    }
}

fn min(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NAN, f64::min)
}

fn max(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NAN, f64::max)
}

/// Sample standard deviation (n - 1 denominator).
/// Fewer than two samples has no spread to estimate and yields NaN.
fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let variance =
        values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_supported() {
        for name in ["mean", "min", "max", "std", "sum", "count"] {
            let func: AggFunc = name.parse().unwrap();
            assert_eq!(func.as_str(), name);
        }
    }

    #[test]
    fn test_parse_unsupported_names_input() {
        let err = "median".parse::<AggFunc>().unwrap_err();
        assert!(matches!(err, CacheError::Validation(_)));
        assert!(err.to_string().contains("median"));
    }

    #[test]
    fn test_mean() {
        assert_eq!(AggFunc::Mean.apply(&[10.0, 20.0], 2), 15.0);
    }

    #[test]
    fn test_min_max() {
        let values = [3.0, -1.0, 7.5];
        assert_eq!(AggFunc::Min.apply(&values, 3), -1.0);
        assert_eq!(AggFunc::Max.apply(&values, 3), 7.5);
    }

    #[test]
    fn test_sum() {
        assert_eq!(AggFunc::Sum.apply(&[1.5, 2.5], 2), 4.0);
        // Sum over no samples is zero, not NaN
        assert_eq!(AggFunc::Sum.apply(&[], 0), 0.0);
    }

    #[test]
    fn test_count_uses_non_empty() {
        // Two rows had cells but only one parsed numerically
        assert_eq!(AggFunc::Count.apply(&[5.0], 2), 2.0);
    }

    #[test]
    fn test_std_sample() {
        // Sample std of [10, 20] = sqrt(50) ~ 7.0711
        let std = AggFunc::Std.apply(&[10.0, 20.0], 2);
        assert!((std - 50.0_f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_std_single_sample_is_nan() {
        assert!(AggFunc::Std.apply(&[5.0], 1).is_nan());
    }

    #[test]
    fn test_mean_empty_is_nan() {
        assert!(AggFunc::Mean.apply(&[], 0).is_nan());
        assert!(AggFunc::Min.apply(&[], 0).is_nan());
    }
}
