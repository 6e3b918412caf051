//! Engine Module
//!
//! Grouped-aggregation computation over a delimited tabular dataset.

mod aggregate;
mod dataset;
mod func;

// Re-export public types
pub use aggregate::{round2, AggregationEngine};
pub use dataset::Dataset;
pub use func::AggFunc;
