//! aggcache - TTL-bound caching for grouped-aggregation queries
//!
//! Cache-aside over a TTL-capable hash store: check the store, compute the
//! grouped statistic from the dataset on a miss, populate, return.

pub mod api;
pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use orchestrator::CacheOrchestrator;
pub use tasks::spawn_cleanup_task;
