//! API Module
//!
//! HTTP handlers and routing for the aggregation cache REST API.
//!
//! # Endpoints
//! - `GET /aggregate/:group_by/:column/:func` - Compute-or-fetch an aggregation
//! - `GET /value/:group_by/:column/:func/:field` - One field of a cached entry
//! - `DELETE /invalidate/:group_by/:column/:func` - Remove one entry
//! - `DELETE /clear` - Bulk-remove entries by pattern
//! - `GET /stats` - Store activity counters
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
