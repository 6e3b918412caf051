//! Models Module
//!
//! Request and response DTOs for the HTTP API.

pub mod requests;
pub mod responses;

pub use requests::{AggregateParams, ClearParams};
pub use responses::{
    AggregateResponse, ClearResponse, HealthResponse, InvalidateResponse, StatsResponse,
    ValueResponse,
};
