//! Request and Response models
//!
//! - `wire`: protobuf messages exchanged between cache nodes
//! - `requests` / `responses`: JSON DTOs for the API frontend

pub mod requests;
pub mod responses;
pub mod wire;

// Re-export commonly used types
pub use requests::ApiQuery;
pub use responses::{ErrorResponse, GetResponse, GroupStatsEntry, HealthResponse, StatsResponse};
pub use wire::{FetchRequest, FetchResponse};
