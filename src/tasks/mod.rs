//! Background Tasks Module
//!
//! Contains background tasks that run periodically during node operation.
//!
//! # Tasks
//! - Stats reporter: logs per-group cache statistics at a configured interval

mod stats_reporter;

pub use stats_reporter::spawn_stats_reporter;
