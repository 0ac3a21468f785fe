//! API Module
//!
//! HTTP handlers and routing for a cache node.
//!
//! # Endpoints
//! - `GET <base_path>:group/:key` - Serve a value to a peer (protobuf)
//! - `GET /api?key=<key>[&group=<group>]` - Read a value (JSON)
//! - `GET /stats` - Per-group cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::{create_api_router, create_peer_router};
