//! API Handlers
//!
//! HTTP request handlers for the peer endpoint and the API frontend.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use prost::Message;
use tracing::debug;

use crate::error::{CacheError, Result};
use crate::group::{Group, GroupRegistry};
use crate::models::{
    ApiQuery, FetchResponse, GetResponse, GroupStatsEntry, HealthResponse, StatsResponse,
};

/// Content type of protobuf bodies served to peers.
pub const PROTOBUF_CONTENT_TYPE: &str = "application/octet-stream";

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Groups served by this node
    pub registry: Arc<GroupRegistry>,
    /// Group read by `/api` when the query names none
    pub default_group: String,
    /// Base URL of this node, reported by `/stats`
    pub node: String,
}

impl AppState {
    pub fn new(
        registry: Arc<GroupRegistry>,
        default_group: impl Into<String>,
        node: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            default_group: default_group.into(),
            node: node.into(),
        }
    }

    fn group(&self, name: &str) -> Result<Arc<Group>> {
        self.registry
            .get_group(name)
            .ok_or_else(|| CacheError::GroupNotFound(name.to_string()))
    }
}

/// Handler for GET `<base_path>:group/:key`
///
/// Serves a value to a remote peer as a protobuf `FetchResponse`.
pub async fn peer_handler(
    State(state): State<AppState>,
    Path((group, key)): Path<(String, String)>,
) -> Result<Response> {
    debug!(node = %state.node, group = %group, key = %key, "peer request");
    let view = state.group(&group)?.get(&key).await?;

    let body = FetchResponse {
        value: view.byte_slice(),
    }
    .encode_to_vec();
    Ok(([(header::CONTENT_TYPE, PROTOBUF_CONTENT_TYPE)], body).into_response())
}

/// Handler for GET /api?key=<key>[&group=<group>]
pub async fn api_get_handler(
    State(state): State<AppState>,
    Query(query): Query<ApiQuery>,
) -> Result<Json<GetResponse>> {
    if let Some(error_msg) = query.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let group = state.group(query.group_or(&state.default_group))?;
    let view = group.get(&query.key).await?;

    Ok(Json(GetResponse::new(
        group.name(),
        query.key,
        view.to_string_lossy(),
    )))
}

/// Handler for GET /stats
///
/// Returns a snapshot of every group's counters.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let groups = state
        .registry
        .groups()
        .iter()
        .map(|group| GroupStatsEntry::new(group.name(), group.cache_bytes(), group.stats()))
        .collect();

    Json(StatsResponse {
        node: state.node.clone(),
        groups,
    })
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
