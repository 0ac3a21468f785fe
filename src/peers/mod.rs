//! Peers Module
//!
//! Capabilities a group uses to reach other cache nodes:
//! - [`PeerPicker`] chooses the node owning a key
//! - [`PeerGetter`] fetches a value from that node
//!
//! [`HttpPool`] implements both over HTTP.

mod http;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{FetchRequest, FetchResponse};

pub use http::{HttpGetter, HttpPool, PoolOptions, DEFAULT_BASE_PATH, DEFAULT_REPLICAS};

// == Peer Picker ==
/// Locates the peer that owns a key.
pub trait PeerPicker: Send + Sync {
    /// Returns the remote peer responsible for `key`, or `None` when the key
    /// should be served locally (including when it hashes to this node).
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>>;
}

// == Peer Getter ==
/// Fetches a value from a remote peer.
#[async_trait]
pub trait PeerGetter: Send + Sync {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, PeerError>;
}

// == Peer Error ==
/// Failure of a remote fetch. Never surfaced to readers: the group falls back
/// to its local loader.
#[derive(Error, Debug)]
pub enum PeerError {
    /// Connection, timeout or body read failure
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The peer answered with a non-success status
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The peer's body is not a valid response message
    #[error("decoding response: {0}")]
    Decode(#[from] prost::DecodeError),
}

impl PeerError {
    /// True when the peer reported the group or key as unknown (404).
    pub fn is_not_found(&self) -> bool {
        matches!(self, PeerError::Status { status: 404, .. })
    }

    /// True when the peer itself failed to serve the value (5xx).
    pub fn is_server_fault(&self) -> bool {
        matches!(self, PeerError::Status { status, .. } if *status >= 500)
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, PeerError::Transport(err) if err.is_timeout())
    }
}
