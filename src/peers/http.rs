//! HTTP Peer Pool
//!
//! Shards keys across peer base URLs with a [`HashRing`] and fetches remote
//! values over HTTP. The serving side lives in [`crate::api`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use prost::Message;
use reqwest::StatusCode;
use tracing::{debug, info};

use crate::models::{FetchRequest, FetchResponse};
use crate::peers::{PeerError, PeerGetter, PeerPicker};
use crate::ring::HashRing;

/// Path prefix under which peers serve each other.
pub const DEFAULT_BASE_PATH: &str = "/_peercache/";

/// Virtual nodes per peer on the hash ring.
pub const DEFAULT_REPLICAS: usize = 50;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

// == Pool Options ==
#[derive(Debug, Clone)]
pub struct PoolOptions {
    /// Path prefix, with leading and trailing slash
    pub base_path: String,
    /// Virtual nodes per peer
    pub replicas: usize,
    /// Deadline for a whole remote fetch
    pub timeout: Duration,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            base_path: DEFAULT_BASE_PATH.to_string(),
            replicas: DEFAULT_REPLICAS,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Ring and per-peer getters, replaced together by `set`.
struct PoolState {
    ring: HashRing,
    getters: HashMap<String, Arc<HttpGetter>>,
}

// == HTTP Pool ==
/// Peer picker over a set of HTTP peers identified by base URL,
/// e.g. `http://10.0.0.2:8008`.
pub struct HttpPool {
    /// This node's base URL
    self_url: String,
    options: PoolOptions,
    client: reqwest::Client,
    state: Mutex<PoolState>,
}

impl HttpPool {
    // == Constructor ==
    /// Creates an empty pool for the node reachable at `self_url`.
    pub fn new(self_url: impl Into<String>, options: PoolOptions) -> Result<Self, PeerError> {
        let client = reqwest::Client::builder()
            .timeout(options.timeout)
            .build()?;
        let ring = HashRing::new(options.replicas, None);
        Ok(Self {
            self_url: self_url.into(),
            options,
            client,
            state: Mutex::new(PoolState {
                ring,
                getters: HashMap::new(),
            }),
        })
    }

    // == Set ==
    /// Replaces the peer set. The list should include this node's own URL so
    /// every node builds the same ring.
    pub fn set<I, S>(&self, peers: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let peers: Vec<String> = peers.into_iter().map(Into::into).collect();
        let mut ring = HashRing::new(self.options.replicas, None);
        ring.add(&peers);
        let getters = peers
            .iter()
            .map(|peer| {
                let getter = HttpGetter {
                    base_url: format!("{}{}", peer, self.options.base_path),
                    client: self.client.clone(),
                };
                (peer.clone(), Arc::new(getter))
            })
            .collect();

        let mut state = self.state.lock();
        *state = PoolState { ring, getters };
        info!(node = %self.self_url, peers = peers.len(), "peer set updated");
    }

    pub fn self_url(&self) -> &str {
        &self.self_url
    }

    pub fn base_path(&self) -> &str {
        &self.options.base_path
    }
}

impl PeerPicker for HttpPool {
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>> {
        let state = self.state.lock();
        let peer = state.ring.get(key)?;
        if peer == self.self_url {
            return None;
        }
        debug!(node = %self.self_url, peer, key, "picked peer");
        let getter = state.getters.get(peer)?;
        Some(Arc::clone(getter) as Arc<dyn PeerGetter>)
    }
}

impl std::fmt::Debug for HttpPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpPool")
            .field("self_url", &self.self_url)
            .field("options", &self.options)
            .finish()
    }
}

// == HTTP Getter ==
/// Fetches values from one peer at `<peer><base_path><group>/<key>`.
#[derive(Debug, Clone)]
pub struct HttpGetter {
    base_url: String,
    client: reqwest::Client,
}

impl HttpGetter {
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, request: &FetchRequest) -> String {
        format!(
            "{}{}/{}",
            self.base_url,
            urlencoding::encode(&request.group),
            urlencoding::encode(&request.key)
        )
    }
}

#[async_trait]
impl PeerGetter for HttpGetter {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, PeerError> {
        let res = self.client.get(self.url_for(request)).send().await?;

        let status = res.status();
        if status != StatusCode::OK {
            let message = res.text().await.unwrap_or_default();
            return Err(PeerError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body = res.bytes().await?;
        Ok(FetchResponse::decode(body)?)
    }
}
