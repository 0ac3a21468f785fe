//! Configuration Module
//!
//! Handles loading node configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::peers::{PoolOptions, DEFAULT_BASE_PATH, DEFAULT_REPLICAS};

/// Node configuration parameters.
///
/// All values can be configured via environment variables with sensible
/// defaults. Unparseable values fall back to the default.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port of the peer endpoint listener
    pub server_port: u16,
    /// Base URL other nodes reach this one at
    pub self_url: String,
    /// Base URLs of every node in the cluster, this one included
    pub peers: Vec<String>,
    /// Port of the client API listener; disabled when unset
    pub api_port: Option<u16>,
    /// Name of the group this node serves
    pub group_name: String,
    /// Byte budget of the group's cache (0 = unlimited)
    pub cache_bytes: usize,
    /// Path prefix of the peer endpoint
    pub base_path: String,
    /// Virtual nodes per peer on the hash ring
    pub replicas: usize,
    /// Deadline for a remote fetch, in milliseconds
    pub peer_timeout_ms: u64,
    /// Stats reporting interval in seconds (0 = disabled)
    pub stats_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - Peer endpoint port (default: 8001)
    /// - `SELF_URL` - This node's base URL (default: http://localhost:<SERVER_PORT>)
    /// - `PEERS` - Comma-separated peer base URLs (default: SELF_URL)
    /// - `API_PORT` - Client API port (default: disabled)
    /// - `GROUP_NAME` - Group served by this node (default: scores)
    /// - `CACHE_BYTES` - Cache byte budget (default: 2048)
    /// - `BASE_PATH` - Peer endpoint path prefix (default: /_peercache/)
    /// - `REPLICAS` - Virtual nodes per peer (default: 50)
    /// - `PEER_TIMEOUT_MS` - Remote fetch deadline (default: 3000)
    /// - `STATS_INTERVAL` - Stats reporting interval in seconds (default: 30)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let server_port = parse_var("SERVER_PORT").unwrap_or(defaults.server_port);
        let self_url = non_empty_var("SELF_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| default_self_url(server_port));
        let peers = non_empty_var("PEERS")
            .map(|v| parse_peers(&v))
            .filter(|peers| !peers.is_empty())
            .unwrap_or_else(|| vec![self_url.clone()]);

        Self {
            server_port,
            self_url,
            peers,
            api_port: parse_var("API_PORT"),
            group_name: non_empty_var("GROUP_NAME").unwrap_or(defaults.group_name),
            cache_bytes: parse_var("CACHE_BYTES").unwrap_or(defaults.cache_bytes),
            base_path: non_empty_var("BASE_PATH")
                .map(|v| normalize_base_path(&v))
                .unwrap_or(defaults.base_path),
            replicas: parse_var("REPLICAS")
                .filter(|r| *r > 0)
                .unwrap_or(defaults.replicas),
            peer_timeout_ms: parse_var("PEER_TIMEOUT_MS").unwrap_or(defaults.peer_timeout_ms),
            stats_interval: parse_var("STATS_INTERVAL").unwrap_or(defaults.stats_interval),
        }
    }

    /// Options for the node's peer pool.
    pub fn pool_options(&self) -> PoolOptions {
        PoolOptions {
            base_path: self.base_path.clone(),
            replicas: self.replicas,
            timeout: Duration::from_millis(self.peer_timeout_ms),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let server_port = 8001;
        let self_url = default_self_url(server_port);
        Self {
            server_port,
            peers: vec![self_url.clone()],
            self_url,
            api_port: None,
            group_name: "scores".to_string(),
            cache_bytes: 2 << 10,
            base_path: DEFAULT_BASE_PATH.to_string(),
            replicas: DEFAULT_REPLICAS,
            peer_timeout_ms: 3000,
            stats_interval: 30,
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    non_empty_var(name).and_then(|v| v.parse().ok())
}

fn default_self_url(port: u16) -> String {
    format!("http://localhost:{port}")
}

/// Splits a comma-separated peer list, dropping blanks and trailing slashes.
fn parse_peers(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|p| p.trim().trim_end_matches('/'))
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Ensures the path starts and ends with `/`.
fn normalize_base_path(raw: &str) -> String {
    let trimmed = raw.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{trimmed}/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server_port, 8001);
        assert_eq!(config.self_url, "http://localhost:8001");
        assert_eq!(config.peers, vec!["http://localhost:8001"]);
        assert_eq!(config.api_port, None);
        assert_eq!(config.group_name, "scores");
        assert_eq!(config.cache_bytes, 2048);
        assert_eq!(config.base_path, "/_peercache/");
        assert_eq!(config.replicas, 50);
        assert_eq!(config.stats_interval, 30);
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        for var in [
            "SERVER_PORT",
            "SELF_URL",
            "PEERS",
            "API_PORT",
            "GROUP_NAME",
            "CACHE_BYTES",
            "BASE_PATH",
            "REPLICAS",
            "PEER_TIMEOUT_MS",
            "STATS_INTERVAL",
        ] {
            env::remove_var(var);
        }

        let config = Config::from_env();
        assert_eq!(config.server_port, 8001);
        assert_eq!(config.peers, vec![config.self_url.clone()]);
        assert_eq!(config.cache_bytes, 2048);
        assert_eq!(config.pool_options().timeout, Duration::from_millis(3000));
    }

    #[test]
    fn test_parse_peers() {
        assert_eq!(
            parse_peers(" http://a:8001/, ,http://b:8002 "),
            vec!["http://a:8001", "http://b:8002"]
        );
        assert!(parse_peers(",,").is_empty());
    }

    #[test]
    fn test_normalize_base_path() {
        assert_eq!(normalize_base_path("_peercache"), "/_peercache/");
        assert_eq!(normalize_base_path("/cache/"), "/cache/");
        assert_eq!(normalize_base_path("/"), "/");
    }
}
