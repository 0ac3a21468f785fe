//! Response DTOs for the API frontend

use serde::Serialize;

use crate::cache::CacheStats;

/// Response body for `GET /api`
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    pub group: String,
    pub key: String,
    /// The value, decoded as UTF-8 (lossy)
    pub value: String,
}

impl GetResponse {
    pub fn new(group: impl Into<String>, key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            key: key.into(),
            value: value.into(),
        }
    }
}

/// One group's line in the stats endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct GroupStatsEntry {
    pub group: String,
    pub cache_bytes: usize,
    #[serde(flatten)]
    pub stats: CacheStats,
    /// cache_hits / gets
    pub hit_rate: f64,
}

impl GroupStatsEntry {
    pub fn new(group: impl Into<String>, cache_bytes: usize, stats: CacheStats) -> Self {
        let hit_rate = stats.hit_rate();
        Self {
            group: group.into(),
            cache_bytes,
            stats,
            hit_rate,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Base URL of this node
    pub node: String,
    pub groups: Vec<GroupStatsEntry>,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_response_serialize() {
        let resp = GetResponse::new("scores", "Tom", "630");
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["group"], "scores");
        assert_eq!(json["key"], "Tom");
        assert_eq!(json["value"], "630");
    }

    #[test]
    fn test_group_stats_entry_flattens_counters() {
        let stats = CacheStats {
            gets: 4,
            cache_hits: 3,
            entries: 1,
            ..CacheStats::default()
        };
        let json = serde_json::to_value(GroupStatsEntry::new("scores", 2048, stats)).unwrap();
        assert_eq!(json["group"], "scores");
        assert_eq!(json["gets"], 4);
        assert_eq!(json["entries"], 1);
        assert!((json["hit_rate"].as_f64().unwrap() - 0.75).abs() < 0.001);
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }

    #[test]
    fn test_error_response_serialize() {
        let resp = ErrorResponse::new("Something went wrong");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("error"));
        assert!(json.contains("Something went wrong"));
    }
}
