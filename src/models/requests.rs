//! Request DTOs for the API frontend

use serde::Deserialize;

/// Query string of `GET /api?key=<key>[&group=<group>]`
///
/// `group` falls back to the node's configured default group.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiQuery {
    /// The cache key
    #[serde(default)]
    pub key: String,
    /// Group to read from
    #[serde(default)]
    pub group: Option<String>,
}

impl ApiQuery {
    /// Validates the query
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.key.is_empty() {
            return Some("Key cannot be empty".to_string());
        }
        if matches!(self.group.as_deref(), Some("")) {
            return Some("Group cannot be empty".to_string());
        }
        None
    }

    /// Resolves the group name against the node's default.
    pub fn group_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.group.as_deref().unwrap_or(default)
    }
}
