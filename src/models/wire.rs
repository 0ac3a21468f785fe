//! Peer wire messages
//!
//! Protobuf schema exchanged between cache nodes:
//!
//! ```proto
//! message FetchRequest  { string group = 1; string key = 2; }
//! message FetchResponse { bytes value = 1; }
//! ```

/// Identifies a value on a remote node.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FetchRequest {
    #[prost(string, tag = "1")]
    pub group: String,
    #[prost(string, tag = "2")]
    pub key: String,
}

impl FetchRequest {
    pub fn new(group: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            key: key.into(),
        }
    }
}

/// Body of a successful peer response.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FetchResponse {
    #[prost(bytes = "vec", tag = "1")]
    pub value: Vec<u8>,
}
