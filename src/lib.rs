//! Peercache - A distributed read-through cache
//!
//! Each node keeps a byte-budgeted LRU cache per named group. Keys are sharded
//! across nodes with a consistent hash ring; a miss is fetched from the owning
//! peer over HTTP, or loaded from the application's source, with concurrent
//! loads of the same key coalesced into one.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod group;
pub mod models;
pub mod peers;
pub mod ring;
pub mod singleflight;
pub mod tasks;

pub use api::AppState;
pub use cache::ByteView;
pub use config::Config;
pub use error::{CacheError, Result};
pub use group::{Getter, GetterFn, Group, GroupRegistry};
pub use peers::{HttpPool, PeerGetter, PeerPicker};
pub use ring::HashRing;
pub use tasks::spawn_stats_reporter;
