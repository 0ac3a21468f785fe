//! Cache Module
//!
//! Provides the byte-budgeted LRU store, its locked wrapper and read path statistics.

mod byteview;
mod concurrent;
mod lru;
mod stats;
mod store;


// Re-export public types
pub use byteview::ByteView;
pub use concurrent::ConcurrentCache;
pub use lru::{RecencyList, SlotId};
pub use stats::{CacheStats, GroupStats};
pub use store::{EvictionCallback, LruStore};

// == Value Trait ==
/// A cached value that reports how many bytes it occupies.
pub trait Value {
    fn len(&self) -> usize;
}

impl Value for String {
    fn len(&self) -> usize {
        self.as_str().len()
    }
}

impl Value for Vec<u8> {
    fn len(&self) -> usize {
        self.as_slice().len()
    }
}
