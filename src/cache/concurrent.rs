//! Concurrent Cache Module
//!
//! Mutex-guarded wrapper around [`LruStore`] shared by request tasks.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::cache::{ByteView, LruStore};

// == Concurrent Cache ==
/// Thread-safe byte-budgeted cache of [`ByteView`] values.
///
/// Every operation takes the lock exclusively; store work per call is O(1).
/// The underlying store is built on the first `add`, so a default-constructed
/// cache costs nothing until used.
#[derive(Debug, Default)]
pub struct ConcurrentCache {
    cache_bytes: usize,
    store: Mutex<Option<LruStore<ByteView>>>,
    evictions: Arc<AtomicU64>,
}

impl ConcurrentCache {
    // == Constructor ==
    /// Creates a cache holding at most `cache_bytes` of keys and values (0 = unbounded).
    pub fn new(cache_bytes: usize) -> Self {
        Self {
            cache_bytes,
            ..Self::default()
        }
    }

    // == Add ==
    pub fn add(&self, key: &str, value: ByteView) {
        let mut guard = self.store.lock();
        let store = guard.get_or_insert_with(|| {
            let evictions = Arc::clone(&self.evictions);
            LruStore::new(
                self.cache_bytes,
                Some(Box::new(move |_: &str, _: &ByteView| {
                    evictions.fetch_add(1, Ordering::Relaxed);
                })),
            )
        });
        store.add(key, value);
    }

    // == Get ==
    /// Returns a clone of the cached view and marks it most recently used.
    pub fn get(&self, key: &str) -> Option<ByteView> {
        let mut guard = self.store.lock();
        guard.as_mut()?.get(key).cloned()
    }

    /// Returns the number of cached entries.
    pub fn len(&self) -> usize {
        self.store.lock().as_ref().map_or(0, LruStore::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the bytes currently held by keys and values.
    pub fn bytes(&self) -> usize {
        self.store.lock().as_ref().map_or(0, LruStore::bytes)
    }

    /// Returns the number of entries evicted so far.
    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }

    pub fn cache_bytes(&self) -> usize {
        self.cache_bytes
    }
}
