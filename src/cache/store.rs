//! LRU Store Module
//!
//! Byte-budgeted key/value store with least-recently-used eviction.

use std::collections::HashMap;
use std::fmt;

use crate::cache::lru::{RecencyList, SlotId};
use crate::cache::Value;

/// Callback invoked with the key and value of every evicted entry.
pub type EvictionCallback<V> = Box<dyn FnMut(&str, &V) + Send>;

#[derive(Debug)]
struct Entry<V> {
    key: String,
    value: V,
}

// == LRU Store ==
/// Bounded value store: keeps `key.len() + value.len()` bytes per entry under
/// `max_bytes`, evicting from the least recently used end.
///
/// A `max_bytes` of 0 disables the bound. Not safe for concurrent use; see
/// [`ConcurrentCache`](crate::cache::ConcurrentCache) for the locked wrapper.
pub struct LruStore<V: Value> {
    /// Byte budget, 0 = unbounded
    max_bytes: usize,
    /// Bytes currently held (keys + values)
    nbytes: usize,
    /// Entries ordered by recency
    ll: RecencyList<Entry<V>>,
    /// Key to list slot
    index: HashMap<String, SlotId>,
    on_evicted: Option<EvictionCallback<V>>,
}

impl<V: Value> LruStore<V> {
    // == Constructor ==
    /// Creates a store with the given byte budget and optional eviction callback.
    pub fn new(max_bytes: usize, on_evicted: Option<EvictionCallback<V>>) -> Self {
        Self {
            max_bytes,
            nbytes: 0,
            ll: RecencyList::new(),
            index: HashMap::new(),
            on_evicted,
        }
    }

    // == Get ==
    /// Looks up a key, marking it most recently used on a hit.
    pub fn get(&mut self, key: &str) -> Option<&V> {
        let id = *self.index.get(key)?;
        self.ll.move_to_front(id);
        self.ll.get(id).map(|entry| &entry.value)
    }

    // == Add ==
    /// Inserts or replaces a value, then evicts until the budget holds.
    pub fn add(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();
        match self.index.get(&key).copied() {
            Some(id) => {
                self.ll.move_to_front(id);
                if let Some(entry) = self.ll.get_mut(id) {
                    self.nbytes = self.nbytes - entry.value.len() + value.len();
                    entry.value = value;
                }
            }
            None => {
                self.nbytes += key.len() + value.len();
                let id = self.ll.push_front(Entry {
                    key: key.clone(),
                    value,
                });
                self.index.insert(key, id);
            }
        }

        while self.max_bytes != 0 && self.nbytes > self.max_bytes {
            if !self.remove_oldest() {
                break;
            }
        }
    }

    // == Remove Oldest ==
    /// Evicts the least recently used entry.
    ///
    /// Bookkeeping is complete before the eviction callback runs. Returns
    /// false if the store was empty.
    pub fn remove_oldest(&mut self) -> bool {
        let Some(entry) = self.ll.pop_back() else {
            return false;
        };
        self.index.remove(&entry.key);
        self.nbytes -= entry.key.len() + entry.value.len();
        if let Some(on_evicted) = self.on_evicted.as_mut() {
            on_evicted(&entry.key, &entry.value);
        }
        true
    }

    // == Length ==
    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.ll.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ll.is_empty()
    }

    /// Returns the bytes currently accounted to keys and values.
    pub fn bytes(&self) -> usize {
        self.nbytes
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }
}

impl<V: Value> fmt::Debug for LruStore<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruStore")
            .field("max_bytes", &self.max_bytes)
            .field("nbytes", &self.nbytes)
            .field("len", &self.ll.len())
            .finish()
    }
}
