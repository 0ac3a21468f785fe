//! Consistent Hash Ring
//!
//! Maps keys onto a dynamic set of shards (peer base URLs) using virtual
//! nodes. Each shard contributes `replicas` points on a 32-bit ring, hashed
//! from `"<replica index><shard id>"`; a key belongs to the first point at or
//! after its own hash, wrapping around to the smallest point.
//!
//! For a fixed shard set and hash function, [`HashRing::get`] is a pure
//! function of the key, so every node computes the same owner without
//! coordination. Adding a shard only moves keys that fall into the new
//! shard's ranges.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Hash function over raw bytes.
pub type HashFn = Arc<dyn Fn(&[u8]) -> u32 + Send + Sync>;

// == Hash Ring ==
pub struct HashRing {
    hash: HashFn,
    replicas: usize,
    /// Shards in the order they were added
    shards: Vec<String>,
    /// Sorted virtual node hashes
    keys: Vec<u32>,
    /// Virtual node hash to owning shard
    hash_map: HashMap<u32, String>,
}

impl HashRing {
    // == Constructor ==
    /// Creates an empty ring. Uses CRC-32 (IEEE) when `hash` is `None`.
    pub fn new(replicas: usize, hash: Option<HashFn>) -> Self {
        Self {
            hash: hash.unwrap_or_else(|| Arc::new(crc32fast::hash)),
            replicas,
            shards: Vec::new(),
            keys: Vec::new(),
            hash_map: HashMap::new(),
        }
    }

    // == Add ==
    /// Adds shards, each with `replicas` virtual nodes.
    ///
    /// A point shared by two shards belongs to the one added last.
    pub fn add<I, S>(&mut self, shards: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for shard in shards {
            let shard = shard.as_ref().to_string();
            self.place(&shard);
            self.shards.push(shard);
        }
        self.keys.sort_unstable();
    }

    // == Remove ==
    /// Removes a shard's virtual nodes. Keys it owned move to their next
    /// point on the ring; all other keys keep their owner.
    ///
    /// The ring is rebuilt from the remaining shards in insertion order, so
    /// points the removed shard had taken over from another shard return to
    /// it, and the result matches a ring built without the shard.
    pub fn remove(&mut self, shard: &str) {
        let before = self.shards.len();
        self.shards.retain(|s| s != shard);
        if self.shards.len() == before {
            return;
        }

        self.keys.clear();
        self.hash_map.clear();
        for shard in std::mem::take(&mut self.shards) {
            self.place(&shard);
            self.shards.push(shard);
        }
        self.keys.sort_unstable();
    }

    /// Inserts a shard's virtual nodes, leaving `keys` unsorted.
    fn place(&mut self, shard: &str) {
        for i in 0..self.replicas {
            let hash = self.virtual_hash(i, shard);
            self.keys.push(hash);
            self.hash_map.insert(hash, shard.to_string());
        }
    }

    // == Get ==
    /// Returns the shard owning `key`, or `None` for an empty key or ring.
    pub fn get(&self, key: &str) -> Option<&str> {
        if key.is_empty() || self.keys.is_empty() {
            return None;
        }
        let hash = (self.hash)(key.as_bytes());
        let idx = self.keys.partition_point(|&point| point < hash);
        let point = self.keys[idx % self.keys.len()];
        self.hash_map.get(&point).map(String::as_str)
    }

    /// Returns the number of virtual nodes on the ring.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    fn virtual_hash(&self, replica: usize, shard: &str) -> u32 {
        (self.hash)(format!("{replica}{shard}").as_bytes())
    }
}

impl fmt::Debug for HashRing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashRing")
            .field("replicas", &self.replicas)
            .field("shards", &self.shards)
            .field("points", &self.keys.len())
            .finish()
    }
}
