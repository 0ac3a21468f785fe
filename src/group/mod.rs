//! Group Module
//!
//! A group is a named cache namespace: its own byte-budgeted cache, loader
//! and optional peer picker. Reads go local cache → (deduplicated) peer fetch
//! → local loader, and every loaded value is cached.

mod getter;
mod registry;

use std::sync::{Arc, OnceLock};

use tracing::{debug, info, warn};

use crate::cache::{ByteView, CacheStats, ConcurrentCache, GroupStats};
use crate::error::{CacheError, Result};
use crate::models::FetchRequest;
use crate::peers::{PeerError, PeerGetter, PeerPicker};
use crate::singleflight::SingleFlight;

pub use getter::{Getter, GetterFn};
pub use registry::GroupRegistry;

// == Group ==
pub struct Group {
    name: String,
    getter: Arc<dyn Getter>,
    main_cache: ConcurrentCache,
    peers: OnceLock<Arc<dyn PeerPicker>>,
    /// Ensures each key is loaded once at a time, cluster-wide through peers
    loader: SingleFlight<ByteView, CacheError>,
    stats: GroupStats,
}

impl Group {
    // == Constructor ==
    /// Creates a standalone group. Use [`GroupRegistry::create_group`] to make
    /// it reachable by name from peers.
    pub fn new(name: impl Into<String>, cache_bytes: usize, getter: Arc<dyn Getter>) -> Self {
        Self {
            name: name.into(),
            getter,
            main_cache: ConcurrentCache::new(cache_bytes),
            peers: OnceLock::new(),
            loader: SingleFlight::new(),
            stats: GroupStats::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // == Register Peers ==
    /// Attaches the peer picker used on cache misses.
    ///
    /// A group accepts a picker exactly once; a second call is a wiring bug
    /// and returns [`CacheError::SetupViolation`].
    pub fn register_peers(&self, peers: Arc<dyn PeerPicker>) -> Result<()> {
        self.peers.set(peers).map_err(|_| {
            CacheError::SetupViolation(format!(
                "register_peers called more than once for group {}",
                self.name
            ))
        })
    }

    // == Get ==
    /// Returns the value for `key`, loading it on a miss.
    pub async fn get(&self, key: &str) -> Result<ByteView> {
        if key.is_empty() {
            return Err(CacheError::InvalidKey);
        }
        self.stats.record_get();

        if let Some(value) = self.main_cache.get(key) {
            self.stats.record_hit();
            debug!(group = %self.name, key, "cache hit");
            return Ok(value);
        }

        self.load(key).await
    }

    /// Loads a missing key: peer first when one owns it, then the local
    /// loader. Concurrent loads of the same key share one execution.
    async fn load(&self, key: &str) -> Result<ByteView> {
        self.loader
            .execute(key, || async {
                // A flight for this key may have just filled the cache.
                if let Some(value) = self.main_cache.get(key) {
                    self.stats.record_hit();
                    return Ok(value);
                }
                self.stats.record_load();

                if let Some(peer) = self.peers.get().and_then(|peers| peers.pick_peer(key)) {
                    match self.get_from_peer(peer.as_ref(), key).await {
                        Ok(value) => {
                            self.stats.record_peer_load();
                            return Ok(value);
                        }
                        Err(err) => {
                            self.stats.record_peer_error();
                            warn!(group = %self.name, key, error = %err, "failed to get from peer");
                        }
                    }
                }

                self.get_locally(key).await
            })
            .await
    }

    async fn get_from_peer(
        &self,
        peer: &dyn PeerGetter,
        key: &str,
    ) -> std::result::Result<ByteView, PeerError> {
        let response = peer.fetch(&FetchRequest::new(&self.name, key)).await?;
        let value = ByteView::from(response.value);
        self.populate_cache(key, value.clone());
        Ok(value)
    }

    async fn get_locally(&self, key: &str) -> Result<ByteView> {
        info!(group = %self.name, key, "loading from source");
        let bytes = self.getter.get(key).await.map_err(|err| {
            self.stats.record_local_load_err();
            CacheError::loader(err)
        })?;
        self.stats.record_local_load();

        let value = ByteView::copy_from_slice(&bytes);
        self.populate_cache(key, value.clone());
        Ok(value)
    }

    fn populate_cache(&self, key: &str, value: ByteView) {
        self.main_cache.add(key, value);
    }

    // == Stats ==
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(
            self.main_cache.len(),
            self.main_cache.bytes(),
            self.main_cache.evictions(),
        )
    }

    pub fn cache_bytes(&self) -> usize {
        self.main_cache.cache_bytes()
    }
}

impl std::fmt::Debug for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Group")
            .field("name", &self.name)
            .field("cache_bytes", &self.main_cache.cache_bytes())
            .field("has_peers", &self.peers.get().is_some())
            .finish()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BoxError;
    use crate::models::FetchResponse;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    fn db() -> HashMap<&'static str, &'static str> {
        HashMap::from([("key1", "value1"), ("key2", "value2"), ("key3", "value3")])
    }

    /// Loader over `db()` that counts calls per key.
    fn counting_getter() -> (Arc<dyn Getter>, Arc<Mutex<HashMap<String, usize>>>) {
        let counts = Arc::new(Mutex::new(HashMap::new()));
        let sink = Arc::clone(&counts);
        let getter = GetterFn(move |key: String| {
            let counts = Arc::clone(&sink);
            async move {
                match db().get(key.as_str()) {
                    Some(v) => {
                        *counts.lock().unwrap().entry(key).or_insert(0) += 1;
                        Ok(v.as_bytes().to_vec())
                    }
                    None => Err::<Vec<u8>, BoxError>(format!("{key} is not exists").into()),
                }
            }
        });
        (Arc::new(getter), counts)
    }

    struct FailingPeer;

    #[async_trait]
    impl PeerGetter for FailingPeer {
        async fn fetch(&self, _: &FetchRequest) -> std::result::Result<FetchResponse, PeerError> {
            Err(PeerError::Status {
                status: 500,
                message: "peer down".into(),
            })
        }
    }

    struct EchoPeer {
        requests: Mutex<Vec<FetchRequest>>,
    }

    #[async_trait]
    impl PeerGetter for EchoPeer {
        async fn fetch(&self, request: &FetchRequest) -> std::result::Result<FetchResponse, PeerError> {
            self.requests.lock().unwrap().push(request.clone());
            Ok(FetchResponse {
                value: format!("remote-{}", request.key).into_bytes(),
            })
        }
    }

    /// Picker that always routes to the same peer.
    struct AlwaysPick(Arc<dyn PeerGetter>);

    impl PeerPicker for AlwaysPick {
        fn pick_peer(&self, _: &str) -> Option<Arc<dyn PeerGetter>> {
            Some(Arc::clone(&self.0))
        }
    }

    struct NeverPick;

    impl PeerPicker for NeverPick {
        fn pick_peer(&self, _: &str) -> Option<Arc<dyn PeerGetter>> {
            None
        }
    }

    #[tokio::test]
    async fn test_get_loads_once_then_hits_cache() {
        let (getter, counts) = counting_getter();
        let group = Group::new("scores", 2 << 10, getter);

        for (k, v) in db() {
            let view = group.get(k).await.unwrap();
            assert_eq!(view.to_string(), v);

            let view = group.get(k).await.unwrap();
            assert_eq!(view.to_string(), v);
            assert_eq!(counts.lock().unwrap()[k], 1, "cache {k} miss");
        }

        let stats = group.stats();
        assert_eq!(stats.gets, 6);
        assert_eq!(stats.cache_hits, 3);
        assert_eq!(stats.local_loads, 3);
        assert_eq!(stats.entries, 3);
    }

    #[tokio::test]
    async fn test_value_filled_before_load_counts_as_hit() {
        let (getter, counts) = counting_getter();
        let group = Group::new("scores", 0, getter);

        // A previous flight filled the cache after this read missed it
        group.stats.record_get();
        group
            .main_cache
            .add("key1", ByteView::copy_from_slice(b"value1"));
        let view = group.load("key1").await.unwrap();

        assert_eq!(view.to_string(), "value1");
        assert!(counts.lock().unwrap().is_empty());
        let stats = group.stats();
        assert_eq!(stats.gets, 1);
        assert_eq!(stats.cache_hits, 1);
        assert_eq!(stats.loads, 0);
        assert_eq!(stats.hit_rate(), 1.0);
    }

    #[tokio::test]
    async fn test_empty_key_is_invalid() {
        let (getter, counts) = counting_getter();
        let group = Group::new("scores", 0, getter);

        assert!(matches!(group.get("").await, Err(CacheError::InvalidKey)));
        assert!(counts.lock().unwrap().is_empty());
        assert_eq!(group.stats().gets, 0);
    }

    #[tokio::test]
    async fn test_loader_error_is_surfaced() {
        let (getter, _) = counting_getter();
        let group = Group::new("scores", 0, getter);

        let err = group.get("unknown").await.unwrap_err();
        assert!(matches!(err, CacheError::Loader(_)));
        assert_eq!(err.to_string(), "unknown is not exists");
        assert_eq!(group.stats().local_load_errs, 1);
        assert_eq!(group.stats().entries, 0);
    }

    #[tokio::test]
    async fn test_returned_value_is_a_copy() {
        let shared = Arc::new(Mutex::new(b"value1".to_vec()));
        let source = Arc::clone(&shared);
        let getter = GetterFn(move |_key: String| {
            let source = Arc::clone(&source);
            async move { Ok::<_, BoxError>(source.lock().unwrap().clone()) }
        });
        let group = Group::new("scores", 0, Arc::new(getter));

        let first = group.get("key1").await.unwrap();
        shared.lock().unwrap()[0] = b'X';
        let mut copy = first.byte_slice();
        copy[0] = b'Y';

        assert_eq!(group.get("key1").await.unwrap().to_string(), "value1");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_misses_load_once() {
        let loads = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&loads);
        let getter = GetterFn(move |key: String| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(100)).await;
                Ok::<_, BoxError>(format!("{key}-value").into_bytes())
            }
        });
        let group = Arc::new(Group::new("scores", 0, Arc::new(getter)));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let group = Arc::clone(&group);
                tokio::spawn(async move { group.get("Tom").await })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap().to_string(), "Tom-value");
        }

        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_peer_failure_falls_back_to_loader() {
        let (getter, counts) = counting_getter();
        let group = Group::new("scores", 0, getter);
        group
            .register_peers(Arc::new(AlwaysPick(Arc::new(FailingPeer))))
            .unwrap();

        let view = group.get("key1").await.unwrap();

        assert_eq!(view.to_string(), "value1");
        assert_eq!(counts.lock().unwrap()["key1"], 1);
        let stats = group.stats();
        assert_eq!(stats.peer_errors, 1);
        assert_eq!(stats.peer_loads, 0);
        assert_eq!(stats.local_loads, 1);
    }

    #[tokio::test]
    async fn test_peer_value_is_cached_locally() {
        let (getter, counts) = counting_getter();
        let peer = Arc::new(EchoPeer {
            requests: Mutex::new(Vec::new()),
        });
        let group = Group::new("scores", 0, getter);
        group
            .register_peers(Arc::new(AlwaysPick(peer.clone())))
            .unwrap();

        assert_eq!(group.get("key1").await.unwrap().to_string(), "remote-key1");
        assert_eq!(group.get("key1").await.unwrap().to_string(), "remote-key1");

        assert_eq!(
            *peer.requests.lock().unwrap(),
            vec![FetchRequest::new("scores", "key1")]
        );
        assert!(counts.lock().unwrap().is_empty());
        assert_eq!(group.stats().peer_loads, 1);
        assert_eq!(group.stats().cache_hits, 1);
    }

    #[tokio::test]
    async fn test_no_picked_peer_loads_locally() {
        let (getter, counts) = counting_getter();
        let group = Group::new("scores", 0, getter);
        group.register_peers(Arc::new(NeverPick)).unwrap();

        assert_eq!(group.get("key2").await.unwrap().to_string(), "value2");
        assert_eq!(counts.lock().unwrap()["key2"], 1);
    }

    #[test]
    fn test_register_peers_twice_is_setup_violation() {
        let (getter, _) = counting_getter();
        let group = Group::new("scores", 0, getter);

        group.register_peers(Arc::new(NeverPick)).unwrap();
        let err = group.register_peers(Arc::new(NeverPick)).unwrap_err();

        assert!(matches!(err, CacheError::SetupViolation(_)));
    }

    #[tokio::test]
    async fn test_small_budget_evicts() {
        let (getter, counts) = counting_getter();
        // Fits exactly one "keyN" + "valueN" entry
        let group = Group::new("scores", 10, getter);

        group.get("key1").await.unwrap();
        group.get("key2").await.unwrap();
        group.get("key1").await.unwrap();

        assert_eq!(counts.lock().unwrap()["key1"], 2);
        assert_eq!(group.stats().evictions, 2);
    }
}
