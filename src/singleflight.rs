//! Request Deduplication
//!
//! Coalesces concurrent loads of the same key into a single execution.
//!
//! The first caller for a key registers an in-flight call and runs the loader;
//! callers arriving while it runs subscribe to the call and receive a clone of
//! its result. The registry lock is only held to look up, insert or remove a
//! call, never while a loader runs or a waiter sleeps, so keys never block each
//! other. The call is removed once it completes: a later request for the same
//! key starts a fresh load rather than replaying an old result.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::trace;

type Slot<T, E> = Option<std::result::Result<T, E>>;

/// One in-flight execution; the slot is filled exactly once.
struct Call<T, E> {
    done: watch::Sender<Slot<T, E>>,
}

// == Single Flight ==
pub struct SingleFlight<T, E> {
    calls: Mutex<HashMap<String, Arc<Call<T, E>>>>,
}

impl<T, E> Default for SingleFlight<T, E> {
    fn default() -> Self {
        Self {
            calls: Mutex::new(HashMap::new()),
        }
    }
}

impl<T, E> SingleFlight<T, E>
where
    T: Clone,
    E: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    // == Execute ==
    /// Runs `loader` for `key` unless a load for the same key is already in
    /// flight, in which case this waits for and returns that load's result.
    ///
    /// If the executing caller is dropped before finishing, its waiters retry
    /// and one of them takes over the load.
    pub async fn execute<F, Fut>(&self, key: &str, loader: F) -> std::result::Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        let call = loop {
            let mut rx = {
                let mut calls = self.calls.lock();
                match calls.get(key) {
                    Some(call) => call.done.subscribe(),
                    None => {
                        let (done, _) = watch::channel(None);
                        let call = Arc::new(Call { done });
                        calls.insert(key.to_string(), Arc::clone(&call));
                        break call;
                    }
                }
            };

            trace!(key, "waiting on in-flight load");
            if let Ok(slot) = rx.wait_for(Option::is_some).await {
                if let Some(result) = slot.clone() {
                    return result;
                }
            }
            trace!(key, "in-flight load abandoned, retrying");
        };

        let _registration = Registration {
            calls: &self.calls,
            key,
            call: &call,
        };
        let result = loader().await;
        call.done.send_replace(Some(result.clone()));
        result
    }

    /// Returns the number of loads currently in flight.
    pub fn in_flight(&self) -> usize {
        self.calls.lock().len()
    }
}

/// Unregisters a call when its executor finishes or is dropped.
struct Registration<'a, T, E> {
    calls: &'a Mutex<HashMap<String, Arc<Call<T, E>>>>,
    key: &'a str,
    call: &'a Arc<Call<T, E>>,
}

impl<T, E> Drop for Registration<'_, T, E> {
    fn drop(&mut self) {
        let mut calls = self.calls.lock();
        if calls
            .get(self.key)
            .is_some_and(|current| Arc::ptr_eq(current, self.call))
        {
            calls.remove(self.key);
        }
    }
}
