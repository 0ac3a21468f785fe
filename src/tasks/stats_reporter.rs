//! Stats Reporter Task
//!
//! Background task that periodically logs every group's cache statistics.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::info;

use crate::group::GroupRegistry;

/// Spawns a background task that logs a stats snapshot for each registered
/// group every `interval_secs` seconds.
///
/// Returns the task's JoinHandle so it can be aborted during graceful
/// shutdown.
///
/// # Example
/// ```ignore
/// let registry = Arc::new(GroupRegistry::new());
/// let reporter = spawn_stats_reporter(registry.clone(), 30);
/// // Later, during shutdown:
/// reporter.abort();
/// ```
pub fn spawn_stats_reporter(registry: Arc<GroupRegistry>, interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(interval_secs.max(1));

    tokio::spawn(async move {
        info!("Starting stats reporter with interval of {} seconds", interval.as_secs());

        let mut ticker = tokio::time::interval(interval);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            report(&registry);
        }
    })
}

fn report(registry: &GroupRegistry) -> usize {
    let groups = registry.groups();
    for group in &groups {
        let stats = group.stats();
        info!(
            group = %group.name(),
            gets = stats.gets,
            hits = stats.cache_hits,
            hit_rate = stats.hit_rate(),
            peer_loads = stats.peer_loads,
            peer_errors = stats.peer_errors,
            local_loads = stats.local_loads,
            local_load_errs = stats.local_load_errs,
            evictions = stats.evictions,
            entries = stats.entries,
            bytes = stats.bytes,
            "cache stats"
        );
    }
    groups.len()
}
