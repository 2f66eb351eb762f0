//! Expiry Sweep Task
//!
//! Background task that periodically removes expired cache entries. Reads
//! already enforce expiry lazily, so the sweep only reclaims memory.

use std::sync::Weak;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheStore;

/// Fixed interval between sweeps.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Spawns a background task that periodically sweeps expired cache entries.
///
/// The task only holds a weak reference to the store: once every owner has
/// dropped it the loop ends on its next tick. The returned handle can be
/// aborted for an earlier stop.
///
/// # Panics
/// Must be called from within a Tokio runtime.
///
/// # Example
/// ```ignore
/// let store = Arc::new(RwLock::new(CacheStore::<String>::new(1000, 300_000)));
/// let handle = spawn_sweep_task(Arc::downgrade(&store), SWEEP_INTERVAL);
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_sweep_task<V>(
    store: Weak<RwLock<CacheStore<V>>>,
    interval: Duration,
) -> JoinHandle<()>
where
    V: Send + Sync + 'static,
{
    tokio::spawn(async move {
        info!(interval_ms = interval.as_millis() as u64, "Starting cache expiry sweep");

        loop {
            tokio::time::sleep(interval).await;

            let Some(store) = store.upgrade() else {
                debug!("Cache dropped, stopping expiry sweep");
                break;
            };

            let (removed, remaining) = {
                let mut guard = store.write().await;
                let removed = guard.cleanup_expired();
                (removed, guard.len())
            };

            if removed > 0 {
                info!(removed, remaining, "Cache sweep removed expired entries");
            } else {
                debug!(remaining, "Cache sweep found no expired entries");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_sweep_removes_expired_entries() {
        let store = Arc::new(RwLock::new(CacheStore::<String>::new(100, 300_000)));

        {
            let mut guard = store.write().await;
            guard.set("expire_soon", "value".to_string(), Some(10));
            guard.set("long_lived", "value".to_string(), Some(3_600_000));
        }

        let handle = spawn_sweep_task(Arc::downgrade(&store), Duration::from_millis(50));

        tokio::time::sleep(Duration::from_millis(200)).await;

        {
            let guard = store.read().await;
            // Removed by the sweep itself, not by a read
            assert_eq!(guard.len(), 1);
            assert_eq!(guard.keys(), vec!["long_lived".to_string()]);
            assert_eq!(guard.stats().misses, 0);
        }

        handle.abort();
    }

    #[tokio::test]
    async fn test_sweep_can_be_aborted() {
        let store = Arc::new(RwLock::new(CacheStore::<String>::new(100, 300_000)));

        let handle = spawn_sweep_task(Arc::downgrade(&store), SWEEP_INTERVAL);
        handle.abort();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }

    #[tokio::test]
    async fn test_sweep_stops_when_store_dropped() {
        let store = Arc::new(RwLock::new(CacheStore::<String>::new(100, 300_000)));

        let handle = spawn_sweep_task(Arc::downgrade(&store), Duration::from_millis(10));
        drop(store);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should exit once the store is gone");
    }
}
