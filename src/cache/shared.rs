//! Shared Cache Handle
//!
//! Thread-safe, cloneable front for a [`CacheStore`] that owns the background
//! expiry sweep for as long as any handle is alive.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use regex::Regex;
use tokio::runtime::Handle;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::store::compile_pattern;
use crate::cache::{CacheReport, CacheStats, CacheStore};
use crate::config::Config;
use crate::error::Result;
use crate::tasks::{spawn_sweep_task, SWEEP_INTERVAL};

/// Aborts the sweep when the last cache handle goes away. Empty when the
/// cache was built outside a Tokio runtime.
#[derive(Debug)]
struct SweepGuard(Option<JoinHandle<()>>);

impl Drop for SweepGuard {
    fn drop(&mut self) {
        if let Some(handle) = &self.0 {
            handle.abort();
        }
    }
}

// == Cache ==
/// Cloneable handle to a lock-guarded cache store.
///
/// Every operation takes the store lock for its whole duration, so the FIFO
/// eviction, the sweep and ordinary reads/writes never interleave. Clones
/// share the same store and sweep task.
#[derive(Debug)]
pub struct Cache<V> {
    store: Arc<RwLock<CacheStore<V>>>,
    sweeper: Arc<SweepGuard>,
}

impl<V> Clone for Cache<V> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            sweeper: Arc::clone(&self.sweeper),
        }
    }
}

impl<V> Cache<V>
where
    V: Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates a cache and starts its 60 second expiry sweep.
    ///
    /// Outside a Tokio runtime the cache is built without a sweep and expired
    /// entries are only reclaimed when read.
    pub fn new(max_size: usize, default_ttl_ms: i64) -> Self {
        Self::with_sweep_interval(max_size, default_ttl_ms, SWEEP_INTERVAL)
    }

    /// Creates a cache sized from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.max_size, config.default_ttl_ms)
    }

    pub(crate) fn with_sweep_interval(
        max_size: usize,
        default_ttl_ms: i64,
        interval: Duration,
    ) -> Self {
        let store = Arc::new(RwLock::new(CacheStore::new(max_size, default_ttl_ms)));
        let handle = match Handle::try_current() {
            Ok(_) => Some(spawn_sweep_task(Arc::downgrade(&store), interval)),
            Err(_) => {
                warn!("No Tokio runtime available, cache expiry sweep disabled");
                None
            }
        };

        Self {
            store,
            sweeper: Arc::new(SweepGuard(handle)),
        }
    }

    // == Set ==
    /// Stores `value` under `key`; see [`CacheStore::set`].
    pub async fn set(&self, key: impl Into<String>, value: V, ttl_ms: Option<i64>) {
        self.store.write().await.set(key, value, ttl_ms);
    }

    // == Get ==
    /// Looks up `key`, counting a hit or a miss; see [`CacheStore::get`].
    pub async fn get(&self, key: &str) -> Option<V>
    where
        V: Clone,
    {
        // Write lock: lookups mutate counters and may drop expired entries
        self.store.write().await.get(key)
    }

    // == Get Or Set ==
    /// Returns the cached value for `key`, or computes, stores and returns it.
    ///
    /// The store lock is released while `producer` runs, so concurrent callers
    /// missing on the same key each run their own producer and the last one to
    /// finish wins. A producer error is returned unchanged and nothing is
    /// cached, so the next caller retries.
    pub async fn get_or_set<F, Fut, E>(
        &self,
        key: &str,
        producer: F,
        ttl_ms: Option<i64>,
    ) -> std::result::Result<V, E>
    where
        V: Clone,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<V, E>>,
    {
        if let Some(value) = self.get(key).await {
            return Ok(value);
        }

        debug!(key = %key, "Cache miss, computing value");
        let value = producer().await?;

        self.set(key, value.clone(), ttl_ms).await;
        Ok(value)
    }

    // == Delete ==
    pub async fn delete(&self, key: &str) -> bool {
        self.store.write().await.delete(key)
    }

    // == Clear ==
    /// Empties the cache and returns how many entries it held.
    pub async fn clear(&self) -> usize {
        let mut guard = self.store.write().await;
        let count = guard.len();
        guard.clear();
        count
    }

    // == Invalidate ==
    /// Removes every key matching the regular expression `pattern`.
    ///
    /// # Errors
    /// Returns `CacheError::InvalidPattern` if `pattern` does not compile.
    pub async fn invalidate_pattern(&self, pattern: &str) -> Result<usize> {
        let regex = compile_pattern(pattern)?;
        Ok(self.invalidate_matching(&regex).await)
    }

    pub async fn invalidate_matching(&self, regex: &Regex) -> usize {
        self.store.write().await.invalidate_matching(regex)
    }

    // == Inspection ==
    pub async fn contains_key(&self, key: &str) -> bool {
        self.store.read().await.contains_key(key)
    }

    /// Returns a snapshot of the current statistics.
    pub async fn stats(&self) -> CacheStats {
        self.store.read().await.stats()
    }

    /// Lifetime hit rate as a percentage.
    pub async fn hit_rate(&self) -> f64 {
        self.store.read().await.hit_rate()
    }

    /// Stats snapshot with derived hit rate, health label and advice.
    pub async fn report(&self) -> CacheReport {
        let guard = self.store.read().await;
        CacheReport::from_stats(guard.stats(), guard.max_size())
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }

    pub async fn keys(&self) -> Vec<String> {
        self.store.read().await.keys()
    }

    // == Lifecycle ==
    /// Stops the background sweep. The cache stays usable; expired entries are
    /// then only reclaimed when read.
    pub fn shutdown(&self) {
        if let Some(handle) = &self.sweeper.0 {
            if !handle.is_finished() {
                handle.abort();
                info!("Cache expiry sweep aborted");
            }
        }
    }

    /// Whether the background sweep is still scheduled.
    pub fn is_sweeping(&self) -> bool {
        self.sweeper
            .0
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}
