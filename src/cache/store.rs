//! Cache Store Module
//!
//! Main cache engine: keyed storage with TTL expiration, FIFO eviction and
//! regex-based bulk invalidation.

use std::collections::{HashMap, VecDeque};

use regex::Regex;
use tracing::debug;

use crate::cache::{current_timestamp_ms, CacheEntry, CacheStats, DEFAULT_MAX_SIZE, DEFAULT_TTL_MS};
use crate::error::{CacheError, Result};

/// Stale queue slots tolerated on top of the live ones before compaction.
const QUEUE_SLACK: usize = 32;

/// A stored entry plus the sequence number of its queue slot.
#[derive(Debug)]
struct Slot<V> {
    entry: CacheEntry<V>,
    seq: u64,
}

// == Cache Store ==
/// Main cache storage with FIFO eviction and TTL support.
///
/// Entries keep the slot of their first insertion: overwriting a key refreshes
/// its value and deadline but not its position in the eviction queue. Reads
/// never reorder anything.
///
/// Removals only touch the map. The queue slot they leave behind no longer
/// matches the map's sequence number and is skipped by eviction, then dropped
/// when the queue is compacted. Every operation stays amortized O(1).
#[derive(Debug)]
pub struct CacheStore<V> {
    /// Key-value storage
    entries: HashMap<String, Slot<V>>,
    /// Insertion order as `(seq, key)`, oldest at the front. May hold stale slots.
    order: VecDeque<(u64, String)>,
    /// Sequence number handed to the next new key
    next_seq: u64,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries allowed
    max_size: usize,
    /// Default TTL in milliseconds for entries without explicit TTL
    default_ttl_ms: i64,
}

impl<V> CacheStore<V> {
    // == Constructor ==
    /// Creates a new CacheStore with specified capacity and default TTL.
    ///
    /// # Arguments
    /// * `max_size` - Maximum number of entries the cache can hold (clamped to at least 1)
    /// * `default_ttl_ms` - TTL in milliseconds for entries stored without one
    pub fn new(max_size: usize, default_ttl_ms: i64) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            next_seq: 0,
            stats: CacheStats::new(),
            max_size: max_size.max(1),
            default_ttl_ms,
        }
    }

    // == Set ==
    /// Stores a value under `key`, expiring `ttl_ms` (or the default TTL) from now.
    ///
    /// A new key arriving at capacity first evicts the oldest-inserted entry.
    /// Zero or negative TTLs are accepted and produce an entry that is already
    /// (or about to be) expired.
    pub fn set(&mut self, key: impl Into<String>, value: V, ttl_ms: Option<i64>) {
        let key = key.into();
        let entry = CacheEntry::new(value, ttl_ms.unwrap_or(self.default_ttl_ms));

        if let Some(slot) = self.entries.get_mut(&key) {
            slot.entry = entry;
            return;
        }

        if self.entries.len() >= self.max_size {
            self.evict_oldest();
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.order.push_back((seq, key.clone()));
        self.entries.insert(key, Slot { entry, seq });

        self.stats.set_size(self.entries.len());
    }

    // == Get ==
    /// Retrieves a clone of the value stored under `key`.
    ///
    /// Expired entries are removed on the spot and counted as misses.
    pub fn get(&mut self, key: &str) -> Option<V>
    where
        V: Clone,
    {
        let expired = self.entries.get(key).map(|slot| slot.entry.is_expired());

        match expired {
            Some(false) => {
                self.stats.record_hit();
                self.entries.get(key).map(|slot| slot.entry.value.clone())
            }
            Some(true) => {
                self.remove(key);
                self.stats.record_miss();
                debug!(key = %key, "Expired cache entry removed on read");
                None
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    /// Returns whether a live entry exists for `key` without touching the
    /// hit/miss counters.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries
            .get(key)
            .is_some_and(|slot| !slot.entry.is_expired())
    }

    // == Delete ==
    /// Removes an entry by key, returning whether anything was removed.
    pub fn delete(&mut self, key: &str) -> bool {
        self.remove(key)
    }

    // == Clear ==
    /// Removes every entry. Lifetime counters are left untouched.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
        self.stats.set_size(0);
    }

    // == Invalidate Pattern ==
    /// Removes every key matched by the regular expression `pattern`.
    ///
    /// Matching is unanchored: `user:` matches anywhere in the key, so callers
    /// anchor with `^`/`$` when they need prefix or exact semantics.
    ///
    /// # Errors
    /// Returns `CacheError::InvalidPattern` if `pattern` does not compile; the
    /// store is left untouched in that case.
    pub fn invalidate_pattern(&mut self, pattern: &str) -> Result<usize> {
        let regex = compile_pattern(pattern)?;
        Ok(self.invalidate_matching(&regex))
    }

    /// Removes every key matched by a precompiled expression.
    pub fn invalidate_matching(&mut self, regex: &Regex) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| !regex.is_match(key));
        self.after_removal();
        before - self.entries.len()
    }

    // == Stats ==
    /// Returns a snapshot of the current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_size(self.entries.len());
        stats
    }

    /// Lifetime hit rate as a percentage, 0.0 before any lookup.
    pub fn hit_rate(&self) -> f64 {
        self.stats.hit_rate()
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = current_timestamp_ms();
        let before = self.entries.len();
        self.entries.retain(|_, slot| !slot.entry.is_expired_at(now));
        self.after_removal();
        before - self.entries.len()
    }

    /// Snapshot of the keys currently held, oldest first.
    pub fn keys(&self) -> Vec<String> {
        self.order
            .iter()
            .filter(|(seq, key)| self.is_live_slot(*seq, key))
            .map(|(_, key)| key.clone())
            .collect()
    }

    // == Length ==
    /// Returns the number of entries physically held, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn default_ttl_ms(&self) -> i64 {
        self.default_ttl_ms
    }

    fn remove(&mut self, key: &str) -> bool {
        let removed = self.entries.remove(key).is_some();
        if removed {
            self.after_removal();
        }
        removed
    }

    fn after_removal(&mut self) {
        self.stats.set_size(self.entries.len());
        if self.order.len() > self.entries.len() * 2 + QUEUE_SLACK {
            let entries = &self.entries;
            self.order
                .retain(|(seq, key)| entries.get(key).is_some_and(|slot| slot.seq == *seq));
        }
    }

    fn is_live_slot(&self, seq: u64, key: &str) -> bool {
        self.entries.get(key).is_some_and(|slot| slot.seq == seq)
    }

    fn evict_oldest(&mut self) {
        while let Some((seq, key)) = self.order.pop_front() {
            if self.is_live_slot(seq, &key) {
                self.entries.remove(&key);
                self.stats.record_eviction();
                debug!(key = %key, "Evicted oldest cache entry");
                return;
            }
        }
    }
}

impl<V> Default for CacheStore<V> {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SIZE, DEFAULT_TTL_MS)
    }
}

/// Compiles a key pattern, mapping failures to `CacheError::InvalidPattern`.
pub(crate) fn compile_pattern(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| CacheError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    fn store() -> CacheStore<String> {
        CacheStore::new(100, 300_000)
    }

    #[test]
    fn test_store_new() {
        let store = store();
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
        assert_eq!(store.max_size(), 100);
        assert_eq!(store.default_ttl_ms(), 300_000);
    }

    #[test]
    fn test_store_default() {
        let store: CacheStore<u8> = CacheStore::default();
        assert_eq!(store.max_size(), 1000);
        assert_eq!(store.default_ttl_ms(), 300_000);
    }

    #[test]
    fn test_zero_capacity_clamped() {
        let mut store: CacheStore<u8> = CacheStore::new(0, 1_000);
        store.set("a", 1, None);
        assert_eq!(store.max_size(), 1);
        assert_eq!(store.get("a"), Some(1));
    }

    #[test]
    fn test_store_set_and_get() {
        let mut store = store();

        store.set("key1", "value1".to_string(), None);

        assert_eq!(store.get("key1").as_deref(), Some("value1"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let mut store = store();
        assert!(store.get("nonexistent").is_none());
        assert_eq!(store.stats().misses, 1);
    }

    #[test]
    fn test_store_delete() {
        let mut store = store();

        store.set("key1", "value1".to_string(), None);
        assert!(store.delete("key1"));

        assert!(store.is_empty());
        assert_eq!(store.stats().size, 0);
        assert!(store.get("key1").is_none());
    }

    #[test]
    fn test_store_delete_nonexistent() {
        let mut store = store();
        assert!(!store.delete("nonexistent"));
    }

    #[test]
    fn test_store_overwrite() {
        let mut store = store();

        store.set("key1", "value1".to_string(), None);
        store.set("key1", "value2".to_string(), None);

        assert_eq!(store.get("key1").as_deref(), Some("value2"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_ttl_expiration() {
        let mut store = store();

        store.set("k", "v".to_string(), Some(10));
        sleep(Duration::from_millis(20));
        assert!(store.get("k").is_none());

        store.set("k", "v".to_string(), Some(10_000));
        assert_eq!(store.get("k").as_deref(), Some("v"));
    }

    #[test]
    fn test_lazy_expiration_removes_on_read() {
        let mut store = store();

        store.set("live", "v".to_string(), None);
        store.set("stale", "v".to_string(), Some(-1));
        assert_eq!(store.stats().size, 2);

        assert!(store.get("stale").is_none());

        let stats = store.stats();
        assert_eq!(stats.size, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 0);
    }

    #[test]
    fn test_hit_miss_counting() {
        let mut store = store();

        assert!(store.get("k").is_none());
        store.set("k", "v".to_string(), None);
        assert!(store.get("k").is_some());

        let stats = store.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(store.hit_rate(), 50.0);
    }

    #[test]
    fn test_hit_rate_before_lookups() {
        let store = store();
        assert_eq!(store.hit_rate(), 0.0);
    }

    #[test]
    fn test_fifo_eviction() {
        let mut store = CacheStore::new(2, 300_000);

        store.set("a", 1, None);
        store.set("b", 2, None);
        store.set("c", 3, None);

        assert!(store.get("a").is_none());
        assert_eq!(store.get("b"), Some(2));
        assert_eq!(store.get("c"), Some(3));
        assert_eq!(store.stats().evictions, 1);
    }

    #[test]
    fn test_reads_do_not_protect_from_eviction() {
        let mut store = CacheStore::new(3, 300_000);

        store.set("key1", 1, None);
        store.set("key2", 2, None);
        store.set("key3", 3, None);

        // Reading key1 does not promote it
        assert_eq!(store.get("key1"), Some(1));

        store.set("key4", 4, None);

        assert!(store.get("key1").is_none());
        assert_eq!(store.get("key2"), Some(2));
    }

    #[test]
    fn test_overwrite_does_not_evict() {
        let mut store = CacheStore::new(2, 300_000);

        store.set("a", 1, None);
        store.set("b", 2, None);
        store.set("a", 10, None);

        assert_eq!(store.len(), 2);
        assert_eq!(store.stats().evictions, 0);
        assert_eq!(store.get("a"), Some(10));
        assert_eq!(store.get("b"), Some(2));
    }

    #[test]
    fn test_overwrite_keeps_insertion_slot() {
        let mut store = CacheStore::new(2, 300_000);

        store.set("a", 1, None);
        store.set("b", 2, None);
        store.set("a", 10, None);
        store.set("c", 3, None);

        // "a" was inserted first, so it is still the eviction candidate
        assert_eq!(store.keys(), vec!["b".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_delete_then_reinsert_moves_to_back() {
        let mut store = CacheStore::new(2, 300_000);

        store.set("a", 1, None);
        store.set("b", 2, None);
        store.delete("a");
        store.set("a", 1, None);
        store.set("c", 3, None);

        assert_eq!(store.keys(), vec!["a".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_overwrite_keeps_slot_after_churn() {
        let mut store = CacheStore::new(3, 300_000);

        store.set("a", 1, None);
        store.set("b", 2, None);
        store.set("c", 3, None);
        store.delete("b");
        store.set("b", 2, None);
        store.set("a", 10, None);
        store.set("d", 4, None);

        // "a" still holds the oldest slot, the stale "b" slot is skipped
        assert_eq!(
            store.keys(),
            vec!["c".to_string(), "b".to_string(), "d".to_string()]
        );
        assert_eq!(store.stats().evictions, 1);
        assert!(store.get("a").is_none());
    }

    #[test]
    fn test_eviction_skips_removed_slots() {
        let mut store = CacheStore::new(2, 300_000);

        store.set("a", 1, None);
        store.set("b", 2, None);
        store.delete("a");
        store.set("c", 3, None);
        store.set("d", 4, None);

        assert_eq!(store.keys(), vec!["c".to_string(), "d".to_string()]);
        assert_eq!(store.stats().evictions, 1);
    }

    #[test]
    fn test_order_queue_stays_bounded_under_churn() {
        let mut store = CacheStore::new(4, 300_000);

        for round in 0..10_000u32 {
            store.set("hot", round, None);
            store.delete("hot");
            store.set(format!("k{round}"), round, None);
        }

        assert_eq!(store.len(), 4);
        assert!(store.order.len() <= store.len() * 2 + QUEUE_SLACK + 1);
        assert_eq!(
            store.keys(),
            vec![
                "k9996".to_string(),
                "k9997".to_string(),
                "k9998".to_string(),
                "k9999".to_string()
            ]
        );
    }

    #[test]
    fn test_invalidate_pattern() {
        let mut store = store();

        store.set("user:1", "u1".to_string(), None);
        store.set("user:2", "u2".to_string(), None);
        store.set("users:all", "all".to_string(), None);

        let removed = store.invalidate_pattern(r"^user:\d+$").unwrap();

        assert_eq!(removed, 2);
        assert_eq!(store.keys(), vec!["users:all".to_string()]);
        assert_eq!(store.stats().size, 1);
    }

    #[test]
    fn test_invalidate_pattern_is_unanchored() {
        let mut store = store();

        store.set("dashboard:7:metrics", "m".to_string(), None);
        store.set("folder:3:breadcrumbs", "b".to_string(), None);

        assert_eq!(store.invalidate_pattern("metrics").unwrap(), 1);
        assert!(store.contains_key("folder:3:breadcrumbs"));
    }

    #[test]
    fn test_invalidate_pattern_invalid_regex() {
        let mut store = store();
        store.set("user:1", "u1".to_string(), None);

        let result = store.invalidate_pattern("user:(");

        assert!(matches!(result, Err(CacheError::InvalidPattern { .. })));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_clear_keeps_lifetime_counters() {
        let mut store = CacheStore::new(1, 300_000);

        store.set("a", 1, None);
        store.set("b", 2, None);
        store.get("b");
        store.get("a");

        store.clear();

        let stats = store.stats();
        assert_eq!(stats.size, 0);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.evictions, 1);
    }

    #[test]
    fn test_contains_key_does_not_count() {
        let mut store = store();
        store.set("k", "v".to_string(), None);
        store.set("old", "v".to_string(), Some(-5));

        assert!(store.contains_key("k"));
        assert!(!store.contains_key("old"));
        assert!(!store.contains_key("missing"));
        assert_eq!(store.stats().lookups(), 0);
    }

    #[test]
    fn test_store_cleanup_expired() {
        let mut store = store();

        store.set("key1", "value1".to_string(), Some(10));
        store.set("key2", "value2".to_string(), Some(10_000));

        sleep(Duration::from_millis(20));

        // Expired entries still count toward size until swept
        assert_eq!(store.stats().size, 2);

        let removed = store.cleanup_expired();
        assert_eq!(removed, 1);
        assert_eq!(store.stats().size, 1);
        assert!(store.get("key2").is_some());
    }
}
