//! Cache Module
//!
//! Provides process-local caching with TTL expiration, FIFO eviction and
//! pattern-based invalidation.

mod entry;
mod invalidation;
mod keys;
mod report;
mod shared;
mod stats;
mod store;


// Re-export public types
pub use entry::{current_timestamp_ms, CacheEntry};
pub use invalidation::InvalidationResult;
pub use keys::{CacheKeys, CacheTtl};
pub use report::{CacheHealth, CacheReport};
pub use shared::Cache;
pub use stats::CacheStats;
pub use store::CacheStore;

// == Public Constants ==
/// Capacity used when none is configured
pub const DEFAULT_MAX_SIZE: usize = 1000;

/// Default entry lifetime in milliseconds (5 minutes)
pub const DEFAULT_TTL_MS: i64 = 300_000;
