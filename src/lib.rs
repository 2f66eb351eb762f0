//! Ledger Cache - process-local TTL cache for the ledger back office
//!
//! Provides a bounded in-memory cache with TTL expiration, FIFO eviction,
//! regex-based invalidation and a small admin HTTP surface.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{Cache, CacheKeys, CacheTtl};
pub use config::Config;
