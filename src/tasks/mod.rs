//! Background Tasks Module
//!
//! Contains background tasks that run for the lifetime of a cache.
//!
//! # Tasks
//! - Expiry sweep: reclaims expired entries nobody reads again

mod sweep;

pub use sweep::{spawn_sweep_task, SWEEP_INTERVAL};
