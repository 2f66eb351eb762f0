//! API Module
//!
//! HTTP handlers and routing for the cache admin API.
//!
//! # Endpoints
//! - `GET /health` - Health check endpoint
//! - `GET /admin/cache/stats` - Cache statistics and health report
//! - `DELETE /admin/cache` - Clear the cache
//! - `POST /admin/cache/invalidate` - Invalidate keys by pattern

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
