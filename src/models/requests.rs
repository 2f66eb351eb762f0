//! Request DTOs for the cache admin API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

/// Request body for POST /admin/cache/invalidate
///
/// # Fields
/// - `pattern`: Regular expression matched (unanchored) against every cached key
#[derive(Debug, Clone, Deserialize)]
pub struct InvalidateRequest {
    pub pattern: String,
}

impl InvalidateRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    /// Regex syntax itself is checked by the cache.
    pub fn validate(&self) -> Option<String> {
        if self.pattern.is_empty() {
            // An empty regex matches every key; clearing has its own endpoint
            return Some("Pattern cannot be empty".to_string());
        }
        None
    }
}
