//! Cache health report for the admin surface.

use serde::Serialize;

use crate::cache::CacheStats;

// == Cache Health ==
/// Qualitative label derived from the lifetime hit rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheHealth {
    /// Hit rate above 70%
    Excellent,
    /// Hit rate above 50%
    Good,
    Poor,
}

impl CacheHealth {
    pub fn from_hit_rate(hit_rate: f64) -> Self {
        if hit_rate > 70.0 {
            CacheHealth::Excellent
        } else if hit_rate > 50.0 {
            CacheHealth::Good
        } else {
            CacheHealth::Poor
        }
    }
}

// == Cache Report ==
/// Stats snapshot plus derived hit rate, health and advice.
#[derive(Debug, Clone, Serialize)]
pub struct CacheReport {
    #[serde(flatten)]
    pub stats: CacheStats,
    /// Percentage, 0.0 before any lookup
    pub hit_rate: f64,
    pub health: CacheHealth,
    pub recommendations: Vec<String>,
}

impl CacheReport {
    pub fn from_stats(stats: CacheStats, max_size: usize) -> Self {
        let hit_rate = stats.hit_rate();
        let mut recommendations = Vec::new();

        // A cold cache with no lookups has nothing to advise on yet
        if stats.lookups() > 0 && hit_rate < 50.0 {
            recommendations.push(
                "Hit rate is low: consider longer TTL tiers for data that rarely changes"
                    .to_string(),
            );
            recommendations.push(
                "Review invalidation patterns: broad patterns may be dropping entries that are still valid"
                    .to_string(),
            );
        }

        if stats.evictions > 0 {
            recommendations.push(format!(
                "{} entries were evicted at capacity {}: consider raising CACHE_MAX_SIZE",
                stats.evictions, max_size
            ));
        }

        Self {
            health: CacheHealth::from_hit_rate(hit_rate),
            hit_rate,
            stats,
            recommendations,
        }
    }
}
