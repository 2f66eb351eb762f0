//! Well-known cache keys and TTL tiers shared by the back-office handlers.

use std::fmt;

// == TTL Tiers ==
/// Named lifetimes handlers pick from instead of raw millisecond counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheTtl {
    /// 1 minute
    Short,
    /// 5 minutes
    Medium,
    /// 10 minutes
    Long,
    /// 30 minutes
    VeryLong,
}

impl CacheTtl {
    /// Lifetime in milliseconds, the unit the cache takes.
    pub const fn as_millis(self) -> i64 {
        match self {
            CacheTtl::Short => 60_000,
            CacheTtl::Medium => 5 * 60_000,
            CacheTtl::Long => 10 * 60_000,
            CacheTtl::VeryLong => 30 * 60_000,
        }
    }
}

impl From<CacheTtl> for Option<i64> {
    fn from(ttl: CacheTtl) -> Self {
        Some(ttl.as_millis())
    }
}

// == Cache Keys ==
/// Builders for the keys the document, user and dashboard handlers cache under.
///
/// ```
/// use ledger_cache::cache::CacheKeys;
///
/// assert_eq!(CacheKeys::folder_breadcrumbs("42"), "folder:42:breadcrumbs");
/// assert_eq!(CacheKeys::user(7), "user:7");
/// ```
pub struct CacheKeys;

impl CacheKeys {
    /// The whole document folder tree.
    pub const DOCUMENT_TREE: &'static str = "documents:tree";
    /// Every user with their roles.
    pub const ALL_USERS: &'static str = "users:all";
    /// Aggregate invoice figures shown on the dashboard.
    pub const INVOICE_STATS: &'static str = "dashboard:invoices:stats";
    /// Aggregate payment figures shown on the dashboard.
    pub const PAYMENT_STATS: &'static str = "dashboard:payments:stats";

    /// Matches every folder breadcrumb key.
    pub const BREADCRUMBS_PATTERN: &'static str = r"^folder:.+:breadcrumbs$";
    /// Matches every dashboard key, per-user metrics and aggregates alike.
    pub const DASHBOARD_PATTERN: &'static str = r"^dashboard:";

    pub fn folder_breadcrumbs(folder_id: impl fmt::Display) -> String {
        format!("folder:{folder_id}:breadcrumbs")
    }

    pub fn user(user_id: impl fmt::Display) -> String {
        format!("user:{user_id}")
    }

    pub fn user_permissions(user_id: impl fmt::Display) -> String {
        format!("user:{user_id}:permissions")
    }

    pub fn dashboard_metrics(user_id: impl fmt::Display) -> String {
        format!("dashboard:{user_id}:metrics")
    }
}
