//! Invalidation policy: maps back-office domain events to cache deletions.
//!
//! None of this holds state. Each operation issues single-key deletes and/or
//! pattern invalidations against the shared cache and reports what it did.

use std::sync::LazyLock;

use regex::Regex;
use tracing::info;

use crate::cache::{Cache, CacheKeys};

static BREADCRUMBS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(CacheKeys::BREADCRUMBS_PATTERN).expect("breadcrumbs pattern is valid")
});

static DASHBOARD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(CacheKeys::DASHBOARD_PATTERN).expect("dashboard pattern is valid")
});

/// Outcome of an invalidation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidationResult {
    /// Number of entries removed.
    pub count: usize,
    /// Keys deleted and patterns applied, in the order they were issued.
    pub patterns: Vec<String>,
}

impl InvalidationResult {
    fn new() -> Self {
        Self {
            count: 0,
            patterns: Vec::new(),
        }
    }

    fn deleted(&mut self, key: impl Into<String>, removed: bool) {
        self.count += usize::from(removed);
        self.patterns.push(key.into());
    }

    fn matched(&mut self, pattern: &str, removed: usize) {
        self.count += removed;
        self.patterns.push(pattern.to_string());
    }
}

impl<V> Cache<V>
where
    V: Send + Sync + 'static,
{
    /// A folder or document was created, moved, renamed or removed: drop the
    /// cached tree and every breadcrumb path.
    pub async fn invalidate_document_tree(&self) -> InvalidationResult {
        let mut result = InvalidationResult::new();

        let removed = self.delete(CacheKeys::DOCUMENT_TREE).await;
        result.deleted(CacheKeys::DOCUMENT_TREE, removed);

        let removed = self.invalidate_matching(&BREADCRUMBS).await;
        result.matched(CacheKeys::BREADCRUMBS_PATTERN, removed);

        info!(count = result.count, "Document tree cache invalidated");
        result
    }

    /// A single folder changed in place: drop its breadcrumbs and the tree.
    pub async fn invalidate_folder(&self, folder_id: &str) -> InvalidationResult {
        let mut result = InvalidationResult::new();

        let key = CacheKeys::folder_breadcrumbs(folder_id);
        let removed = self.delete(&key).await;
        result.deleted(key, removed);

        let removed = self.delete(CacheKeys::DOCUMENT_TREE).await;
        result.deleted(CacheKeys::DOCUMENT_TREE, removed);

        info!(folder_id = %folder_id, count = result.count, "Folder cache invalidated");
        result
    }

    /// An invoice or payment was mutated: drop every dashboard key.
    pub async fn invalidate_dashboard(&self) -> InvalidationResult {
        let mut result = InvalidationResult::new();

        let removed = self.invalidate_matching(&DASHBOARD).await;
        result.matched(CacheKeys::DASHBOARD_PATTERN, removed);

        info!(count = result.count, "Dashboard cache invalidated");
        result
    }

    /// A user's record or permissions changed: drop that user's keys and the
    /// aggregate user list.
    pub async fn invalidate_user(&self, user_id: &str) -> InvalidationResult {
        let mut result = InvalidationResult::new();

        for key in [
            CacheKeys::user(user_id),
            CacheKeys::user_permissions(user_id),
            CacheKeys::ALL_USERS.to_string(),
        ] {
            let removed = self.delete(&key).await;
            result.deleted(key, removed);
        }

        info!(user_id = %user_id, count = result.count, "User cache invalidated");
        result
    }

    /// Administrative reset: empty the whole cache.
    pub async fn invalidate_all(&self) -> InvalidationResult {
        let count = self.clear().await;

        info!(count, "Cache cleared");
        InvalidationResult {
            count,
            patterns: vec![".*".to_string()],
        }
    }
}
