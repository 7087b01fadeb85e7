//! Cache service trait and error types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    Connection(String),
    #[error("Cache operation error: {0}")]
    Operation(String),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// What a redirect needs to know about a live link.
///
/// The id travels with the URL so a cache hit can still feed the access log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedLink {
    pub id: i64,
    pub original_url: String,
}

/// A cached redirect decision for one short code.
///
/// Deleted codes are remembered as [`CacheEntry::Gone`] so a fill that read
/// the row before the delete cannot bring the link back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CacheEntry {
    Live(CachedLink),
    Gone,
}

/// Trait for caching short code lookups.
///
/// Implementations must be thread-safe. A failing cache must never fail a
/// request: callers fall back to the database.
///
/// Writes come from two sides. Redirects fill the cache after a database
/// read with [`CacheService::fill_link`], which never replaces an existing
/// entry. Owner changes write through with [`CacheService::set_link`] and
/// [`CacheService::mark_gone`], which always replace it. A fill racing an
/// update or delete therefore loses.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed cache with TTL support
/// - [`crate::infrastructure::cache::NullCache`] - No-op implementation for disabled caching
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Returns the cached entry for a short code, `Ok(None)` on a miss.
    async fn get_link(&self, short_code: &str) -> CacheResult<Option<CacheEntry>>;

    /// Stores a link read from the database unless an entry already exists.
    ///
    /// Returns whether the entry was written.
    async fn fill_link(&self, short_code: &str, link: &CachedLink) -> CacheResult<bool>;

    /// Replaces the entry after the link's destination changed.
    async fn set_link(&self, short_code: &str, link: &CachedLink) -> CacheResult<()>;

    /// Replaces the entry with a tombstone after the link was deleted.
    async fn mark_gone(&self, short_code: &str) -> CacheResult<()>;

    /// Checks if the cache backend is reachable.
    async fn health_check(&self) -> bool;
}
