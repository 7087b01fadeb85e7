//! No-op cache implementation for disabled caching.

use super::service::{CacheEntry, CacheResult, CacheService, CachedLink};
use async_trait::async_trait;
use tracing::debug;

/// A cache implementation that does nothing.
///
/// Used when Redis is not configured and in HTTP tests. Every lookup is a miss.
pub struct NullCache;

impl NullCache {
    pub fn new() -> Self {
        debug!("Using NullCache (caching disabled)");
        Self
    }
}

impl Default for NullCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheService for NullCache {
    async fn get_link(&self, _short_code: &str) -> CacheResult<Option<CacheEntry>> {
        Ok(None)
    }

    async fn fill_link(&self, _short_code: &str, _link: &CachedLink) -> CacheResult<bool> {
        Ok(false)
    }

    async fn set_link(&self, _short_code: &str, _link: &CachedLink) -> CacheResult<()> {
        Ok(())
    }

    async fn mark_gone(&self, _short_code: &str) -> CacheResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }
}
