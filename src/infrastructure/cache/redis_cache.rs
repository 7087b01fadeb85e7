//! Redis-backed cache implementation.

use super::service::{CacheEntry, CacheError, CacheResult, CacheService, CachedLink};
use async_trait::async_trait;
use redis::{
    AsyncCommands, Client, ExistenceCheck, SetExpiry, SetOptions, aio::ConnectionManager,
};
use tracing::{debug, info, warn};

const KEY_PREFIX: &str = "shorturl:";

/// Redis cache of short code lookups.
///
/// Entries are JSON-encoded [`CacheEntry`] values under `shorturl:{code}`,
/// tombstones included, all with the same TTL. Fills use `SET NX` so they
/// never overwrite a write-through. Read and write failures are logged and
/// reported as misses.
pub struct RedisCache {
    client: ConnectionManager,
    default_ttl: u64,
}

impl RedisCache {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Connection`] if the URL is invalid, the connection
    /// cannot be established, or the PING fails.
    pub async fn connect(redis_url: &str, default_ttl_seconds: u64) -> CacheResult<Self> {
        info!("Connecting to Redis");

        let client = Client::open(redis_url)
            .map_err(|e| CacheError::Connection(format!("Failed to create Redis client: {}", e)))?;

        let manager = ConnectionManager::new(client)
            .await
            .map_err(|e| CacheError::Connection(format!("Failed to connect to Redis: {}", e)))?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| CacheError::Connection(format!("Redis PING failed: {}", e)))?;

        info!("✓ Connected to Redis");

        Ok(Self {
            client: manager,
            default_ttl: default_ttl_seconds,
        })
    }
}

fn build_key(short_code: &str) -> String {
    format!("{}{}", KEY_PREFIX, short_code)
}

fn encode(entry: &CacheEntry) -> CacheResult<String> {
    serde_json::to_string(entry)
        .map_err(|e| CacheError::Operation(format!("Failed to encode entry: {}", e)))
}

impl RedisCache {
    async fn write(&self, short_code: &str, entry: &CacheEntry, only_if_absent: bool) -> bool {
        let payload = match encode(entry) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(code = %short_code, error = %e, "Skipping cache write");
                return false;
            }
        };

        let mut options = SetOptions::default().with_expiration(SetExpiry::EX(self.default_ttl));
        if only_if_absent {
            options = options.conditional_set(ExistenceCheck::NX);
        }

        let mut conn = self.client.clone();
        match conn
            .set_options::<_, _, Option<String>>(build_key(short_code), payload, options)
            .await
        {
            Ok(Some(_)) => {
                debug!(code = %short_code, ttl = self.default_ttl, "Cache SET");
                true
            }
            Ok(None) => {
                debug!(code = %short_code, "Cache entry already present, fill skipped");
                false
            }
            Err(e) => {
                warn!(code = %short_code, error = %e, "Redis SET error");
                false
            }
        }
    }
}

#[async_trait]
impl CacheService for RedisCache {
    async fn get_link(&self, short_code: &str) -> CacheResult<Option<CacheEntry>> {
        let mut conn = self.client.clone();

        let raw = match conn.get::<_, Option<String>>(build_key(short_code)).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(code = %short_code, error = %e, "Redis GET error");
                return Ok(None);
            }
        };

        let Some(raw) = raw else {
            debug!(code = %short_code, "Cache MISS");
            return Ok(None);
        };

        match serde_json::from_str::<CacheEntry>(&raw) {
            Ok(entry) => {
                debug!(code = %short_code, "Cache HIT");
                Ok(Some(entry))
            }
            Err(e) => {
                warn!(code = %short_code, error = %e, "Discarding undecodable cache entry");
                Ok(None)
            }
        }
    }

    async fn fill_link(&self, short_code: &str, link: &CachedLink) -> CacheResult<bool> {
        Ok(self
            .write(short_code, &CacheEntry::Live(link.clone()), true)
            .await)
    }

    async fn set_link(&self, short_code: &str, link: &CachedLink) -> CacheResult<()> {
        self.write(short_code, &CacheEntry::Live(link.clone()), false)
            .await;
        Ok(())
    }

    async fn mark_gone(&self, short_code: &str) -> CacheResult<()> {
        self.write(short_code, &CacheEntry::Gone, false).await;
        Ok(())
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_key() {
        assert_eq!(build_key("Ab3dE9"), "shorturl:Ab3dE9");
    }

    #[test]
    fn test_encode_tombstone() {
        assert_eq!(encode(&CacheEntry::Gone).unwrap(), r#"{"state":"gone"}"#);
    }
}
