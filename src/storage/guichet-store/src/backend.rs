//! Key-value backend trait definition.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::StoreError;

/// Key-value backend trait implemented by every session store.
///
/// The operation surface is identical regardless of topology; callers never
/// learn whether a single node or a cluster is serving them. Implementations
/// must be safe for concurrent use by many callers without external locking.
#[async_trait]
pub trait KvBackend: Send + Sync {
    /// Get a value by key. An absent key is `Ok(None)`, not an error.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Set a value, optionally expiring after `ttl`.
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>)
        -> Result<(), StoreError>;

    /// Delete a value by key.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Atomically increment the integer value at `key`, returning the new value.
    async fn incr(&self, key: &str) -> Result<i64, StoreError>;

    /// Set an absolute expiry (Unix seconds). Returns whether the key existed.
    async fn expire_at(&self, key: &str, unix_secs: u64) -> Result<bool, StoreError>;

    /// List keys matching a glob pattern.
    async fn keys(&self, pattern: &str) -> Result<Vec<String>, StoreError>;

    /// Liveness probe. For sharded backends this must reach every shard.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Release the connection. Operations after `close` are undefined.
    async fn close(&self) -> Result<(), StoreError>;

    /// Check if a key exists.
    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.get(key).await?.is_some())
    }
}
