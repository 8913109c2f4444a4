//! Cache port definition.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors from cache operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// The store could not be reached.
    #[error("Cache unreachable: {reason}")]
    Unreachable { reason: String },

    /// The store rejected or failed the command.
    #[error("Cache command failed: {reason}")]
    Command { reason: String },

    /// Entries must carry a positive TTL.
    #[error("Cache TTL must be positive")]
    InvalidTtl,
}

/// TTL-aware key/value store shared by all pipeline processes.
#[async_trait]
pub trait KeyValueCache: Send + Sync {
    /// Read a key. Expired keys read as absent.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Unconditionally write a key with the given TTL.
    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration)
        -> Result<(), CacheError>;

    /// Atomically write a key only if it is absent.
    ///
    /// Returns `true` if this call created the key. Concurrent callers racing
    /// on the same key see exactly one `true`.
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration)
        -> Result<bool, CacheError>;

    /// Delete a key. Returns `true` if a live key was removed.
    async fn delete(&self, key: &str) -> Result<bool, CacheError>;
}
