//! Cache backend selected at startup.

use async_trait::async_trait;
use shared_cache::{CacheError, InMemoryCache, KeyValueCache};
use std::time::Duration;
use tracing::info;

use crate::container::{CacheConfig, ConfigError};

/// The cache every pipeline component shares.
pub enum CacheBackend {
    /// Single-process deployments and tests.
    Memory(InMemoryCache),
    #[cfg(feature = "redis")]
    Redis(shared_cache::RedisCache),
}

impl CacheBackend {
    pub fn from_config(config: &CacheConfig) -> Result<Self, ConfigError> {
        match &config.redis_url {
            None => {
                info!("Using in-process cache");
                Ok(Self::Memory(InMemoryCache::new()))
            }
            #[cfg(feature = "redis")]
            Some(url) => {
                info!("Using Redis cache");
                shared_cache::RedisCache::new(url)
                    .map(Self::Redis)
                    .map_err(|e| ConfigError::Cache(e.to_string()))
            }
            #[cfg(not(feature = "redis"))]
            Some(_) => Err(ConfigError::RedisUnsupported),
        }
    }

    /// The in-process cache, when that is the backend.
    pub fn as_memory(&self) -> Option<&InMemoryCache> {
        match self {
            Self::Memory(cache) => Some(cache),
            #[cfg(feature = "redis")]
            Self::Redis(_) => None,
        }
    }
}

#[async_trait]
impl KeyValueCache for CacheBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        match self {
            Self::Memory(cache) => cache.get(key).await,
            #[cfg(feature = "redis")]
            Self::Redis(cache) => cache.get(key).await,
        }
    }

    async fn set_with_ttl(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        match self {
            Self::Memory(cache) => cache.set_with_ttl(key, value, ttl).await,
            #[cfg(feature = "redis")]
            Self::Redis(cache) => cache.set_with_ttl(key, value, ttl).await,
        }
    }

    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, CacheError> {
        match self {
            Self::Memory(cache) => cache.set_if_absent(key, value, ttl).await,
            #[cfg(feature = "redis")]
            Self::Redis(cache) => cache.set_if_absent(key, value, ttl).await,
        }
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        match self {
            Self::Memory(cache) => cache.delete(key).await,
            #[cfg(feature = "redis")]
            Self::Redis(cache) => cache.delete(key).await,
        }
    }
}
