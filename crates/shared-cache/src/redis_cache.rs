//! Redis-backed cache.
//!
//! Reservations use `SET key value NX PX ttl`, so the single atomic Redis
//! command is the only coordination point between processes.

use crate::port::{CacheError, KeyValueCache};
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client, RedisError};
use std::time::Duration;
use tracing::debug;

/// `KeyValueCache` over a Redis server.
#[derive(Debug, Clone)]
pub struct RedisCache {
    client: Client,
}

impl RedisCache {
    /// Create a cache for `redis_url` (e.g. `redis://127.0.0.1:6379`).
    ///
    /// No connection is made until the first command.
    pub fn new(redis_url: &str) -> Result<Self, CacheError> {
        let client = Client::open(redis_url).map_err(|e| CacheError::Unreachable {
            reason: e.to_string(),
        })?;
        Ok(Self { client })
    }

    async fn connection(&self) -> Result<MultiplexedConnection, CacheError> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| CacheError::Unreachable {
                reason: e.to_string(),
            })
    }
}

fn ttl_millis(ttl: Duration) -> Result<u64, CacheError> {
    let millis = ttl.as_millis();
    if millis == 0 {
        return Err(CacheError::InvalidTtl);
    }
    Ok(u64::try_from(millis).unwrap_or(u64::MAX))
}

fn command_error(e: RedisError) -> CacheError {
    if e.is_io_error() || e.is_connection_dropped() {
        CacheError::Unreachable {
            reason: e.to_string(),
        }
    } else {
        CacheError::Command {
            reason: e.to_string(),
        }
    }
}

#[async_trait]
impl KeyValueCache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut con = self.connection().await?;
        let value: Option<String> = con.get(key).await.map_err(command_error)?;
        Ok(value)
    }

    async fn set_with_ttl(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let millis = ttl_millis(ttl)?;
        let mut con = self.connection().await?;
        redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("PX")
            .arg(millis)
            .query_async::<()>(&mut con)
            .await
            .map_err(command_error)
    }

    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, CacheError> {
        let millis = ttl_millis(ttl)?;
        let mut con = self.connection().await?;
        // Nil reply means the key already existed.
        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("NX")
            .arg("PX")
            .arg(millis)
            .query_async(&mut con)
            .await
            .map_err(command_error)?;

        debug!(key, reserved = reply.is_some(), "SET NX");
        Ok(reply.is_some())
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        let mut con = self.connection().await?;
        let removed: i64 = con.del(key).await.map_err(command_error)?;
        Ok(removed > 0)
    }
}
