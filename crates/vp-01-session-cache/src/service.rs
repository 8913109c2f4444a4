//! Session State Cache service

use crate::domain::{snapshot_key, SessionSnapshot, SnapshotTtlPolicy};
use crate::error::{SessionCacheError, SessionCacheResult};
use crate::ports::inbound::SessionStateApi;
use crate::ports::outbound::SessionStore;
use async_trait::async_trait;
use shared_cache::KeyValueCache;
use shared_types::{SessionId, TimeSource};
use std::sync::Arc;
use tracing::{debug, warn};
use vote_telemetry::{metric_inc, SESSION_CACHE_LOOKUPS, SESSION_CACHE_WRITE_FAILURES};

/// Read-through cache of session snapshots.
///
/// 1. Try the cache. A hit that decodes is returned as-is.
/// 2. On miss, cache error or undecodable value, ask the session store.
/// 3. Write the fresh snapshot back with a TTL from `SnapshotTtlPolicy`.
///    Write failures are logged and ignored.
pub struct SessionStateCache<C, S>
where
    C: KeyValueCache,
    S: SessionStore,
{
    cache: Arc<C>,
    store: Arc<S>,
    clock: Arc<dyn TimeSource>,
    ttl_policy: SnapshotTtlPolicy,
}

impl<C, S> SessionStateCache<C, S>
where
    C: KeyValueCache,
    S: SessionStore,
{
    pub fn new(cache: Arc<C>, store: Arc<S>, clock: Arc<dyn TimeSource>) -> Self {
        Self::with_policy(cache, store, clock, SnapshotTtlPolicy::default())
    }

    pub fn with_policy(
        cache: Arc<C>,
        store: Arc<S>,
        clock: Arc<dyn TimeSource>,
        ttl_policy: SnapshotTtlPolicy,
    ) -> Self {
        Self {
            cache,
            store,
            clock,
            ttl_policy,
        }
    }

    async fn cached(&self, session_id: SessionId, key: &str) -> Option<SessionSnapshot> {
        match self.cache.get(key).await {
            Ok(Some(raw)) => match serde_json::from_str::<SessionSnapshot>(&raw) {
                Ok(snapshot) => {
                    metric_inc!(SESSION_CACHE_LOOKUPS, &["hit"]);
                    Some(snapshot)
                }
                Err(e) => {
                    warn!(session_id, error = %e, "Discarding undecodable session snapshot");
                    metric_inc!(SESSION_CACHE_LOOKUPS, &["miss"]);
                    None
                }
            },
            Ok(None) => {
                metric_inc!(SESSION_CACHE_LOOKUPS, &["miss"]);
                None
            }
            Err(e) => {
                warn!(session_id, error = %e, "Session cache read failed, using session store");
                metric_inc!(SESSION_CACHE_LOOKUPS, &["cache_error"]);
                None
            }
        }
    }

    async fn write_back(&self, session_id: SessionId, key: &str, snapshot: &SessionSnapshot) {
        let ttl = self.ttl_policy.ttl_for(snapshot.expires_at, self.clock.now());

        let value = match serde_json::to_string(snapshot) {
            Ok(value) => value,
            Err(e) => {
                warn!(session_id, error = %e, "Session snapshot encoding failed");
                return;
            }
        };

        if let Err(e) = self.cache.set_with_ttl(key, &value, ttl).await {
            metric_inc!(SESSION_CACHE_WRITE_FAILURES);
            warn!(session_id, error = %e, "Session snapshot write-back failed");
            return;
        }

        debug!(session_id, ttl_ms = ttl.as_millis() as u64, "Session snapshot cached");
    }
}

#[async_trait]
impl<C, S> SessionStateApi for SessionStateCache<C, S>
where
    C: KeyValueCache,
    S: SessionStore,
{
    async fn get(&self, session_id: SessionId) -> SessionCacheResult<SessionSnapshot> {
        let key = snapshot_key(session_id);

        if let Some(snapshot) = self.cached(session_id, &key).await {
            return Ok(snapshot);
        }

        let session = self
            .store
            .find_session(session_id)
            .await?
            .ok_or(SessionCacheError::SessionNotFound { session_id })?;

        let snapshot = SessionSnapshot::from_session(&session);
        self.write_back(session_id, &key, &snapshot).await;
        Ok(snapshot)
    }
}
