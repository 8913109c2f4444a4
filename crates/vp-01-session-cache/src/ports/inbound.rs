//! Inbound port of the Session State Cache.

use crate::domain::SessionSnapshot;
use crate::error::SessionCacheError;
use async_trait::async_trait;
use shared_types::SessionId;

/// Read-through access to session snapshots.
///
/// Cache faults never surface here; only an unknown session or an
/// unreachable session store does. Callers judge acceptability themselves
/// with `SessionSnapshot::is_acceptable_at` against their own clock.
#[async_trait]
pub trait SessionStateApi: Send + Sync {
    async fn get(&self, session_id: SessionId) -> Result<SessionSnapshot, SessionCacheError>;
}
