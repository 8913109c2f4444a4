//! Inbound port of the Duplicate Vote Guard.

use crate::error::GuardError;
use async_trait::async_trait;
use shared_types::{SessionId, VoterKey};
use std::time::Duration;

/// Exactly-once-per-voter reservations.
#[async_trait]
pub trait VoteGuardApi: Send + Sync {
    /// Reserve `(session_id, voter_key)` for `ttl`.
    ///
    /// - `Ok(true)`: first reservation, the caller may publish the vote
    /// - `Ok(false)`: already reserved or already persisted, reject as duplicate
    /// - `Err(_)`: neither the cache nor the durable store could answer
    async fn reserve(
        &self,
        session_id: SessionId,
        voter_key: &VoterKey,
        ttl: Duration,
    ) -> Result<bool, GuardError>;

    /// Drop a reservation whose vote never entered the delivery pipeline.
    /// Best-effort and idempotent.
    async fn release(&self, session_id: SessionId, voter_key: &VoterKey);
}
