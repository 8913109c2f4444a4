//! Duplicate Vote Guard service

use crate::domain::{reservation_key, RESERVATION_SENTINEL};
use crate::error::GuardError;
use crate::ports::inbound::VoteGuardApi;
use crate::ports::outbound::PersistedVoteLookup;
use async_trait::async_trait;
use shared_cache::KeyValueCache;
use shared_types::{SessionId, VoterKey};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};
use vote_telemetry::{metric_inc, GUARD_RELEASES, GUARD_RESERVATIONS};

/// Reservation guard over the shared cache.
///
/// ## Paths
///
/// - **Primary**: atomic set-if-absent on `vote:{sessionId}:{voterKey}`.
///   Concurrent callers race into a single winner.
/// - **Degraded**: cache unreachable, so answer `!exists_vote(..)` from the
///   durable store. Not atomic with the later insert; two concurrent late
///   voters may both pass, and the storage uniqueness constraint absorbs
///   the second record.
pub struct DuplicateVoteGuard<C, L>
where
    C: KeyValueCache,
    L: PersistedVoteLookup,
{
    cache: Arc<C>,
    votes: Arc<L>,
}

impl<C, L> DuplicateVoteGuard<C, L>
where
    C: KeyValueCache,
    L: PersistedVoteLookup,
{
    pub fn new(cache: Arc<C>, votes: Arc<L>) -> Self {
        Self { cache, votes }
    }

    async fn reserve_degraded(
        &self,
        session_id: SessionId,
        voter_key: &VoterKey,
        cache_error: String,
    ) -> Result<bool, GuardError> {
        match self.votes.exists_vote(session_id, voter_key).await {
            Ok(exists) => {
                let result = if exists { "duplicate" } else { "reserved" };
                metric_inc!(GUARD_RESERVATIONS, &["degraded", result]);
                warn!(
                    session_id,
                    voter_key = %voter_key,
                    already_voted = exists,
                    "Reservation answered from vote store (cache unavailable)"
                );
                Ok(!exists)
            }
            Err(e) => {
                metric_inc!(GUARD_RESERVATIONS, &["degraded", "failed"]);
                error!(
                    session_id,
                    voter_key = %voter_key,
                    cache_error = %cache_error,
                    store_error = %e,
                    "Reservation undecidable"
                );
                Err(GuardError::Undecidable {
                    cache: cache_error,
                    store: e.to_string(),
                })
            }
        }
    }
}

#[async_trait]
impl<C, L> VoteGuardApi for DuplicateVoteGuard<C, L>
where
    C: KeyValueCache,
    L: PersistedVoteLookup,
{
    async fn reserve(
        &self,
        session_id: SessionId,
        voter_key: &VoterKey,
        ttl: Duration,
    ) -> Result<bool, GuardError> {
        let key = reservation_key(session_id, voter_key);

        match self.cache.set_if_absent(&key, RESERVATION_SENTINEL, ttl).await {
            Ok(reserved) => {
                let result = if reserved { "reserved" } else { "duplicate" };
                metric_inc!(GUARD_RESERVATIONS, &["cache", result]);
                debug!(session_id, voter_key = %voter_key, reserved, "Reservation attempted");
                Ok(reserved)
            }
            Err(e) => {
                self.reserve_degraded(session_id, voter_key, e.to_string())
                    .await
            }
        }
    }

    async fn release(&self, session_id: SessionId, voter_key: &VoterKey) {
        let key = reservation_key(session_id, voter_key);
        match self.cache.delete(&key).await {
            Ok(removed) => {
                metric_inc!(GUARD_RELEASES);
                debug!(session_id, voter_key = %voter_key, removed, "Reservation released");
            }
            Err(e) => {
                warn!(session_id, voter_key = %voter_key, error = %e, "Reservation release failed");
            }
        }
    }
}
