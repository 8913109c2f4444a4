//! Vote Submission service

use crate::submission::domain::{Eligibility, SubmissionOutcome};
use crate::submission::ports::EligibilityOracle;
use shared_types::{SessionId, TimeSource, VoteChoice, VoteMessage, VoterKey};
use std::sync::Arc;
use tracing::{debug, info, warn};
use vote_telemetry::{metric_inc, SUBMISSIONS};
use vp_01_session_cache::{SessionCacheError, SessionStateApi};
use vp_02_vote_guard::{ReservationTtlPolicy, VoteGuardApi};
use vp_03_vote_dispatcher::VoteDispatchApi;

/// Accepts votes into the delivery pipeline.
///
/// Ordering within one submission: session gate, eligibility, reservation,
/// publish. A reservation is released only when the publish fails.
pub struct VoteSubmissionService<S, G, D, O>
where
    S: SessionStateApi,
    G: VoteGuardApi,
    D: VoteDispatchApi,
    O: EligibilityOracle,
{
    sessions: Arc<S>,
    guard: Arc<G>,
    dispatcher: Arc<D>,
    oracle: Arc<O>,
    clock: Arc<dyn TimeSource>,
    reservation_policy: ReservationTtlPolicy,
}

impl<S, G, D, O> VoteSubmissionService<S, G, D, O>
where
    S: SessionStateApi,
    G: VoteGuardApi,
    D: VoteDispatchApi,
    O: EligibilityOracle,
{
    pub fn new(
        sessions: Arc<S>,
        guard: Arc<G>,
        dispatcher: Arc<D>,
        oracle: Arc<O>,
        clock: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            sessions,
            guard,
            dispatcher,
            oracle,
            clock,
            reservation_policy: ReservationTtlPolicy::default(),
        }
    }

    /// Submit `raw_voter_key`'s vote in `session_id`.
    ///
    /// The key is normalized to its digits before any check.
    pub async fn submit(
        &self,
        session_id: SessionId,
        raw_voter_key: &str,
        choice: VoteChoice,
    ) -> SubmissionOutcome {
        let outcome = self.evaluate(session_id, raw_voter_key, choice).await;
        metric_inc!(SUBMISSIONS, &[outcome.as_str()]);
        outcome
    }

    async fn evaluate(
        &self,
        session_id: SessionId,
        raw_voter_key: &str,
        choice: VoteChoice,
    ) -> SubmissionOutcome {
        let now = self.clock.now();

        let snapshot = match self.sessions.get(session_id).await {
            Ok(snapshot) => snapshot,
            Err(SessionCacheError::SessionNotFound { .. }) => {
                debug!(session_id, "Vote for unknown session");
                return SubmissionOutcome::SessionInvalid;
            }
            Err(e @ SessionCacheError::StoreUnavailable { .. }) => {
                warn!(session_id, error = %e, "Session state unavailable");
                return SubmissionOutcome::UnavailableTemporarily;
            }
        };
        if !snapshot.is_acceptable_at(now) {
            debug!(
                session_id,
                status = ?snapshot.status,
                expires_at = snapshot.expires_at,
                "Vote for closed or expired session"
            );
            return SubmissionOutcome::SessionInvalid;
        }

        let voter_key = VoterKey::normalize(raw_voter_key);
        let verdict = self.oracle.check(&voter_key);
        if verdict != Eligibility::Eligible {
            debug!(session_id, voter_key = %voter_key, ?verdict, "Voter rejected");
            return SubmissionOutcome::Ineligible;
        }

        let ttl = self.reservation_policy.ttl_for(snapshot.expires_at, now);
        match self.guard.reserve(session_id, &voter_key, ttl).await {
            Ok(true) => {}
            Ok(false) => {
                debug!(session_id, voter_key = %voter_key, "Duplicate vote");
                return SubmissionOutcome::Duplicate;
            }
            Err(e) => {
                warn!(session_id, voter_key = %voter_key, error = %e, "Reservation failed");
                return SubmissionOutcome::UnavailableTemporarily;
            }
        }

        let message = VoteMessage::new(session_id, voter_key.clone(), choice);
        match self.dispatcher.publish_new(message).await {
            Ok(envelope) => {
                info!(
                    session_id,
                    voter_key = %voter_key,
                    message_id = %envelope.message_id,
                    "Vote accepted"
                );
                SubmissionOutcome::Accepted
            }
            Err(e) => {
                warn!(
                    session_id,
                    voter_key = %voter_key,
                    error = %e,
                    "Vote publish failed, releasing reservation"
                );
                self.guard.release(session_id, &voter_key).await;
                SubmissionOutcome::UnavailableTemporarily
            }
        }
    }
}
