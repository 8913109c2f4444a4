//! Vote reservations.
//!
//! A reservation key existing means a vote for that voter in that session is
//! in flight or committed.

use shared_types::{SessionId, Timestamp, VoterKey};
use std::time::Duration;

/// Sentinel stored under a reservation key.
pub const RESERVATION_SENTINEL: &str = "1";

/// Added on top of the remaining session time.
pub const DEFAULT_SAFETY_MARGIN: Duration = Duration::from_secs(60 * 60);

pub fn reservation_key(session_id: SessionId, voter_key: &VoterKey) -> String {
    format!("vote:{session_id}:{voter_key}")
}

/// Reservation lifetime: remaining session duration plus a safety margin,
/// never less than the margin itself.
///
/// The reservation must outlive the session so that a voter stays blocked
/// while their message sits in retry or dead-letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReservationTtlPolicy {
    pub safety_margin: Duration,
}

impl Default for ReservationTtlPolicy {
    fn default() -> Self {
        Self {
            safety_margin: DEFAULT_SAFETY_MARGIN,
        }
    }
}

impl ReservationTtlPolicy {
    pub fn ttl_for(&self, expires_at: Timestamp, now: Timestamp) -> Duration {
        let margin = (self.safety_margin.as_millis() as i128).max(1);
        let remaining = i128::from(expires_at) - i128::from(now) + margin;
        let millis = remaining.max(margin);
        Duration::from_millis(u64::try_from(millis).unwrap_or(u64::MAX))
    }
}
