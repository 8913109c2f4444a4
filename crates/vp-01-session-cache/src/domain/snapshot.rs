//! Cached projection of a voting session.

use serde::{Deserialize, Serialize};
use shared_types::{SessionId, SessionStatus, Timestamp, VotingSession};

/// Cache key of a session snapshot.
pub fn snapshot_key(session_id: SessionId) -> String {
    format!("session:{session_id}")
}

/// `{status, expiresAt}` as of snapshot creation.
///
/// Never mutated; a newer snapshot replaces it. `expires_at` is copied
/// verbatim from the authoritative session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub expires_at: Timestamp,
}

impl SessionSnapshot {
    pub fn from_session(session: &VotingSession) -> Self {
        Self {
            status: session.status,
            expires_at: session.expires_at,
        }
    }

    /// Whether a vote may be accepted at the caller's `now`.
    ///
    /// The session must be open and `expires_at` must not lie before `now`.
    pub fn is_acceptable_at(&self, now: Timestamp) -> bool {
        self.status == SessionStatus::Open && self.expires_at >= now
    }

    pub fn is_closed_or_expired_at(&self, now: Timestamp) -> bool {
        !self.is_acceptable_at(now)
    }
}

impl From<&VotingSession> for SessionSnapshot {
    fn from(session: &VotingSession) -> Self {
        Self::from_session(session)
    }
}
