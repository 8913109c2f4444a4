//! Outbound ports of the Session State Cache.

use async_trait::async_trait;
use shared_types::{SessionId, VotingSession};
use thiserror::Error;

/// Errors reported by the authoritative session store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionStoreError {
    #[error("Session store unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Source of truth for voting sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn find_session(
        &self,
        session_id: SessionId,
    ) -> Result<Option<VotingSession>, SessionStoreError>;
}
