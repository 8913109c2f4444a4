//! Outbound ports of the Duplicate Vote Guard.

use async_trait::async_trait;
use shared_types::{SessionId, VoterKey};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VoteLookupError {
    #[error("Vote store unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Point-in-time existence check against durable vote records.
#[async_trait]
pub trait PersistedVoteLookup: Send + Sync {
    async fn exists_vote(
        &self,
        session_id: SessionId,
        voter_key: &VoterKey,
    ) -> Result<bool, VoteLookupError>;
}
