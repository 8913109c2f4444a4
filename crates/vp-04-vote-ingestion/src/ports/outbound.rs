//! Outbound ports of the Vote Ingestion Consumer.

use async_trait::async_trait;
use shared_types::VoteRecord;
use thiserror::Error;

/// Errors from the durable vote store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    #[error("Vote store unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("Vote store timed out after {millis} ms")]
    Timeout { millis: u64 },

    /// A row was rejected for a reason other than the uniqueness key.
    #[error("Vote rejected by store: {reason}")]
    Rejected { reason: String },
}

impl PersistenceError {
    /// Stable category carried in the envelope's `lastErrorKind`.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unavailable { .. } => "storage_unavailable",
            Self::Timeout { .. } => "storage_timeout",
            Self::Rejected { .. } => "record_rejected",
        }
    }
}

/// Durable vote store.
#[async_trait]
pub trait VoteRepository: Send + Sync {
    /// Insert all records in one statement, skipping any whose
    /// `(session_id, voter_key)` already exists (including repeats within
    /// `records`). Returns the number of rows actually inserted.
    ///
    /// All-or-nothing: on error no record of the batch is persisted.
    async fn insert_votes_ignoring_duplicates(
        &self,
        records: &[VoteRecord],
    ) -> Result<usize, PersistenceError>;
}
