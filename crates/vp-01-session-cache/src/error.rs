//! Error types for the Session State Cache.

use crate::ports::SessionStoreError;
use shared_types::SessionId;
use thiserror::Error;

/// Session State Cache errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionCacheError {
    /// No such session in the authoritative store.
    #[error("Session {session_id} not found")]
    SessionNotFound { session_id: SessionId },

    /// Cache missed and the store could not be asked.
    #[error("Session store unavailable: {reason}")]
    StoreUnavailable { reason: String },
}

impl From<SessionStoreError> for SessionCacheError {
    fn from(e: SessionStoreError) -> Self {
        match e {
            SessionStoreError::Unavailable { reason } => Self::StoreUnavailable { reason },
        }
    }
}

/// Result type for Session State Cache operations
pub type SessionCacheResult<T> = Result<T, SessionCacheError>;
