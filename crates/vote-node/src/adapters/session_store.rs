//! In-memory session store.

use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{SessionId, SessionStatus, TimeSource, VotingSession};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;
use tracing::info;
use vp_01_session_cache::{SessionStore, SessionStoreError};

/// Voting window used when none is given.
pub const DEFAULT_VOTING_MINUTES: u32 = 1;

/// Authoritative session store held in memory.
pub struct InMemorySessionStore {
    sessions: RwLock<BTreeMap<SessionId, VotingSession>>,
    next_id: AtomicI64,
    clock: Arc<dyn TimeSource>,
    available: AtomicBool,
}

impl InMemorySessionStore {
    pub fn new(clock: Arc<dyn TimeSource>) -> Self {
        Self {
            sessions: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
            clock,
            available: AtomicBool::new(true),
        }
    }

    /// Open a session that expires `voting_minutes` from now.
    pub fn create(
        &self,
        description: impl Into<String>,
        voting_minutes: Option<u32>,
    ) -> VotingSession {
        let now = self.clock.now();
        let minutes = voting_minutes.unwrap_or(DEFAULT_VOTING_MINUTES);
        let session = VotingSession {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            description: description.into(),
            status: SessionStatus::Open,
            created_at: now,
            expires_at: now + u64::from(minutes) * 60_000,
        };
        self.sessions.write().insert(session.id, session.clone());
        info!(session_id = session.id, minutes, "Voting session created");
        session
    }

    /// Close a session. A closed session is left untouched.
    pub fn close(&self, session_id: SessionId) -> Option<VotingSession> {
        let mut sessions = self.sessions.write();
        let session = sessions.get_mut(&session_id)?;
        if session.status == SessionStatus::Open {
            session.status = SessionStatus::Closed;
            info!(session_id, "Voting session closed");
        }
        Some(session.clone())
    }

    pub fn session(&self, session_id: SessionId) -> Option<VotingSession> {
        self.sessions.read().get(&session_id).cloned()
    }

    /// Simulate the store going down.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn find_session(
        &self,
        session_id: SessionId,
    ) -> Result<Option<VotingSession>, SessionStoreError> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(SessionStoreError::Unavailable {
                reason: "session store offline".into(),
            });
        }
        Ok(self.session(session_id))
    }
}
