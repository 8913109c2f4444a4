//! In-memory durable vote store.

use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{SessionId, VoteRecord, VoteTally, VoterKey};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use tracing::debug;
use vp_02_vote_guard::{PersistedVoteLookup, VoteLookupError};
use vp_04_vote_ingestion::{PersistenceError, VoteRepository};

/// Vote store keyed by `(session_id, voter_key)`.
///
/// Batch inserts are all-or-nothing and skip existing keys.
#[derive(Default)]
pub struct InMemoryVoteStore {
    records: Mutex<BTreeMap<(SessionId, VoterKey), VoteRecord>>,
    unavailable: AtomicBool,
    failing_inserts: AtomicU32,
}

impl InMemoryVoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the store going down for lookups and inserts.
    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    /// Fail the next `count` batch inserts.
    pub fn fail_next_inserts(&self, count: u32) {
        self.failing_inserts.store(count, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    pub fn contains(&self, session_id: SessionId, voter_key: &VoterKey) -> bool {
        self.records
            .lock()
            .contains_key(&(session_id, voter_key.clone()))
    }

    pub fn records_for(&self, session_id: SessionId) -> Vec<VoteRecord> {
        self.records
            .lock()
            .values()
            .filter(|r| r.session_id == session_id)
            .cloned()
            .collect()
    }

    /// Yes / no / total counts of a session.
    pub fn tally(&self, session_id: SessionId) -> VoteTally {
        let mut tally = VoteTally::default();
        for record in self.records.lock().values() {
            if record.session_id == session_id {
                tally.record(record.choice);
            }
        }
        tally
    }

    fn is_available(&self) -> bool {
        !self.unavailable.load(Ordering::SeqCst)
    }

    fn take_injected_fault(&self) -> bool {
        self.failing_inserts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl PersistedVoteLookup for InMemoryVoteStore {
    async fn exists_vote(
        &self,
        session_id: SessionId,
        voter_key: &VoterKey,
    ) -> Result<bool, VoteLookupError> {
        if !self.is_available() {
            return Err(VoteLookupError::Unavailable {
                reason: "vote store offline".into(),
            });
        }
        Ok(self.contains(session_id, voter_key))
    }
}

#[async_trait]
impl VoteRepository for InMemoryVoteStore {
    async fn insert_votes_ignoring_duplicates(
        &self,
        records: &[VoteRecord],
    ) -> Result<usize, PersistenceError> {
        if !self.is_available() {
            return Err(PersistenceError::Unavailable {
                reason: "vote store offline".into(),
            });
        }
        if self.take_injected_fault() {
            return Err(PersistenceError::Unavailable {
                reason: "injected insert fault".into(),
            });
        }

        let mut stored = self.records.lock();
        let mut inserted = 0;
        for record in records {
            let key = (record.session_id, record.voter_key.clone());
            if let std::collections::btree_map::Entry::Vacant(slot) = stored.entry(key) {
                slot.insert(record.clone());
                inserted += 1;
            }
        }
        debug!(batch = records.len(), inserted, "Votes inserted");
        Ok(inserted)
    }
}
