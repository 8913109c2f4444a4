//! # RocksDB Storage Adapter
//!
//! Durable session and vote store.
//!
//! ## Column Families
//!
//! - `sessions` - `VotingSession` by big-endian session id
//! - `votes` - `VoteRecord` by big-endian session id followed by the voter key
//!
//! The vote key is the uniqueness key, so a batch insert skips any record
//! whose key is already present. Batches are written with one `WriteBatch`
//! under the store's write lock, making them atomic and serialised.

use async_trait::async_trait;
use parking_lot::RwLock;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, Direction, IteratorMode, Options, WriteBatch, DB};
use shared_types::{SessionId, VoteRecord, VoteTally, VoterKey, VotingSession};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;
use vp_01_session_cache::{SessionStore, SessionStoreError};
use vp_02_vote_guard::{PersistedVoteLookup, VoteLookupError};
use vp_04_vote_ingestion::{PersistenceError, VoteRepository};

pub const CF_SESSIONS: &str = "sessions";
pub const CF_VOTES: &str = "votes";

/// All column families used by the store
pub const COLUMN_FAMILIES: &[&str] = &[CF_SESSIONS, CF_VOTES];

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to open RocksDB: {0}")]
    Open(String),

    #[error("Missing column family {0}")]
    MissingColumnFamily(&'static str),

    #[error("RocksDB operation failed: {0}")]
    Io(String),

    #[error("Stored value is corrupt: {0}")]
    Corrupt(String),
}

/// RocksDB configuration
#[derive(Debug, Clone)]
pub struct RocksDbConfig {
    /// Path to the database directory
    pub path: PathBuf,
    /// Block cache size in bytes (default: 64MB)
    pub block_cache_size: usize,
    /// Write buffer size in bytes (default: 16MB)
    pub write_buffer_size: usize,
    /// Enable fsync after each write (default: true for durability)
    pub sync_writes: bool,
}

impl RocksDbConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            block_cache_size: 64 * 1024 * 1024,
            write_buffer_size: 16 * 1024 * 1024,
            sync_writes: true,
        }
    }

    /// Create config for testing (smaller buffers, no sync)
    pub fn for_testing(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            block_cache_size: 8 * 1024 * 1024,
            write_buffer_size: 4 * 1024 * 1024,
            sync_writes: false,
        }
    }
}

/// RocksDB-backed session and vote store
pub struct RocksDbVoteStore {
    db: Arc<RwLock<DB>>,
    config: RocksDbConfig,
}

fn session_key(session_id: SessionId) -> [u8; 8] {
    session_id.to_be_bytes()
}

fn vote_key(session_id: SessionId, voter_key: &VoterKey) -> Vec<u8> {
    let mut key = Vec::with_capacity(8 + voter_key.as_str().len());
    key.extend_from_slice(&session_id.to_be_bytes());
    key.extend_from_slice(voter_key.as_str().as_bytes());
    key
}

fn column<'a>(db: &'a DB, name: &'static str) -> Result<&'a ColumnFamily, StorageError> {
    db.cf_handle(name)
        .ok_or(StorageError::MissingColumnFamily(name))
}

fn io(e: rocksdb::Error) -> StorageError {
    StorageError::Io(e.to_string())
}

impl RocksDbVoteStore {
    /// Open or create the database
    pub fn open(config: RocksDbConfig) -> Result<Self, StorageError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);
        opts.set_write_buffer_size(config.write_buffer_size);
        opts.set_compression_type(rocksdb::DBCompressionType::Snappy);

        let mut block_opts = rocksdb::BlockBasedOptions::default();
        block_opts.set_bloom_filter(10.0, false);
        block_opts.set_block_cache(&rocksdb::Cache::new_lru_cache(config.block_cache_size));
        opts.set_block_based_table_factory(&block_opts);

        let cf_descriptors: Vec<ColumnFamilyDescriptor> = COLUMN_FAMILIES
            .iter()
            .map(|name| {
                let mut cf_opts = Options::default();
                cf_opts.set_compression_type(rocksdb::DBCompressionType::Snappy);
                ColumnFamilyDescriptor::new(*name, cf_opts)
            })
            .collect();

        let db = DB::open_cf_descriptors(&opts, &config.path, cf_descriptors)
            .map_err(|e| StorageError::Open(e.to_string()))?;

        Ok(Self {
            db: Arc::new(RwLock::new(db)),
            config,
        })
    }

    /// Open with default tuning at `path`
    pub fn open_default(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        Self::open(RocksDbConfig::new(path.as_ref()))
    }

    fn write_options(&self) -> rocksdb::WriteOptions {
        let mut write_opts = rocksdb::WriteOptions::default();
        write_opts.set_sync(self.config.sync_writes);
        write_opts
    }

    /// Insert or replace a session.
    pub fn put_session(&self, session: &VotingSession) -> Result<(), StorageError> {
        let value =
            serde_json::to_vec(session).map_err(|e| StorageError::Corrupt(e.to_string()))?;
        let db = self.db.write();
        let cf = column(&db, CF_SESSIONS)?;
        db.put_cf_opt(cf, session_key(session.id), value, &self.write_options())
            .map_err(io)
    }

    pub fn get_session(&self, session_id: SessionId) -> Result<Option<VotingSession>, StorageError> {
        let db = self.db.read();
        let cf = column(&db, CF_SESSIONS)?;
        match db.get_cf(cf, session_key(session_id)).map_err(io)? {
            Some(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| StorageError::Corrupt(e.to_string())),
            None => Ok(None),
        }
    }

    pub fn has_vote(&self, session_id: SessionId, voter_key: &VoterKey) -> Result<bool, StorageError> {
        let db = self.db.read();
        let cf = column(&db, CF_VOTES)?;
        db.get_pinned_cf(cf, vote_key(session_id, voter_key))
            .map(|v| v.is_some())
            .map_err(io)
    }

    /// Insert `records`, skipping keys already stored or repeated in the batch.
    pub fn insert_ignoring_duplicates(&self, records: &[VoteRecord]) -> Result<usize, StorageError> {
        let db = self.db.write();
        let cf = column(&db, CF_VOTES)?;
        let mut batch = WriteBatch::default();
        let mut seen = HashSet::new();

        for record in records {
            let key = vote_key(record.session_id, &record.voter_key);
            if !seen.insert(key.clone()) {
                continue;
            }
            if db.get_pinned_cf(cf, &key).map_err(io)?.is_some() {
                continue;
            }
            let value =
                serde_json::to_vec(record).map_err(|e| StorageError::Corrupt(e.to_string()))?;
            batch.put_cf(cf, &key, value);
        }

        let inserted = batch.len();
        db.write_opt(batch, &self.write_options()).map_err(io)?;
        debug!(batch = records.len(), inserted, "Votes written to RocksDB");
        Ok(inserted)
    }

    /// Yes / no / total counts of a session.
    pub fn tally(&self, session_id: SessionId) -> Result<VoteTally, StorageError> {
        let db = self.db.read();
        let cf = column(&db, CF_VOTES)?;
        let prefix = session_id.to_be_bytes();
        let mut tally = VoteTally::default();

        for item in db.iterator_cf(cf, IteratorMode::From(&prefix, Direction::Forward)) {
            let (key, value) = item.map_err(io)?;
            if !key.starts_with(&prefix) {
                break;
            }
            let record: VoteRecord =
                serde_json::from_slice(&value).map_err(|e| StorageError::Corrupt(e.to_string()))?;
            tally.record(record.choice);
        }
        Ok(tally)
    }
}

#[async_trait]
impl SessionStore for RocksDbVoteStore {
    async fn find_session(
        &self,
        session_id: SessionId,
    ) -> Result<Option<VotingSession>, SessionStoreError> {
        self.get_session(session_id)
            .map_err(|e| SessionStoreError::Unavailable {
                reason: e.to_string(),
            })
    }
}

#[async_trait]
impl PersistedVoteLookup for RocksDbVoteStore {
    async fn exists_vote(
        &self,
        session_id: SessionId,
        voter_key: &VoterKey,
    ) -> Result<bool, VoteLookupError> {
        self.has_vote(session_id, voter_key)
            .map_err(|e| VoteLookupError::Unavailable {
                reason: e.to_string(),
            })
    }
}

#[async_trait]
impl VoteRepository for RocksDbVoteStore {
    async fn insert_votes_ignoring_duplicates(
        &self,
        records: &[VoteRecord],
    ) -> Result<usize, PersistenceError> {
        self.insert_ignoring_duplicates(records).map_err(|e| match e {
            StorageError::Corrupt(reason) => PersistenceError::Rejected { reason },
            other => PersistenceError::Unavailable {
                reason: other.to_string(),
            },
        })
    }
}
