//! # Production Storage Adapters
//!
//! Durable session and vote storage on RocksDB.
//!
//! ## Usage
//!
//! Enable the `rocksdb` feature to use these adapters:
//!
//! ```toml
//! vote-node = { path = "...", features = ["rocksdb"] }
//! ```

#[cfg(feature = "rocksdb")]
pub mod rocksdb_adapter;

#[cfg(feature = "rocksdb")]
pub use rocksdb_adapter::{
    RocksDbConfig, RocksDbVoteStore, StorageError, CF_SESSIONS, CF_VOTES, COLUMN_FAMILIES,
};
