//! # vp-04-vote-ingestion
//!
//! Vote Ingestion Consumer: drains `votes.queue` in batches and persists
//! them with one idempotent insert per batch.
//!
//! ## Batch Flow
//!
//! ```text
//! receive_batch(50, 500ms)
//!        │
//!        ▼
//! insert_votes_ignoring_duplicates ──ok──► ack(last tag, multiple)
//!        │
//!       err
//!        ▼
//! ack(last tag, multiple) ──► route_failure(msg) for each message
//!                               ├─ retryCount < max ─► votes.create.retry
//!                               └─ otherwise ────────► votes.create.dlq
//! ```
//!
//! Redelivered and repeated votes are absorbed by the store's uniqueness
//! constraint on `(session_id, voter_key)`, so persistence is idempotent.
//!
//! ## Worker Pool
//!
//! | Setting | Default |
//! |---------|---------|
//! | `batch_size` | 50 |
//! | `receive_timeout` | 500 ms |
//! | `min_workers` | 2 |
//! | `max_workers` | 4 |

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod config;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;
pub mod worker_pool;

pub use config::IngestionConfig;
pub use domain::{build_records, desired_workers, last_tag, BatchOutcome};
pub use error::IngestionError;
pub use ports::{PersistenceError, VoteIngestionApi, VoteRepository};
pub use service::VoteIngestionConsumer;
pub use worker_pool::{IngestionWorkerPool, WorkerPoolHandle};
