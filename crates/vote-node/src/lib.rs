//! # Vote Node
//!
//! Runtime for the vote-submission reliability pipeline.
//!
//! ## Modular Structure
//!
//! - `container/` - Node configuration
//! - `adapters/` - Port implementations: cache backend, stores, oracle
//! - `submission/` - The `submitVote` entry point
//! - `wiring/` - `VoteNode`, the assembled pipeline
//!
//! ## Vote Lifecycle
//!
//! ```text
//! submit_vote ──► reserve ──► votes.create ──► batch consumer ──► vote store
//!                                  ▲                 │ insert failed
//!                                  │                 ▼
//!                     votes.queue.retry ◄── retryCount < 3
//!                                        └─ otherwise ──► votes.queue.dlq
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod adapters;
pub mod container;
pub mod submission;
pub mod wiring;

pub use container::{ConfigError, NodeConfig};
pub use submission::{Eligibility, EligibilityOracle, SubmissionOutcome, VoteSubmissionService};
pub use wiring::VoteNode;
