//! # vp-02-vote-guard
//!
//! Duplicate Vote Guard: one reservation per `(session, voter)` ahead of
//! durable persistence.
//!
//! ## Double Defense
//!
//! ```text
//!  reserve ──→ [cache SET NX] ──ok──→ first? ──→ publish
//!                   │
//!                   └──unreachable──→ [vote store exists?] ──→ !exists
//!
//!  ... later ...
//!
//!  batch insert ──→ ON CONFLICT (session, voter) DO NOTHING
//! ```
//!
//! The cache reservation is a fast path; the storage uniqueness constraint
//! is the guarantee. A reservation is released only when publishing failed,
//! never after a successful publish.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use domain::{reservation_key, ReservationTtlPolicy, DEFAULT_SAFETY_MARGIN};
pub use error::GuardError;
pub use ports::{PersistedVoteLookup, VoteGuardApi, VoteLookupError};
pub use service::DuplicateVoteGuard;
