//! # Shared Types Crate
//!
//! Domain entities shared across the vote pipeline subsystems.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: every cross-subsystem type is defined here.
//! - **Stable Wire Codes**: `VoteChoice` and `SessionStatus` serialize as the
//!   integer codes used on the broker and in storage, never as names.
//! - **Normalized Identity**: a `VoterKey` only ever holds digits; the raw
//!   input is normalized once at construction.

pub mod entities;
pub mod errors;
pub mod time;

pub use entities::*;
pub use errors::*;
pub use time::{MockTimeSource, SystemTimeSource, TimeSource, Timestamp};
