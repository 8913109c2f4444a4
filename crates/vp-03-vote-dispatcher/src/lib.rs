//! # vp-03-vote-dispatcher
//!
//! Vote Dispatcher: moves accepted votes into the broker and decides where
//! failed deliveries go next.
//!
//! ## Routing
//!
//! | retryCount on failure | Action | Destination |
//! |-----------------------|--------|-------------|
//! | `< maxRetries` | increment, stamp error | `votes.create.retry` |
//! | `>= maxRetries` | stamp error | `votes.create.dlq` |
//!
//! The retry stage dead-letters back into `votes.create` after its fixed
//! delay, so redelivery is broker-driven.
//!
//! ## Failure Surfacing
//!
//! - `publish_new` failures are returned to the caller, who releases the
//!   voter's reservation.
//! - A retry publish that fails is escalated to the dead-letter stage.
//! - A message that fits nowhere is logged at error level with its full
//!   payload and reported as `DispatchError::Unroutable`.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use domain::{
    annotate, decide, DeliveryState, FailureReport, RouteDecision, DEFAULT_MAX_RETRIES,
};
pub use error::DispatchError;
pub use ports::VoteDispatchApi;
pub use service::{DispatcherConfig, VoteDispatcher};
