//! # Shared Bus - Vote Broker Topology
//!
//! Durable delivery path between the vote dispatcher and the ingestion
//! consumer.
//!
//! ## Topology
//!
//! ```text
//!                       votes.exchange
//!   publish ──────┬──────────────┬──────────────────┐
//!                 │ votes.create │ votes.create.retry│ votes.create.dlq
//!                 ▼              ▼                   ▼
//!          ┌────────────┐  ┌──────────────────┐  ┌────────────────┐
//!          │ votes.queue│◄─│ votes.queue.retry│  │ votes.queue.dlq│
//!          └────────────┘  │ (fixed delay)    │  │ (terminal)     │
//!                 │        └──────────────────┘  └────────────────┘
//!                 ▼
//!        batch consumers (manual ack)
//! ```
//!
//! The retry holding area dead-letters back to `votes.create` once its
//! delay elapses, so redelivery needs no polling by the dispatcher.
//!
//! ## Delivery semantics
//!
//! - At-least-once: unacknowledged deliveries return to the queue when their
//!   channel closes.
//! - Unordered across retries.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

use std::time::Duration;

pub mod envelope;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use envelope::{DeliveryHeaders, EnvelopeError, VoteEnvelope};
pub use publisher::{BrokerError, Destination, InMemoryVoteBroker, VotePublisher};
pub use subscriber::{ConsumerChannel, Delivery, InMemoryChannel, VoteSource};

/// Exchange all vote destinations are bound to.
pub const EXCHANGE: &str = "votes.exchange";

pub const MAIN_QUEUE: &str = "votes.queue";
pub const RETRY_QUEUE: &str = "votes.queue.retry";
pub const DEAD_LETTER_QUEUE: &str = "votes.queue.dlq";

pub const MAIN_ROUTING_KEY: &str = "votes.create";
pub const RETRY_ROUTING_KEY: &str = "votes.create.retry";
pub const DEAD_LETTER_ROUTING_KEY: &str = "votes.create.dlq";

/// Time a message spends in the retry holding area.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(60);
