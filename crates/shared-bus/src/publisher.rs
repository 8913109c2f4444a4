//! # Vote Publisher
//!
//! Publishing side of the broker topology and the in-memory broker.

use crate::envelope::{EnvelopeError, VoteEnvelope};
use crate::subscriber::InMemoryChannel;
use crate::{
    DEAD_LETTER_QUEUE, DEAD_LETTER_ROUTING_KEY, DEFAULT_RETRY_DELAY, MAIN_QUEUE, MAIN_ROUTING_KEY,
    RETRY_QUEUE, RETRY_ROUTING_KEY,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Notify;
use tokio::time::Instant;
use tracing::{debug, error};

/// Named routing destinations of the vote topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Destination {
    /// Consumed by the ingestion workers.
    Main,
    /// Fixed-delay holding area; dead-letters back into `Main`.
    Retry,
    /// Terminal.
    DeadLetter,
}

impl Destination {
    pub const fn queue(self) -> &'static str {
        match self {
            Self::Main => MAIN_QUEUE,
            Self::Retry => RETRY_QUEUE,
            Self::DeadLetter => DEAD_LETTER_QUEUE,
        }
    }

    pub const fn routing_key(self) -> &'static str {
        match self {
            Self::Main => MAIN_ROUTING_KEY,
            Self::Retry => RETRY_ROUTING_KEY,
            Self::DeadLetter => DEAD_LETTER_ROUTING_KEY,
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.routing_key())
    }
}

/// Errors from broker operations.
#[derive(Debug, Error)]
pub enum BrokerError {
    /// The broker could not be reached.
    #[error("Broker unavailable: {reason}")]
    Unavailable { reason: String },

    /// Acknowledgment for a tag this channel never delivered (or already acked).
    #[error("Unknown delivery tag {tag}")]
    UnknownDeliveryTag { tag: u64 },

    #[error(transparent)]
    Envelope(#[from] EnvelopeError),
}

/// Publishing side of the broker.
///
/// `publish` returns once the broker has taken responsibility for the
/// message; an error means the message was not enqueued.
#[async_trait]
pub trait VotePublisher: Send + Sync {
    async fn publish(
        &self,
        destination: Destination,
        envelope: &VoteEnvelope,
    ) -> Result<(), BrokerError>;
}

#[derive(Debug)]
pub(crate) struct HeldMessage {
    pub(crate) release_at: Instant,
    pub(crate) body: Vec<u8>,
}

#[derive(Debug, Default)]
pub(crate) struct BrokerState {
    pub(crate) main: VecDeque<Vec<u8>>,
    /// Ordered by `release_at` because the delay is fixed.
    pub(crate) holding: VecDeque<HeldMessage>,
    pub(crate) dead_letters: Vec<Vec<u8>>,
}

impl BrokerState {
    /// Move every held message whose delay has elapsed back into `main`.
    pub(crate) fn promote_due(&mut self, now: Instant) -> usize {
        let mut promoted = 0;
        while self
            .holding
            .front()
            .is_some_and(|held| held.release_at <= now)
        {
            if let Some(held) = self.holding.pop_front() {
                self.main.push_back(held.body);
                promoted += 1;
            }
        }
        promoted
    }

    pub(crate) fn next_release(&self) -> Option<Instant> {
        self.holding.front().map(|held| held.release_at)
    }
}

#[derive(Debug)]
pub(crate) struct BrokerInner {
    pub(crate) state: Mutex<BrokerState>,
    pub(crate) arrivals: Notify,
    pub(crate) reachable: AtomicBool,
    pub(crate) retry_delay: Duration,
    published: [AtomicU64; 3],
}

impl BrokerInner {
    pub(crate) fn check_reachable(&self) -> Result<(), BrokerError> {
        if self.reachable.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(BrokerError::Unavailable {
                reason: "in-memory broker marked unreachable".into(),
            })
        }
    }
}

fn destination_index(destination: Destination) -> usize {
    match destination {
        Destination::Main => 0,
        Destination::Retry => 1,
        Destination::DeadLetter => 2,
    }
}

/// Single-process broker with manual acknowledgment.
///
/// - `Main` is a FIFO drained by `InMemoryChannel`s.
/// - `Retry` parks messages for `retry_delay`, after which they re-enter
///   `Main` on the next poll.
/// - `DeadLetter` only accumulates.
///
/// Bodies are stored in wire form, so every hop goes through the envelope
/// codec. Cloning shares the underlying queues.
#[derive(Debug, Clone)]
pub struct InMemoryVoteBroker {
    inner: Arc<BrokerInner>,
}

impl InMemoryVoteBroker {
    #[must_use]
    pub fn new() -> Self {
        Self::with_retry_delay(DEFAULT_RETRY_DELAY)
    }

    #[must_use]
    pub fn with_retry_delay(retry_delay: Duration) -> Self {
        Self {
            inner: Arc::new(BrokerInner {
                state: Mutex::new(BrokerState::default()),
                arrivals: Notify::new(),
                reachable: AtomicBool::new(true),
                retry_delay,
                published: Default::default(),
            }),
        }
    }

    /// Open a consumer channel on `Main`.
    #[must_use]
    pub fn channel(&self) -> InMemoryChannel {
        InMemoryChannel::new(Arc::clone(&self.inner))
    }

    /// Simulate the broker going away (`false`) or coming back (`true`).
    pub fn set_reachable(&self, reachable: bool) {
        self.inner.reachable.store(reachable, Ordering::SeqCst);
    }

    pub fn retry_delay(&self) -> Duration {
        self.inner.retry_delay
    }

    /// Messages ready for consumption, including held messages now due.
    #[must_use]
    pub fn ready_count(&self) -> usize {
        let now = Instant::now();
        let state = self.inner.state.lock();
        state.main.len() + state.holding.iter().filter(|h| h.release_at <= now).count()
    }

    /// Messages still waiting out the retry delay.
    #[must_use]
    pub fn held_count(&self) -> usize {
        let now = Instant::now();
        let state = self.inner.state.lock();
        state.holding.iter().filter(|h| h.release_at > now).count()
    }

    /// Decoded contents of the dead-letter destination.
    #[must_use]
    pub fn dead_letters(&self) -> Vec<VoteEnvelope> {
        let state = self.inner.state.lock();
        state
            .dead_letters
            .iter()
            .filter_map(|body| VoteEnvelope::from_wire(body).ok())
            .collect()
    }

    /// Total messages accepted for `destination` since creation.
    #[must_use]
    pub fn published_count(&self, destination: Destination) -> u64 {
        self.inner.published[destination_index(destination)].load(Ordering::Relaxed)
    }
}

impl Default for InMemoryVoteBroker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VotePublisher for InMemoryVoteBroker {
    async fn publish(
        &self,
        destination: Destination,
        envelope: &VoteEnvelope,
    ) -> Result<(), BrokerError> {
        if let Err(e) = self.inner.check_reachable() {
            error!(
                destination = %destination,
                message_id = %envelope.message_id,
                "Publish failed: broker unreachable"
            );
            return Err(e);
        }

        let body = envelope.to_wire()?;
        {
            let mut state = self.inner.state.lock();
            match destination {
                Destination::Main => state.main.push_back(body),
                Destination::Retry => state.holding.push_back(HeldMessage {
                    release_at: Instant::now() + self.inner.retry_delay,
                    body,
                }),
                Destination::DeadLetter => state.dead_letters.push(body),
            }
        }
        self.inner.published[destination_index(destination)].fetch_add(1, Ordering::Relaxed);

        // Waiting channels recompute their wake-up time on retry arrivals too.
        if destination != Destination::DeadLetter {
            self.inner.arrivals.notify_waiters();
        }

        debug!(
            destination = %destination,
            queue = destination.queue(),
            message_id = %envelope.message_id,
            retry_count = envelope.retry_count(),
            "Vote message published"
        );
        Ok(())
    }
}
