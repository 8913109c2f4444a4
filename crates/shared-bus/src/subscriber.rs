//! # Consumer Channels
//!
//! Consuming side of the broker: batched receive with manual acknowledgment.

use crate::envelope::VoteEnvelope;
use crate::publisher::{BrokerError, BrokerInner, InMemoryVoteBroker};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, error, warn};

/// A message handed to a consumer, pending acknowledgment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// Channel-scoped, strictly increasing.
    pub tag: u64,
    pub envelope: VoteEnvelope,
}

/// A consumer's view of the main destination.
///
/// Deliveries stay unacknowledged until `ack` covers them. A channel that is
/// dropped with unacknowledged deliveries returns them to the queue.
#[async_trait]
pub trait ConsumerChannel: Send {
    /// Receive up to `max` messages, waiting at most `wait` for the batch to
    /// fill. Returns early once `max` messages are collected; may return an
    /// empty batch.
    async fn receive_batch(
        &mut self,
        max: usize,
        wait: Duration,
    ) -> Result<Vec<Delivery>, BrokerError>;

    /// Acknowledge `tag`, or every outstanding tag up to and including `tag`
    /// when `multiple` is set.
    async fn ack(&mut self, tag: u64, multiple: bool) -> Result<(), BrokerError>;
}

/// Source of consumer channels, shared by a pool of workers.
pub trait VoteSource: Send + Sync {
    type Channel: ConsumerChannel + 'static;

    fn open_channel(&self) -> Self::Channel;

    /// Messages ready for consumption. Drives pool scaling.
    fn backlog(&self) -> usize;
}

impl VoteSource for InMemoryVoteBroker {
    type Channel = InMemoryChannel;

    fn open_channel(&self) -> Self::Channel {
        self.channel()
    }

    fn backlog(&self) -> usize {
        self.ready_count()
    }
}

/// Consumer channel over an `InMemoryVoteBroker`.
#[derive(Debug)]
pub struct InMemoryChannel {
    broker: Arc<BrokerInner>,
    next_tag: u64,
    unacked: BTreeMap<u64, Vec<u8>>,
}

impl InMemoryChannel {
    pub(crate) fn new(broker: Arc<BrokerInner>) -> Self {
        Self {
            broker,
            next_tag: 1,
            unacked: BTreeMap::new(),
        }
    }

    /// Deliveries handed out but not yet acknowledged.
    #[must_use]
    pub fn unacked_count(&self) -> usize {
        self.unacked.len()
    }

    /// Pull ready messages into `batch`. Returns the next time a held
    /// message becomes due, if any.
    fn drain_ready(&mut self, max: usize, batch: &mut Vec<Delivery>) -> Option<Instant> {
        let mut state = self.broker.state.lock();
        state.promote_due(Instant::now());

        while batch.len() < max {
            let Some(body) = state.main.pop_front() else {
                break;
            };
            match VoteEnvelope::from_wire(&body) {
                Ok(envelope) => {
                    let tag = self.next_tag;
                    self.next_tag += 1;
                    self.unacked.insert(tag, body);
                    batch.push(Delivery { tag, envelope });
                }
                Err(e) => {
                    error!(error = %e, "Undecodable vote message moved to dead letters");
                    state.dead_letters.push(body);
                }
            }
        }

        state.next_release()
    }
}

#[async_trait]
impl ConsumerChannel for InMemoryChannel {
    async fn receive_batch(
        &mut self,
        max: usize,
        wait: Duration,
    ) -> Result<Vec<Delivery>, BrokerError> {
        self.broker.check_reachable()?;

        let deadline = Instant::now() + wait;
        let mut batch = Vec::with_capacity(max);
        let broker = Arc::clone(&self.broker);

        loop {
            // Register interest before draining so a publish in between is
            // not missed.
            let notified = broker.arrivals.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let next_release = self.drain_ready(max, &mut batch);
            if batch.len() >= max || Instant::now() >= deadline {
                break;
            }

            let wake_at = next_release.map_or(deadline, |release| release.min(deadline));
            tokio::select! {
                () = &mut notified => {}
                () = sleep_until(wake_at) => {}
            }
        }

        if !batch.is_empty() {
            debug!(batch_size = batch.len(), "Received vote batch");
        }
        Ok(batch)
    }

    async fn ack(&mut self, tag: u64, multiple: bool) -> Result<(), BrokerError> {
        self.broker.check_reachable()?;

        if multiple {
            if !self.unacked.contains_key(&tag) {
                return Err(BrokerError::UnknownDeliveryTag { tag });
            }
            // Keep everything above `tag`.
            self.unacked = self.unacked.split_off(&(tag + 1));
        } else if self.unacked.remove(&tag).is_none() {
            return Err(BrokerError::UnknownDeliveryTag { tag });
        }
        Ok(())
    }
}

impl Drop for InMemoryChannel {
    fn drop(&mut self) {
        if self.unacked.is_empty() {
            return;
        }

        let requeued = self.unacked.len();
        let mut state = self.broker.state.lock();
        // Front of the queue, original order.
        for (_, body) in std::mem::take(&mut self.unacked).into_iter().rev() {
            state.main.push_front(body);
        }
        drop(state);
        self.broker.arrivals.notify_waiters();

        warn!(requeued, "Channel closed with unacknowledged deliveries");
    }
}
