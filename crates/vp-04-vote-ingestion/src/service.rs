//! Vote Ingestion Consumer service

use crate::domain::{build_records, last_tag, BatchOutcome};
use crate::error::IngestionError;
use crate::ports::inbound::VoteIngestionApi;
use crate::ports::outbound::{PersistenceError, VoteRepository};
use async_trait::async_trait;
use shared_bus::{ConsumerChannel, Delivery};
use shared_types::TimeSource;
use std::sync::Arc;
use tracing::{debug, info, warn};
use vote_telemetry::{
    metric_inc, HistogramTimer, BATCHES_PROCESSED, BATCH_DURATION, DUPLICATES_SKIPPED,
    VOTES_PERSISTED,
};
use vp_03_vote_dispatcher::{DeliveryState, FailureReport, VoteDispatchApi};

/// Persists batches of vote messages with a single idempotent insert.
///
/// Every message of a batch shares one `created_at`. The batch is
/// acknowledged with one cumulative ack whether the insert succeeds or not;
/// on failure each message is then routed through the dispatcher.
pub struct VoteIngestionConsumer<R, D>
where
    R: VoteRepository,
    D: VoteDispatchApi,
{
    repository: Arc<R>,
    dispatcher: Arc<D>,
    clock: Arc<dyn TimeSource>,
}

impl<R, D> VoteIngestionConsumer<R, D>
where
    R: VoteRepository,
    D: VoteDispatchApi,
{
    pub fn new(repository: Arc<R>, dispatcher: Arc<D>, clock: Arc<dyn TimeSource>) -> Self {
        Self {
            repository,
            dispatcher,
            clock,
        }
    }

    async fn ack_batch(
        &self,
        channel: &mut dyn ConsumerChannel,
        tag: u64,
    ) -> Result<(), IngestionError> {
        channel
            .ack(tag, true)
            .await
            .map_err(|source| IngestionError::Ack { tag, source })
    }

    async fn route_batch(
        &self,
        deliveries: Vec<Delivery>,
        error: &PersistenceError,
    ) -> BatchOutcome {
        let received = deliveries.len();
        let failure = FailureReport::new(error.kind(), error.to_string());
        let (mut retried, mut dead_lettered, mut unroutable) = (0, 0, 0);

        for delivery in deliveries {
            match self.dispatcher.route_failure(delivery.envelope, &failure).await {
                Ok(DeliveryState::InRetry) => retried += 1,
                Ok(_) => dead_lettered += 1,
                // Logged with the full payload by the dispatcher.
                Err(_) => unroutable += 1,
            }
        }

        BatchOutcome::Failed {
            received,
            error_kind: failure.kind,
            retried,
            dead_lettered,
            unroutable,
        }
    }
}

#[async_trait]
impl<R, D> VoteIngestionApi for VoteIngestionConsumer<R, D>
where
    R: VoteRepository,
    D: VoteDispatchApi,
{
    async fn process_batch(
        &self,
        channel: &mut dyn ConsumerChannel,
        deliveries: Vec<Delivery>,
    ) -> Result<BatchOutcome, IngestionError> {
        let Some(tag) = last_tag(&deliveries) else {
            return Ok(BatchOutcome::Persisted {
                received: 0,
                inserted: 0,
                skipped: 0,
            });
        };
        let received = deliveries.len();
        let created_at = self.clock.now();
        let records = build_records(&deliveries, created_at);

        let insert_result = {
            let _timer = HistogramTimer::new(&BATCH_DURATION);
            self.repository
                .insert_votes_ignoring_duplicates(&records)
                .await
        };

        match insert_result {
            Ok(inserted) => {
                self.ack_batch(channel, tag).await?;
                let skipped = received.saturating_sub(inserted);

                VOTES_PERSISTED.inc_by(inserted as u64);
                DUPLICATES_SKIPPED.inc_by(skipped as u64);
                metric_inc!(BATCHES_PROCESSED, &["persisted"]);
                debug!(received, inserted, skipped, created_at, "Vote batch persisted");

                Ok(BatchOutcome::Persisted {
                    received,
                    inserted,
                    skipped,
                })
            }
            Err(e) => {
                warn!(received, error = %e, kind = e.kind(), "Vote batch insert failed");
                // Acknowledge first: from here on the dispatcher owns redelivery.
                self.ack_batch(channel, tag).await?;
                let outcome = self.route_batch(deliveries, &e).await;
                metric_inc!(BATCHES_PROCESSED, &["failed"]);

                if let BatchOutcome::Failed {
                    retried,
                    dead_lettered,
                    unroutable,
                    ..
                } = &outcome
                {
                    info!(
                        received,
                        retried, dead_lettered, unroutable, "Failed vote batch routed"
                    );
                }
                Ok(outcome)
            }
        }
    }
}
