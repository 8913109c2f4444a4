//! Inbound port of the Vote Ingestion Consumer.

use crate::domain::BatchOutcome;
use crate::error::IngestionError;
use async_trait::async_trait;
use shared_bus::{ConsumerChannel, Delivery};

#[async_trait]
pub trait VoteIngestionApi: Send + Sync {
    /// Persist one batch received on `channel` and acknowledge it there.
    ///
    /// On insert failure the batch is still acknowledged, then each message
    /// is handed to retry/dead-letter routing.
    async fn process_batch(
        &self,
        channel: &mut dyn ConsumerChannel,
        deliveries: Vec<Delivery>,
    ) -> Result<BatchOutcome, IngestionError>;
}
