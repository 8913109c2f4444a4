//! Inbound port of the Vote Dispatcher.

use crate::domain::{DeliveryState, FailureReport};
use crate::error::DispatchError;
use async_trait::async_trait;
use shared_bus::VoteEnvelope;
use shared_types::VoteMessage;

#[async_trait]
pub trait VoteDispatchApi: Send + Sync {
    /// Publish a freshly accepted vote to the main destination.
    ///
    /// An error means the vote is not in the pipeline; the caller must
    /// release its reservation.
    async fn publish_new(&self, message: VoteMessage) -> Result<VoteEnvelope, DispatchError>;

    /// Route a message whose processing failed to retry or dead-letter.
    ///
    /// Returns the state the message was moved to.
    async fn route_failure(
        &self,
        envelope: VoteEnvelope,
        failure: &FailureReport,
    ) -> Result<DeliveryState, DispatchError>;
}
