//! Vote Dispatcher service

use crate::domain::{annotate, decide, DeliveryState, FailureReport, RouteDecision};
use crate::error::DispatchError;
use crate::ports::inbound::VoteDispatchApi;
use crate::ports::outbound::{BrokerError, Destination, VoteEnvelope, VotePublisher};
use async_trait::async_trait;
use shared_types::VoteMessage;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use vote_telemetry::{metric_inc, MESSAGES_PUBLISHED, ROUTING_FAILURES};

/// Dispatcher configuration
#[derive(Clone, Debug)]
pub struct DispatcherConfig {
    /// Failures tolerated before dead-lettering
    pub max_retries: u32,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            max_retries: crate::domain::DEFAULT_MAX_RETRIES,
        }
    }
}

/// Publishes accepted votes and routes failed ones.
///
/// Holds no per-message state: everything routing needs is in the envelope.
pub struct VoteDispatcher<P>
where
    P: VotePublisher,
{
    publisher: Arc<P>,
    config: DispatcherConfig,
}

impl<P> VoteDispatcher<P>
where
    P: VotePublisher,
{
    pub fn new(publisher: Arc<P>, config: DispatcherConfig) -> Self {
        Self { publisher, config }
    }

    async fn publish(
        &self,
        destination: Destination,
        envelope: &VoteEnvelope,
    ) -> Result<(), BrokerError> {
        self.publisher.publish(destination, envelope).await?;
        metric_inc!(MESSAGES_PUBLISHED, &[destination.routing_key()]);
        Ok(())
    }

    /// Last resort when the retry stage rejected the message.
    async fn escalate_to_dead_letter(
        &self,
        mut envelope: VoteEnvelope,
        retry_error: BrokerError,
    ) -> Result<DeliveryState, DispatchError> {
        warn!(
            message_id = %envelope.message_id,
            error = %retry_error,
            "Retry publish failed, escalating to dead-letter"
        );
        // The retry attempt never happened.
        envelope.headers.retry_count = envelope.headers.retry_count.saturating_sub(1);

        match self.publish(Destination::DeadLetter, &envelope).await {
            Ok(()) => Ok(DeliveryState::DeadLettered),
            Err(e) => Err(self.unroutable(&envelope, e)),
        }
    }

    fn unroutable(&self, envelope: &VoteEnvelope, source: BrokerError) -> DispatchError {
        metric_inc!(ROUTING_FAILURES);
        error!(
            message_id = %envelope.message_id,
            session_id = envelope.payload.session_id,
            voter_key = %envelope.payload.voter_key,
            choice = envelope.payload.choice.code(),
            retry_count = envelope.retry_count(),
            last_error_kind = envelope.headers.last_error_kind.as_deref().unwrap_or(""),
            error = %source,
            "Failed vote message could not be routed"
        );
        DispatchError::Unroutable {
            message_id: envelope.message_id,
            retry_count: envelope.retry_count(),
            source,
        }
    }
}

#[async_trait]
impl<P> VoteDispatchApi for VoteDispatcher<P>
where
    P: VotePublisher,
{
    async fn publish_new(&self, message: VoteMessage) -> Result<VoteEnvelope, DispatchError> {
        let envelope = VoteEnvelope::new(message);

        self.publish(Destination::Main, &envelope)
            .await
            .map_err(|source| DispatchError::Publish {
                destination: Destination::Main,
                source,
            })?;

        debug!(
            message_id = %envelope.message_id,
            session_id = envelope.payload.session_id,
            state = %DeliveryState::New,
            "Vote dispatched"
        );
        Ok(envelope)
    }

    async fn route_failure(
        &self,
        envelope: VoteEnvelope,
        failure: &FailureReport,
    ) -> Result<DeliveryState, DispatchError> {
        let decision = decide(envelope.retry_count(), self.config.max_retries);
        let routed = annotate(envelope, decision, failure);

        match self.publish(decision.destination(), &routed).await {
            Ok(()) => {
                let state = decision.resulting_state();
                match decision {
                    RouteDecision::Retry { attempt } => info!(
                        message_id = %routed.message_id,
                        retry_count = attempt,
                        error_kind = %failure.kind,
                        "Vote message scheduled for retry"
                    ),
                    RouteDecision::DeadLetter => warn!(
                        message_id = %routed.message_id,
                        session_id = routed.payload.session_id,
                        voter_key = %routed.payload.voter_key,
                        retry_count = routed.retry_count(),
                        error_kind = %failure.kind,
                        "Vote message dead-lettered"
                    ),
                }
                Ok(state)
            }
            Err(e) => match decision {
                RouteDecision::Retry { .. } => self.escalate_to_dead_letter(routed, e).await,
                RouteDecision::DeadLetter => Err(self.unroutable(&routed, e)),
            },
        }
    }
}
