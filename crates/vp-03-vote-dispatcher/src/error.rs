//! Error types for the Vote Dispatcher.

use shared_bus::{BrokerError, Destination};
use thiserror::Error;
use uuid::Uuid;

/// Vote Dispatcher errors
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The broker did not take the message.
    #[error("Publish to {destination} failed: {source}")]
    Publish {
        destination: Destination,
        #[source]
        source: BrokerError,
    },

    /// A failed message could be placed neither in retry nor in dead-letter.
    #[error("Message {message_id} unroutable after {retry_count} retries: {source}")]
    Unroutable {
        message_id: Uuid,
        retry_count: u32,
        #[source]
        source: BrokerError,
    },
}
