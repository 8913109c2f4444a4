//! Error types for the Vote Ingestion Consumer.

use shared_bus::BrokerError;
use thiserror::Error;

/// Vote Ingestion errors
#[derive(Debug, Error)]
pub enum IngestionError {
    /// The batch could not be acknowledged; it will be redelivered once the
    /// channel is reopened.
    #[error("Acknowledgment of tag {tag} failed: {source}")]
    Ack {
        tag: u64,
        #[source]
        source: BrokerError,
    },

    #[error("Invalid ingestion configuration: {0}")]
    InvalidConfig(String),
}
