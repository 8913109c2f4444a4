//! # Vote Envelope
//!
//! The wire contract between the dispatcher and the ingestion consumer.
//!
//! ```json
//! {
//!   "messageId": "6f1c...",
//!   "sessionId": 7,
//!   "voterKey": "52998224725",
//!   "choice": 0,
//!   "retryCount": 1,
//!   "lastErrorKind": "storage_unavailable",
//!   "lastErrorDetail": "connection reset"
//! }
//! ```
//!
//! Retry bookkeeping travels inside the envelope so routing needs no
//! external state.

use serde::{Deserialize, Serialize};
use shared_types::VoteMessage;
use thiserror::Error;
use uuid::Uuid;

/// Errors from encoding or decoding an envelope.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("Envelope encoding failed: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Envelope decoding failed: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Transport metadata mutated by retry routing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryHeaders {
    #[serde(default)]
    pub retry_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error_kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error_detail: Option<String>,
}

/// A vote message in flight through the broker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteEnvelope {
    /// Stable across retries; identifies one accepted submission in logs.
    pub message_id: Uuid,
    #[serde(flatten)]
    pub payload: VoteMessage,
    #[serde(flatten)]
    pub headers: DeliveryHeaders,
}

impl VoteEnvelope {
    /// Wrap a freshly accepted vote. Retry metadata starts empty.
    pub fn new(payload: VoteMessage) -> Self {
        Self {
            message_id: Uuid::new_v4(),
            payload,
            headers: DeliveryHeaders::default(),
        }
    }

    pub fn retry_count(&self) -> u32 {
        self.headers.retry_count
    }

    pub fn to_wire(&self) -> Result<Vec<u8>, EnvelopeError> {
        serde_json::to_vec(self).map_err(EnvelopeError::Encode)
    }

    pub fn from_wire(bytes: &[u8]) -> Result<Self, EnvelopeError> {
        serde_json::from_slice(bytes).map_err(EnvelopeError::Decode)
    }
}
