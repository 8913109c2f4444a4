//! Retry routing.
//!
//! Routing is a pure function of the envelope's retry count, so any
//! dispatcher instance can route any failed message after a crash.

use crate::domain::state::DeliveryState;
use shared_bus::{Destination, VoteEnvelope};

/// Retries before a message is dead-lettered.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Upper bound on the stored error detail.
pub const MAX_ERROR_DETAIL_LEN: usize = 512;

/// What went wrong while processing a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureReport {
    /// Stable machine-readable category, e.g. `storage_unavailable`.
    pub kind: String,
    /// Human-readable detail.
    pub detail: String,
}

impl FailureReport {
    pub fn new(kind: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            detail: detail.into(),
        }
    }
}

/// Where a failed message goes next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// Republish to the retry stage as attempt `attempt` (1-based).
    Retry { attempt: u32 },
    /// Retries exhausted.
    DeadLetter,
}

impl RouteDecision {
    pub fn destination(self) -> Destination {
        match self {
            Self::Retry { .. } => Destination::Retry,
            Self::DeadLetter => Destination::DeadLetter,
        }
    }

    pub fn resulting_state(self) -> DeliveryState {
        match self {
            Self::Retry { .. } => DeliveryState::InRetry,
            Self::DeadLetter => DeliveryState::DeadLettered,
        }
    }
}

/// Retry while `retry_count < max_retries`, otherwise dead-letter.
pub fn decide(retry_count: u32, max_retries: u32) -> RouteDecision {
    if retry_count < max_retries {
        RouteDecision::Retry {
            attempt: retry_count + 1,
        }
    } else {
        RouteDecision::DeadLetter
    }
}

/// Stamp the failure onto the envelope and bump the retry count when the
/// decision is a retry.
pub fn annotate(
    mut envelope: VoteEnvelope,
    decision: RouteDecision,
    failure: &FailureReport,
) -> VoteEnvelope {
    if let RouteDecision::Retry { attempt } = decision {
        envelope.headers.retry_count = attempt;
    }
    envelope.headers.last_error_kind = Some(failure.kind.clone());
    envelope.headers.last_error_detail = Some(truncate(&failure.detail, MAX_ERROR_DETAIL_LEN));
    envelope
}

fn truncate(text: &str, max: usize) -> String {
    if text.len() <= max {
        return text.to_string();
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text[..end].to_string()
}
