//! Batch assembly.

use shared_bus::Delivery;
use shared_types::{Timestamp, VoteRecord};

/// Result of handling one batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    /// Insert succeeded; the whole batch was acknowledged.
    Persisted {
        received: usize,
        inserted: usize,
        /// Already persisted, ignored by the uniqueness constraint.
        skipped: usize,
    },
    /// Insert failed; the batch was acknowledged and every message routed
    /// individually.
    Failed {
        received: usize,
        error_kind: String,
        retried: usize,
        dead_lettered: usize,
        /// Could not be republished anywhere; logged with full payload.
        unroutable: usize,
    },
}

impl BatchOutcome {
    pub fn received(&self) -> usize {
        match self {
            Self::Persisted { received, .. } | Self::Failed { received, .. } => *received,
        }
    }

    pub fn is_persisted(&self) -> bool {
        matches!(self, Self::Persisted { .. })
    }
}

/// Convert a batch into records sharing one `created_at`.
pub fn build_records(deliveries: &[Delivery], created_at: Timestamp) -> Vec<VoteRecord> {
    deliveries
        .iter()
        .map(|delivery| delivery.envelope.payload.clone().into_record(created_at))
        .collect()
}

/// Tag that covers the whole batch in a cumulative acknowledgment.
pub fn last_tag(deliveries: &[Delivery]) -> Option<u64> {
    deliveries.iter().map(|delivery| delivery.tag).max()
}
