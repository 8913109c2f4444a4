//! Outbound port of the submission service.

use crate::submission::domain::Eligibility;
use shared_types::VoterKey;

/// Per-voter eligibility check.
pub trait EligibilityOracle: Send + Sync {
    /// Judge an already normalized voter key.
    fn check(&self, voter_key: &VoterKey) -> Eligibility;
}
