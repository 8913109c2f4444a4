//! Submission outcomes.

use std::fmt;

/// Verdict of the eligibility oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    Eligible,
    Ineligible,
    /// Not a well-formed voter key.
    Malformed,
}

/// Result of a vote submission. Every submission ends in exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubmissionOutcome {
    /// Reserved and published; persistence follows asynchronously.
    Accepted,
    /// The voter already has a vote in flight or persisted for the session.
    Duplicate,
    /// Rejected by the eligibility oracle, including malformed keys.
    Ineligible,
    /// Infrastructure failure with no safe fallback; nothing was kept.
    UnavailableTemporarily,
    /// Unknown, closed or expired session.
    SessionInvalid,
}

impl SubmissionOutcome {
    /// Metric label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Duplicate => "duplicate",
            Self::Ineligible => "ineligible",
            Self::UnavailableTemporarily => "unavailable",
            Self::SessionInvalid => "session_invalid",
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

impl fmt::Display for SubmissionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
