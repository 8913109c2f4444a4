//! Delivery state machine.
//!
//! ```text
//!   NEW ──publish──→ main ──persisted──→ PERSISTED
//!                     │  ↑
//!             failure │  │ delay elapsed
//!     (retryCount < N)▼  │
//!                   IN_RETRY
//!                     │
//!             failure │ (retryCount ≥ N)
//!                     ▼
//!               DEAD_LETTERED
//! ```

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeliveryState {
    /// Published to main, not yet consumed.
    New,
    /// Parked in the retry holding area.
    InRetry,
    /// Terminal; needs an operator.
    DeadLettered,
    /// Terminal; the batch insert succeeded.
    Persisted,
}

impl DeliveryState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::DeadLettered | Self::Persisted)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::InRetry => "in_retry",
            Self::DeadLettered => "dead_lettered",
            Self::Persisted => "persisted",
        }
    }
}

impl fmt::Display for DeliveryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
