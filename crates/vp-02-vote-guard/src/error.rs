//! Error types for the Duplicate Vote Guard.

use thiserror::Error;

/// Duplicate Vote Guard errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GuardError {
    /// Cache unreachable and the durable fallback failed too.
    #[error("Reservation undecidable: cache: {cache}; vote store: {store}")]
    Undecidable { cache: String, store: String },
}
