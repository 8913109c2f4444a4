//! # Error Types
//!
//! Errors raised while decoding shared entities from their wire codes.

use thiserror::Error;

/// Errors that can occur when decoding an entity from its integer code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodeError {
    /// Vote choice code is not one of the known codes.
    #[error("Unknown vote choice code: {0}")]
    UnknownChoice(u8),

    /// Session status code is not one of the known codes.
    #[error("Unknown session status code: {0}")]
    UnknownStatus(u8),
}
