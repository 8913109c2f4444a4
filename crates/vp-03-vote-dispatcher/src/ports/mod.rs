//! # Ports Layer
//!
//! - **Inbound**: `VoteDispatchApi`, used by the submission entry point and
//!   the ingestion consumer
//! - **Outbound**: the broker's `VotePublisher`

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
