//! # Ports Layer
//!
//! - **Inbound**: `VoteIngestionApi`, driven by the worker pool
//! - **Outbound**: `VoteRepository`, the durable vote store

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
