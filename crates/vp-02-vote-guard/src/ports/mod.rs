//! # Ports Layer
//!
//! - **Inbound**: `VoteGuardApi`
//! - **Outbound**: `PersistedVoteLookup`, the degraded-path existence check

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
