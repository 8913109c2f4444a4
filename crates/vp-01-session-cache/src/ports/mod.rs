//! # Ports Layer
//!
//! - **Inbound**: `SessionStateApi`, consumed by the submission entry point
//! - **Outbound**: `SessionStore`, implemented by the authoritative store adapter

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
