//! # Domain Layer
//!
//! Delivery state machine and the pure retry-routing decision.

pub mod routing;
pub mod state;

pub use routing::*;
pub use state::*;
