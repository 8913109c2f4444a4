//! Outbound ports of the Vote Dispatcher.
//!
//! The dispatcher only needs to publish; the broker crate owns the port.

pub use shared_bus::{BrokerError, Destination, VoteEnvelope, VotePublisher};
