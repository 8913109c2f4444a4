//! # Domain Layer
//!
//! Snapshot shape, acceptance rule and TTL policy. No I/O.

pub mod snapshot;
pub mod ttl;

pub use snapshot::*;
pub use ttl::*;
