//! # Domain Layer
//!
//! Reservation keys and TTL policy. No I/O.

pub mod reservation;

pub use reservation::*;
