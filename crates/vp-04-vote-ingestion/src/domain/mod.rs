//! # Domain Layer
//!
//! Batch assembly and pool sizing. No I/O.

pub mod batch;
pub mod scaling;

pub use batch::*;
pub use scaling::*;
