//! Cross-crate integration tests.

pub mod harness;
pub mod ingestion;
pub mod properties;
pub mod submission;
