//! # Vote Pipeline Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── harness.rs       # Wired pipeline over in-memory collaborators
//!     ├── submission.rs    # submitVote outcomes and degraded paths
//!     ├── ingestion.rs     # Batches, redelivery, retry bound
//!     └── properties.rs    # Reservation, uniqueness and TTL invariants
//! tests/benches/
//! └── pipeline_benchmarks.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p vp-tests
//!
//! # By category
//! cargo test -p vp-tests integration::submission
//! cargo test -p vp-tests integration::properties
//!
//! # Benchmarks
//! cargo bench -p vp-tests
//! ```

#![allow(dead_code)]

pub mod integration;
