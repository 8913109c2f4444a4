//! # Vote Submission
//!
//! The `submitVote` entry point.
//!
//! ```text
//! session gate ──► eligibility ──► reserve ──► publish ──► Accepted
//!      │                │             │           │
//!  SessionInvalid   Ineligible    Duplicate   release + UnavailableTemporarily
//! ```
//!
//! Nothing is reserved or published for a submission rejected at the first
//! two gates.

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::{Eligibility, SubmissionOutcome};
pub use ports::EligibilityOracle;
pub use service::VoteSubmissionService;
