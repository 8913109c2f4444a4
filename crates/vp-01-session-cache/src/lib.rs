//! # vp-01-session-cache
//!
//! Session State Cache: gates vote submissions on session state without
//! reading the session store on every request.
//!
//! ## Flow
//!
//! ```text
//! get(sessionId)
//!     │
//!     ├── cache hit ──────────────────────────────→ SessionSnapshot
//!     │
//!     └── miss / cache error ──→ SessionStore ──→ SessionSnapshot
//!                                     │
//!                                     └── best-effort write-back (TTL policy)
//! ```
//!
//! ## TTL Policy
//!
//! `ttl = max(expiresAt - now + 60s, 60s)`, never zero.
//!
//! The cache does not decide whether a session accepts votes; callers apply
//! `SessionSnapshot::is_acceptable_at` with their own clock.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use domain::{snapshot_key, SessionSnapshot, SnapshotTtlPolicy};
pub use error::{SessionCacheError, SessionCacheResult};
pub use ports::{SessionStateApi, SessionStore, SessionStoreError};
pub use service::SessionStateCache;
