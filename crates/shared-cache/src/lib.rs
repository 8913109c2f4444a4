//! # Shared Cache - Distributed Cache and Lock Store
//!
//! The single port through which the pipeline talks to its shared,
//! TTL-aware key/value store.
//!
//! ## Consumers
//!
//! | Subsystem | Operations | Key shape |
//! |-----------|------------|-----------|
//! | Session State Cache (vp-01) | `get`, `set_with_ttl` | `session:{id}` |
//! | Duplicate Vote Guard (vp-02) | `set_if_absent`, `delete` | `vote:{session}:{voter}` |
//!
//! ## Adapters
//!
//! - `InMemoryCache`: single-process store with lazy expiry and periodic
//!   garbage collection. Supports fault injection for tests.
//! - `RedisCache` (feature `redis`): `SET NX PX` backed reservations for
//!   multi-process deployments.
//!
//! The store's own atomic primitive (`set_if_absent`) is the only
//! synchronization shared by request handlers and consumer workers.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod memory;
pub mod port;
#[cfg(feature = "redis")]
pub mod redis_cache;

pub use memory::InMemoryCache;
pub use port::{CacheError, KeyValueCache};
#[cfg(feature = "redis")]
pub use redis_cache::RedisCache;
