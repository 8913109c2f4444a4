//! # In-Memory Cache
//!
//! Single-process `KeyValueCache` with TTL expiry.
//!
//! - Expired entries read as absent immediately (lazy expiry).
//! - Expired entries are physically removed by a periodic sweep that runs on
//!   the write path, bounding memory without a background task.
//! - Reachability and write failures can be toggled to simulate an outage.
//!
//! Deadlines use `tokio::time::Instant` so tests can drive expiry with a
//! paused clock.

use crate::port::{CacheError, KeyValueCache};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    ttl: Duration,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

#[derive(Debug)]
struct State {
    entries: HashMap<String, Entry>,
    last_gc: Instant,
}

/// In-memory TTL cache.
#[derive(Debug)]
pub struct InMemoryCache {
    state: Mutex<State>,
    gc_interval: Duration,
    reachable: AtomicBool,
    writes_failing: AtomicBool,
}

impl InMemoryCache {
    /// Default sweep interval for expired entries.
    pub const DEFAULT_GC_INTERVAL: Duration = Duration::from_secs(10);

    #[must_use]
    pub fn new() -> Self {
        Self::with_gc_interval(Self::DEFAULT_GC_INTERVAL)
    }

    #[must_use]
    pub fn with_gc_interval(gc_interval: Duration) -> Self {
        Self {
            state: Mutex::new(State {
                entries: HashMap::new(),
                last_gc: Instant::now(),
            }),
            gc_interval,
            reachable: AtomicBool::new(true),
            writes_failing: AtomicBool::new(false),
        }
    }

    /// Simulate the store going away (`false`) or coming back (`true`).
    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    /// Make writes fail while reads keep working.
    pub fn set_writes_failing(&self, failing: bool) {
        self.writes_failing.store(failing, Ordering::SeqCst);
    }

    /// TTL the live entry was written with, if any.
    #[must_use]
    pub fn ttl_of(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        let state = self.state.lock();
        state
            .entries
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.ttl)
    }

    /// Number of stored entries, including expired ones not yet swept.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.lock().entries.is_empty()
    }

    fn check_reachable(&self) -> Result<(), CacheError> {
        if self.reachable.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(CacheError::Unreachable {
                reason: "in-memory cache marked unreachable".into(),
            })
        }
    }

    fn check_writable(&self, ttl: Duration) -> Result<(), CacheError> {
        self.check_reachable()?;
        if self.writes_failing.load(Ordering::SeqCst) {
            return Err(CacheError::Command {
                reason: "in-memory cache rejecting writes".into(),
            });
        }
        if ttl.is_zero() {
            return Err(CacheError::InvalidTtl);
        }
        Ok(())
    }

    fn maybe_gc(&self, state: &mut State, now: Instant) {
        if now.saturating_duration_since(state.last_gc) >= self.gc_interval {
            state.entries.retain(|_, entry| entry.is_live(now));
            state.last_gc = now;
        }
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueCache for InMemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.check_reachable()?;
        let now = Instant::now();
        let state = self.state.lock();
        Ok(state
            .entries
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value.clone()))
    }

    async fn set_with_ttl(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        self.check_writable(ttl)?;
        let now = Instant::now();
        let mut state = self.state.lock();
        self.maybe_gc(&mut state, now);
        state.entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                ttl,
                expires_at: now + ttl,
            },
        );
        Ok(())
    }

    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, CacheError> {
        self.check_writable(ttl)?;
        let now = Instant::now();
        let mut state = self.state.lock();
        self.maybe_gc(&mut state, now);

        if state.entries.get(key).is_some_and(|entry| entry.is_live(now)) {
            return Ok(false);
        }

        state.entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                ttl,
                expires_at: now + ttl,
            },
        );
        Ok(true)
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        self.check_reachable()?;
        let now = Instant::now();
        let mut state = self.state.lock();
        Ok(state
            .entries
            .remove(key)
            .is_some_and(|entry| entry.is_live(now)))
    }
}
