//! Snapshot TTL policy.
//!
//! `ttl = max(expiresAt - now + grace, floor)`

use shared_types::Timestamp;
use std::time::Duration;

/// Absorbs clock skew between the cache and the session store.
pub const DEFAULT_GRACE_WINDOW: Duration = Duration::from_secs(60);

/// Lower bound for sessions already past expiry.
pub const DEFAULT_FLOOR_TTL: Duration = Duration::from_secs(60);

/// How long a snapshot may live in the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotTtlPolicy {
    pub grace_window: Duration,
    pub floor_ttl: Duration,
}

impl Default for SnapshotTtlPolicy {
    fn default() -> Self {
        Self {
            grace_window: DEFAULT_GRACE_WINDOW,
            floor_ttl: DEFAULT_FLOOR_TTL,
        }
    }
}

impl SnapshotTtlPolicy {
    /// TTL for a snapshot of a session expiring at `expires_at`.
    ///
    /// Always positive, even with a zero floor.
    pub fn ttl_for(&self, expires_at: Timestamp, now: Timestamp) -> Duration {
        let remaining = i128::from(expires_at) - i128::from(now)
            + self.grace_window.as_millis() as i128;
        let floor = (self.floor_ttl.as_millis() as i128).max(1);
        let millis = remaining.max(floor);
        Duration::from_millis(u64::try_from(millis).unwrap_or(u64::MAX))
    }
}
