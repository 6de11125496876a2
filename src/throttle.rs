//! Best-effort per-client submission throttle.
//!
//! Holds one timestamp per client key in process memory. The process is
//! expected to be ephemeral, so nothing persists across restarts; the goal
//! is only to stop a single client from hammering the issue tracker.
//!
//! The table is bounded: once it reaches capacity, expired entries are
//! pruned, and if every entry is still live the oldest one is evicted.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::errors::ApiError;

/// Per-client throttle keyed by an opaque client identifier (usually an IP).
pub struct Throttle {
    entries: Mutex<HashMap<String, Instant>>,
    min_interval: Duration,
    max_entries: usize,
}

impl Throttle {
    pub fn new(min_interval: Duration, max_entries: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            min_interval,
            max_entries: max_entries.max(1),
        }
    }

    /// Record an accepted submission for `key`, or reject it if one was
    /// accepted less than `min_interval` ago.
    ///
    /// Rejections do not refresh the timestamp, so a throttled client regains
    /// access `min_interval` after its last *accepted* submission rather than
    /// being pushed back by every retry.
    pub fn check(&self, key: &str) -> Result<(), ApiError> {
        let now = Instant::now();
        let mut entries = self.entries.lock().map_err(|_| ApiError::LockPoisoned)?;

        if let Some(last) = entries.get(key) {
            if now.duration_since(*last) < self.min_interval {
                return Err(ApiError::RateLimited);
            }
        }

        if entries.len() >= self.max_entries && !entries.contains_key(key) {
            Self::evict(&mut entries, now, self.min_interval);
        }

        entries.insert(key.to_string(), now);
        Ok(())
    }

    /// Drop expired entries; if none are expired, drop the oldest.
    fn evict(entries: &mut HashMap<String, Instant>, now: Instant, min_interval: Duration) {
        let before = entries.len();
        entries.retain(|_, last| now.duration_since(*last) < min_interval);
        if entries.len() == before {
            if let Some(oldest) = entries
                .iter()
                .min_by_key(|(_, last)| **last)
                .map(|(key, _)| key.clone())
            {
                entries.remove(&oldest);
            }
        }
    }

    /// Number of clients currently tracked.
    ///
    /// A poisoned lock reads as 0 here; this is an observation helper only,
    /// and `check` is the path that surfaces `LockPoisoned` to callers.
    pub fn tracked_clients(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }
}
