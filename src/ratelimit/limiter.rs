//! Core rate limiter implementation.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};

use super::clock::{Clock, SystemClock};
use super::counter::RateLimitEntry;
use super::key::RateLimitKey;
use super::rules::RateLimitPolicy;

/// Machine-readable code carried by every rejection.
pub const RATE_LIMIT_EXCEEDED: &str = "RATE_LIMIT_EXCEEDED";
/// HTTP status a rejection maps to.
pub const TOO_MANY_REQUESTS: u16 = 429;

/// Structured rejection handed back to the HTTP layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub code: &'static str,
    pub message: String,
    pub status: u16,
    /// Instant (milliseconds) at which the full window expires
    pub reset_at_ms: u64,
    /// Milliseconds until then
    pub retry_after_ms: u64,
}

/// Outcome of a rate limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The request may proceed.
    Allow {
        /// Requests counted in the window, this one included
        count: u64,
        reset_at_ms: u64,
    },
    /// The window is full.
    Reject(Rejection),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow { .. })
    }
}

/// Fixed-window rate limiter keyed by client and path.
///
/// The store is owned by the limiter and every check runs its
/// read-modify-write under one lock, so concurrent callers see the same
/// decisions as the equivalent serial sequence. Entries are never removed by
/// a check; an expired entry is overwritten the next time its key is seen,
/// or dropped by [`RateLimiter::sweep_expired`].
pub struct RateLimiter<C: Clock = SystemClock> {
    entries: Mutex<HashMap<RateLimitKey, RateLimitEntry>>,
    clock: C,
}

impl RateLimiter<SystemClock> {
    /// Create a rate limiter on the wall clock.
    pub fn system() -> Self {
        Self::new(SystemClock)
    }
}

impl<C: Clock> RateLimiter<C> {
    /// Create a rate limiter reading time from `clock`.
    pub fn new(clock: C) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Check and count a request at the current clock time.
    pub fn check(&self, policy: &RateLimitPolicy, client_id: &str, path: &str) -> Decision {
        self.check_at(policy, client_id, path, self.clock.now_millis())
    }

    /// Check and count a request at `now`.
    pub fn check_at(
        &self,
        policy: &RateLimitPolicy,
        client_id: &str,
        path: &str,
        now: u64,
    ) -> Decision {
        let key = RateLimitKey::new(client_id, path);

        trace!(key = %key, now = now, "Checking rate limit");

        let mut entries = self.entries.lock();

        if let Some(entry) = entries.get_mut(&key) {
            if entry.is_expired(now) {
                debug!(key = %key, "Window expired, resetting counter");
                *entry = RateLimitEntry::open(now, policy.window_ms);
            } else if entry.count < policy.max_requests {
                entry.increment();
            } else {
                debug!(key = %key, count = entry.count, "Rate limit exceeded");
                return Decision::Reject(Rejection {
                    code: RATE_LIMIT_EXCEEDED,
                    message: policy.message.clone(),
                    status: TOO_MANY_REQUESTS,
                    reset_at_ms: entry.reset_at_ms,
                    retry_after_ms: entry.remaining_ms(now),
                });
            }
            return Decision::Allow {
                count: entry.count,
                reset_at_ms: entry.reset_at_ms,
            };
        }

        debug!(
            key = %key,
            limit = policy.max_requests,
            window_ms = policy.window_ms,
            "Creating new rate limit entry"
        );
        let entry = RateLimitEntry::open(now, policy.window_ms);
        entries.insert(key, entry);
        Decision::Allow {
            count: entry.count,
            reset_at_ms: entry.reset_at_ms,
        }
    }

    /// Drop every entry whose window has expired at the current clock time.
    pub fn sweep_expired(&self) -> usize {
        self.sweep_expired_at(self.clock.now_millis())
    }

    /// Drop every entry whose window has expired at `now`.
    ///
    /// Never changes a decision: an expired entry would be overwritten on its
    /// next check anyway.
    pub fn sweep_expired_at(&self, now: u64) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    /// Get the stored entry for a client and path.
    ///
    /// The entry is returned even when its window has expired.
    pub fn entry(&self, client_id: &str, path: &str) -> Option<RateLimitEntry> {
        let key = RateLimitKey::new(client_id, path);
        self.entries.lock().get(&key).copied()
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Clear all entries.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl Default for RateLimiter<SystemClock> {
    fn default() -> Self {
        Self::system()
    }
}

/// Convenience for sharing one limiter between the server and the sweeper.
pub type SharedRateLimiter<C = SystemClock> = Arc<RateLimiter<C>>;
