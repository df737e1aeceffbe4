//! Fixed-window counter state for a single key.

/// Requests observed for one key in its current window.
///
/// `count` is at least 1 while the entry exists. The entry is void once the
/// clock passes `reset_at_ms`; it is only replaced when the same key is seen
/// again or a sweep removes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitEntry {
    /// Requests counted in this window
    pub count: u64,
    /// Instant (milliseconds) at which the window expires
    pub reset_at_ms: u64,
}

impl RateLimitEntry {
    /// Open a new window at `now` holding a single request.
    pub fn open(now: u64, window_ms: u64) -> Self {
        Self {
            count: 1,
            reset_at_ms: now.saturating_add(window_ms),
        }
    }

    /// Whether the window has passed. The boundary instant itself still
    /// belongs to the window.
    pub fn is_expired(&self, now: u64) -> bool {
        now > self.reset_at_ms
    }

    /// Count one more request.
    pub fn increment(&mut self) {
        self.count = self.count.saturating_add(1);
    }

    /// Milliseconds until the window expires.
    pub fn remaining_ms(&self, now: u64) -> u64 {
        self.reset_at_ms.saturating_sub(now)
    }
}
