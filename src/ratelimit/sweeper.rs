//! Periodic removal of expired rate limit entries.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::clock::Clock;
use super::limiter::RateLimiter;

/// Spawn a task that sweeps expired entries every `interval`.
///
/// The task runs until the returned handle is aborted or the runtime shuts
/// down.
pub fn spawn_sweeper<C>(limiter: Arc<RateLimiter<C>>, interval: Duration) -> JoinHandle<()>
where
    C: Clock + 'static,
{
    info!(interval_ms = interval.as_millis() as u64, "Starting rate limit sweeper");

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let removed = limiter.sweep_expired();
            if removed > 0 {
                debug!(
                    removed_entries = removed,
                    remaining_entries = limiter.len(),
                    "Rate limit sweep completed"
                );
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ratelimit::clock::ManualClock;
    use crate::ratelimit::rules::RateLimitPolicy;

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_removes_expired_entries() {
        let clock = Arc::new(ManualClock::new(0));
        let limiter = Arc::new(RateLimiter::new(Arc::clone(&clock)));
        let policy = RateLimitPolicy::new(100, 5).unwrap();

        limiter.check(&policy, "A", "/x");
        limiter.check(&policy, "B", "/x");
        assert_eq!(limiter.len(), 2);

        let handle = spawn_sweeper(Arc::clone(&limiter), Duration::from_secs(1));

        clock.advance(500);
        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert!(limiter.is_empty());
        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_keeps_live_entries() {
        let clock = Arc::new(ManualClock::new(0));
        let limiter = Arc::new(RateLimiter::new(Arc::clone(&clock)));
        let policy = RateLimitPolicy::new(60_000, 5).unwrap();

        limiter.check(&policy, "A", "/x");

        let handle = spawn_sweeper(Arc::clone(&limiter), Duration::from_secs(1));
        tokio::time::sleep(Duration::from_millis(3500)).await;

        assert_eq!(limiter.len(), 1);
        handle.abort();
    }
}
