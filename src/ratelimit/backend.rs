//! Rate limiter trait used by the gRPC service.

use async_trait::async_trait;

use super::clock::Clock;
use super::limiter::{Decision, RateLimiter};
use super::rules::RateLimitPolicy;

/// Trait for rate limiter implementations.
///
/// The gRPC service is generic over this so that tests and alternative
/// stores can stand in for the in-process [`RateLimiter`].
#[async_trait]
pub trait RateLimiterBackend: Send + Sync {
    /// Count a request from `client_id` on `path` against `policy`.
    async fn check_rate_limit(
        &self,
        policy: &RateLimitPolicy,
        client_id: &str,
        path: &str,
    ) -> Decision;
}

#[async_trait]
impl<C: Clock> RateLimiterBackend for RateLimiter<C> {
    async fn check_rate_limit(
        &self,
        policy: &RateLimitPolicy,
        client_id: &str,
        path: &str,
    ) -> Decision {
        self.check(policy, client_id, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ratelimit::clock::ManualClock;

    #[tokio::test]
    async fn test_backend_delegates_to_limiter() {
        let limiter = RateLimiter::new(ManualClock::new(0));
        let policy = RateLimitPolicy::new(1000, 1).unwrap();
        let backend: &dyn RateLimiterBackend = &limiter;

        assert!(backend.check_rate_limit(&policy, "A", "/x").await.is_allowed());
        assert!(!backend.check_rate_limit(&policy, "A", "/x").await.is_allowed());
        assert_eq!(limiter.entry("A", "/x").unwrap().count, 1);
    }
}
