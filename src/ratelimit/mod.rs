//! Fixed-window request rate limiting keyed by client and path.

mod backend;
mod clock;
mod counter;
mod key;
mod limiter;
mod rules;
mod sweeper;

pub use backend::RateLimiterBackend;
pub use clock::{Clock, ManualClock, SystemClock};
pub use counter::RateLimitEntry;
pub use key::{client_id_from_headers, RateLimitKey, UNKNOWN_CLIENT};
pub use limiter::{
    Decision, RateLimiter, Rejection, SharedRateLimiter, RATE_LIMIT_EXCEEDED, TOO_MANY_REQUESTS,
};
pub use rules::{RateLimitPolicy, RouteRule, RoutePolicies, DEFAULT_MESSAGE};
pub use sweeper::spawn_sweeper;
