//! Nanjil - request rate limiting and technician dispatch estimates
//!
//! This crate holds the two pieces of logic behind the Nanjil MEP Services
//! booking API: a fixed-window rate limiter keyed by client and path, and a
//! great-circle distance and arrival-time estimator used when dispatching a
//! technician. Both are exposed over gRPC by the `nanjil` binary.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod grpc;
pub mod ratelimit;
