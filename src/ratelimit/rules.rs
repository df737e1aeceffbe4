//! Rate limit policies and per-route matching.
//!
//! Each protected route carries its own window and ceiling. Routes are
//! matched by path prefix, the longest prefix winning, with a default policy
//! for everything else.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::error::{NanjilError, Result};

/// Message returned on rejection when a policy does not set one.
pub const DEFAULT_MESSAGE: &str = "Too many requests";

/// Window length and request ceiling for one protected route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitPolicy {
    /// Window length in milliseconds
    pub window_ms: u64,
    /// Requests allowed per window
    pub max_requests: u64,
    /// Message carried by rejections
    #[serde(default = "default_message")]
    pub message: String,
}

fn default_message() -> String {
    DEFAULT_MESSAGE.to_string()
}

impl RateLimitPolicy {
    /// Create a validated policy with the default rejection message.
    pub fn new(window_ms: u64, max_requests: u64) -> Result<Self> {
        let policy = Self {
            window_ms,
            max_requests,
            message: default_message(),
        };
        policy.validate()?;
        Ok(policy)
    }

    /// Replace the rejection message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Reject zero-length windows and zero ceilings.
    pub fn validate(&self) -> Result<()> {
        if self.window_ms == 0 {
            return Err(NanjilError::Config(
                "rate limit window_ms must be greater than zero".to_string(),
            ));
        }
        if self.max_requests == 0 {
            return Err(NanjilError::Config(
                "rate limit max_requests must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            window_ms: 60_000,
            max_requests: 100,
            message: default_message(),
        }
    }
}

/// A policy bound to every path starting with `path_prefix`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRule {
    pub path_prefix: String,
    #[serde(flatten)]
    pub policy: RateLimitPolicy,
}

/// The full set of route policies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutePolicies {
    /// Applied when no route rule matches
    #[serde(default)]
    pub default: RateLimitPolicy,
    /// Route-specific rules
    #[serde(default)]
    pub routes: Vec<RouteRule>,
}

impl RoutePolicies {
    /// Policies with only a default.
    pub fn new(default: RateLimitPolicy) -> Self {
        Self {
            default,
            routes: Vec::new(),
        }
    }

    /// Add a route rule.
    pub fn with_route(mut self, path_prefix: impl Into<String>, policy: RateLimitPolicy) -> Self {
        self.routes.push(RouteRule {
            path_prefix: path_prefix.into(),
            policy,
        });
        self
    }

    /// Load policies from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading route rate limit policies");

        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Load policies from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let policies: RoutePolicies = serde_yaml::from_str(yaml).map_err(|e| {
            NanjilError::Config(format!("Failed to parse rate limit policies: {}", e))
        })?;
        policies.validate()?;
        Ok(policies)
    }

    /// Validate the default and every route policy.
    pub fn validate(&self) -> Result<()> {
        self.default.validate()?;
        for rule in &self.routes {
            rule.policy.validate().map_err(|e| {
                NanjilError::Config(format!("route {}: {}", rule.path_prefix, e))
            })?;
        }
        Ok(())
    }

    /// Find the policy for a request path.
    pub fn policy_for(&self, path: &str) -> &RateLimitPolicy {
        self.routes
            .iter()
            .filter(|rule| path.starts_with(&rule.path_prefix))
            .max_by_key(|rule| rule.path_prefix.len())
            .map(|rule| &rule.policy)
            .unwrap_or(&self.default)
    }
}
