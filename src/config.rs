//! Configuration management for Nanjil.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use tracing::info;

use crate::error::{NanjilError, Result};
use crate::ratelimit::RoutePolicies;

/// Prefix of environment variables that override file settings, e.g.
/// `NANJIL_SERVER__GRPC_ADDR`.
pub const ENV_PREFIX: &str = "NANJIL";

/// Main configuration for the Nanjil service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NanjilConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limiting: RateLimitingConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// gRPC server address
    #[serde(default = "default_grpc_addr")]
    pub grpc_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            grpc_addr: default_grpc_addr(),
        }
    }
}

fn default_grpc_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8081))
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitingConfig {
    /// Seconds between sweeps of expired entries; 0 disables sweeping
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,

    /// Separate YAML file holding the route policies. Replaces `policies`
    /// when set.
    #[serde(default)]
    pub routes_path: Option<String>,

    /// Route policies
    #[serde(default)]
    pub policies: RoutePolicies,
}

impl Default for RateLimitingConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: default_sweep_interval(),
            routes_path: None,
            policies: RoutePolicies::default(),
        }
    }
}

fn default_sweep_interval() -> u64 {
    60
}

impl NanjilConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Load configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: NanjilConfig =
            serde_yaml::from_str(yaml).map_err(|e| NanjilError::Config(e.to_string()))?;
        config.resolve()
    }

    /// Load configuration from an optional file, then apply `NANJIL_*`
    /// environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = ::config::Config::builder();

        if let Some(path) = path {
            info!(path = %path.display(), "Loading configuration file");
            builder = builder.add_source(
                ::config::File::from(path)
                    .format(::config::FileFormat::Yaml)
                    .required(true),
            );
        }

        let config: NanjilConfig = builder
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.resolve()
    }

    /// Pull in the external route file, if any, and validate every policy.
    fn resolve(mut self) -> Result<Self> {
        if let Some(ref routes_path) = self.rate_limiting.routes_path {
            self.rate_limiting.policies = RoutePolicies::from_file(routes_path)?;
        }
        self.rate_limiting.policies.validate()?;
        Ok(self)
    }
}
