//! Error types for the Nanjil dispatch service.

use thiserror::Error;

/// Main error type for Nanjil operations.
#[derive(Error, Debug)]
pub enum NanjilError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A latitude/longitude that is not finite or out of range
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    /// A travel distance that is not finite or is negative
    #[error("Invalid distance: {0}")]
    InvalidDistance(f64),

    /// gRPC server errors
    #[error("gRPC error: {0}")]
    Grpc(#[from] tonic::transport::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<::config::ConfigError> for NanjilError {
    fn from(err: ::config::ConfigError) -> Self {
        NanjilError::Config(err.to_string())
    }
}

/// Result type alias for Nanjil operations.
pub type Result<T> = std::result::Result<T, NanjilError>;
