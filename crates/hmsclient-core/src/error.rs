//! Error types for the hmsclient core library.
//!
//! Uses hierarchical domain-specific errors following the thiserror pattern.

use thiserror::Error;

/// Result type alias for hmsclient operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for hmsclient.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Caller supplied an argument the operation cannot accept
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Metastore-related error
    #[error("Metastore error: {0}")]
    Metastore(#[from] MetastoreError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Errors reported by, or on the way to, the remote metastore.
#[derive(Error, Debug)]
pub enum MetastoreError {
    /// The named object does not exist (remote `NoSuchObjectException`)
    #[error("Object not found: {0}")]
    NotFound(String),

    /// Any other exception raised by the metastore service
    #[error("Service exception: {0}")]
    Service(String),

    /// Connection or transport level failure
    #[error("Transport failure: {0}")]
    Transport(String),
}

impl Error {
    /// Whether this error is the remote "no such object" case.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Metastore(MetastoreError::NotFound(_)))
    }
}

// Conversion implementations for external error types

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}
