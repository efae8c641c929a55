//! BlobGate Error Types

use thiserror::Error;

/// Result type alias for BlobGate operations
pub type Result<T> = std::result::Result<T, Error>;

/// BlobGate error types
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    // Request validation errors
    #[error("Invalid container name: {0:?}")]
    InvalidContainerName(String),

    // Storage errors
    #[error("Container already exists: {0}")]
    ContainerExists(String),

    #[error("Container not found: {0}")]
    ContainerNotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Network errors
    #[error("Network error: {0}")]
    Network(String),

    // Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Check if this error was caused by the caller's input rather than the service
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::InvalidContainerName(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(Error::InvalidContainerName("AB".into()).is_client_error());
        assert!(!Error::ContainerExists("a-b".into()).is_client_error());
        assert!(!Error::Storage("connection reset".into()).is_client_error());
    }

    #[test]
    fn test_error_display() {
        let err = Error::ContainerNotFound("my-test-1".into());
        assert_eq!(err.to_string(), "Container not found: my-test-1");
    }
}
