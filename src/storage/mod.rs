//! Storage Module
//!
//! The gateway talks to object storage only through [`StorageClient`]. The
//! Azure implementation forwards each call to the blob service; the memory
//! implementation keeps containers in-process for local runs and tests.

pub mod azure;
pub mod memory;
mod name;

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::Serialize;

use crate::config::{StorageBackend, StorageConfig};
use crate::error::{Error, Result};

pub use azure::AzureBlobClient;
pub use memory::InMemoryStorage;
pub use name::ContainerName;

/// Account metadata captured when the client is constructed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountInfo {
    /// Storage account name
    pub name: String,
    /// Blob service endpoint URL
    pub url: String,
    /// Whether the endpoint uses HTTPS
    pub is_https: bool,
}

/// One entry of a container enumeration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerItem {
    pub name: String,
}

/// Container-level operations against an object storage account
#[async_trait]
pub trait StorageClient: Send + Sync {
    /// Account the client is connected to
    fn account(&self) -> &AccountInfo;

    /// Enumerate containers.
    ///
    /// Every call starts a fresh enumeration; pages are fetched as the
    /// stream is polled and a failed page is yielded as an `Err` item.
    fn list_containers(&self) -> BoxStream<'_, Result<ContainerItem>>;

    /// Create a container; fails if it already exists
    async fn create_container(&self, name: &ContainerName) -> Result<()>;

    /// Delete a container; fails if it does not exist
    async fn delete_container(&self, name: &str) -> Result<()>;
}

/// Construct the storage client selected by `config`
pub fn connect(config: &StorageConfig) -> Result<Arc<dyn StorageClient>> {
    match config.backend {
        StorageBackend::Azure => {
            let conn = config
                .connection_string
                .as_deref()
                .filter(|c| !c.is_empty())
                .ok_or_else(|| Error::Config("storage connection string is not set".into()))?;
            Ok(Arc::new(AzureBlobClient::from_connection_string(conn)?))
        }
        StorageBackend::Memory => Ok(Arc::new(InMemoryStorage::new())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_memory() {
        let config = StorageConfig {
            backend: StorageBackend::Memory,
            connection_string: None,
        };
        let client = connect(&config).unwrap();
        assert_eq!(client.account().name, memory::MEMORY_ACCOUNT);
    }

    #[test]
    fn test_connect_azure_without_connection_string() {
        let config = StorageConfig::default();
        assert!(matches!(connect(&config), Err(Error::Config(_))));
    }
}
