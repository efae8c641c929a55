//! In-memory storage backend

use std::collections::BTreeSet;
use std::sync::RwLock;

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};

use super::{AccountInfo, ContainerItem, ContainerName, StorageClient};
use crate::error::{Error, Result};

/// Account name reported by the memory backend
pub const MEMORY_ACCOUNT: &str = "memory";

/// Container set held in process memory.
///
/// Enumeration is lexicographic, which is the order the blob service uses.
pub struct InMemoryStorage {
    account: AccountInfo,
    containers: RwLock<BTreeSet<String>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self {
            account: AccountInfo {
                name: MEMORY_ACCOUNT.to_string(),
                url: "memory://localhost/".to_string(),
                is_https: false,
            },
            containers: RwLock::new(BTreeSet::new()),
        }
    }

    /// Number of containers currently held
    pub fn len(&self) -> usize {
        self.containers.read().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn snapshot(&self) -> Result<Vec<String>> {
        let containers = self
            .containers
            .read()
            .map_err(|_| Error::Internal("container set lock poisoned".into()))?;
        Ok(containers.iter().cloned().collect())
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageClient for InMemoryStorage {
    fn account(&self) -> &AccountInfo {
        &self.account
    }

    fn list_containers(&self) -> BoxStream<'_, Result<ContainerItem>> {
        match self.snapshot() {
            Ok(names) => stream::iter(names.into_iter().map(|name| Ok(ContainerItem { name }))).boxed(),
            Err(e) => stream::iter(vec![Err::<ContainerItem, Error>(e)]).boxed(),
        }
    }

    async fn create_container(&self, name: &ContainerName) -> Result<()> {
        let mut containers = self
            .containers
            .write()
            .map_err(|_| Error::Internal("container set lock poisoned".into()))?;

        if !containers.insert(name.as_str().to_string()) {
            return Err(Error::ContainerExists(name.to_string()));
        }
        tracing::debug!("Created container {} in memory", name);
        Ok(())
    }

    async fn delete_container(&self, name: &str) -> Result<()> {
        let mut containers = self
            .containers
            .write()
            .map_err(|_| Error::Internal("container set lock poisoned".into()))?;

        if !containers.remove(name) {
            return Err(Error::ContainerNotFound(name.to_string()));
        }
        tracing::debug!("Deleted container {} from memory", name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;

    async fn names(storage: &InMemoryStorage) -> Vec<String> {
        storage
            .list_containers()
            .map_ok(|c| c.name)
            .try_collect()
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_list_delete() {
        let storage = InMemoryStorage::new();
        assert!(names(&storage).await.is_empty());

        let name = ContainerName::parse("my-test-1").unwrap();
        storage.create_container(&name).await.unwrap();
        assert_eq!(names(&storage).await, vec!["my-test-1"]);

        storage.delete_container("my-test-1").await.unwrap();
        assert!(names(&storage).await.is_empty());
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_create_fails() {
        let storage = InMemoryStorage::new();
        let name = ContainerName::parse("dup-name").unwrap();
        storage.create_container(&name).await.unwrap();

        let err = storage.create_container(&name).await.unwrap_err();
        assert!(matches!(err, Error::ContainerExists(_)));
        assert_eq!(storage.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_missing_fails() {
        let storage = InMemoryStorage::new();
        let err = storage.delete_container("never-created").await.unwrap_err();
        assert!(matches!(err, Error::ContainerNotFound(_)));
    }

    #[tokio::test]
    async fn test_enumeration_is_ordered_and_restartable() {
        let storage = InMemoryStorage::new();
        for name in ["zeta", "alpha", "mid-1"] {
            storage
                .create_container(&ContainerName::parse(name).unwrap())
                .await
                .unwrap();
        }

        let first = names(&storage).await;
        assert_eq!(first, vec!["alpha", "mid-1", "zeta"]);
        assert_eq!(names(&storage).await, first);
    }
}
