//! Azure Blob Storage backend
//!
//! Thin adapter over `azure_storage_blobs`. Each trait method is one SDK call;
//! container enumeration follows the service's continuation markers lazily.

use async_trait::async_trait;
use azure_storage::{CloudLocation, ConnectionString, EndpointProtocol};
use azure_storage_blobs::prelude::{BlobServiceClient, ClientBuilder};
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};

use super::{AccountInfo, ContainerItem, ContainerName, StorageClient};
use crate::error::{Error, Result};

/// Account name used by the storage emulator
const EMULATOR_ACCOUNT: &str = "devstoreaccount1";

impl From<azure_core::Error> for Error {
    fn from(e: azure_core::Error) -> Self {
        Error::Storage(e.to_string())
    }
}

/// Blob service client plus the account metadata derived from it
pub struct AzureBlobClient {
    service: BlobServiceClient,
    account: AccountInfo,
}

impl AzureBlobClient {
    /// Build a client from an Azure Storage connection string
    pub fn from_connection_string(connection_string: &str) -> Result<Self> {
        let parsed = ConnectionString::new(connection_string)?;

        let (account, builder) = if parsed.use_development_storage == Some(true) {
            (EMULATOR_ACCOUNT.to_string(), ClientBuilder::emulator())
        } else {
            let account = parsed
                .account_name
                .ok_or_else(|| Error::Config("connection string has no AccountName".into()))?
                .to_string();
            let credentials = parsed.storage_credentials()?;

            let builder = match (parsed.blob_endpoint, parsed.endpoint_suffix) {
                (Some(endpoint), _) => ClientBuilder::with_location(
                    CloudLocation::Custom {
                        account: account.clone(),
                        uri: endpoint.trim_end_matches('/').to_string(),
                    },
                    credentials,
                ),
                (None, Some(suffix)) => {
                    let scheme = match parsed.default_endpoints_protocol {
                        Some(EndpointProtocol::Http) => "http",
                        _ => "https",
                    };
                    ClientBuilder::with_location(
                        CloudLocation::Custom {
                            account: account.clone(),
                            uri: format!("{}://{}.blob.{}", scheme, account, suffix),
                        },
                        credentials,
                    )
                }
                (None, None) => ClientBuilder::new(account.clone(), credentials),
            };
            (account, builder)
        };

        let service = builder.blob_service_client();
        let url = service.url()?;

        let account = AccountInfo {
            name: account,
            is_https: url.scheme() == "https",
            url: url.to_string(),
        };

        Ok(Self { service, account })
    }
}

#[async_trait]
impl StorageClient for AzureBlobClient {
    fn account(&self) -> &AccountInfo {
        &self.account
    }

    fn list_containers(&self) -> BoxStream<'_, Result<ContainerItem>> {
        self.service
            .list_containers()
            .into_stream()
            .map_err(Error::from)
            .inspect_ok(|page| tracing::debug!("Fetched page of {} containers", page.containers.len()))
            .map_ok(|page| {
                stream::iter(
                    page.containers
                        .into_iter()
                        .map(|container| Ok(ContainerItem { name: container.name })),
                )
            })
            .try_flatten()
            .boxed()
    }

    async fn create_container(&self, name: &ContainerName) -> Result<()> {
        self.service.container_client(name.as_str()).create().await?;
        Ok(())
    }

    async fn delete_container(&self, name: &str) -> Result<()> {
        self.service.container_client(name).delete().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Well-formed base64; never used against a live service.
    const KEY: &str = "c2VjcmV0LWtleS1mb3ItdGVzdHM=";

    #[test]
    fn test_public_endpoint() {
        let conn = format!(
            "DefaultEndpointsProtocol=https;AccountName=acct;AccountKey={};EndpointSuffix=core.windows.net",
            KEY
        );
        let client = AzureBlobClient::from_connection_string(&conn).unwrap();
        let account = client.account();
        assert_eq!(account.name, "acct");
        assert!(account.is_https);
        assert!(account.url.starts_with("https://acct.blob.core.windows.net"));
    }

    #[test]
    fn test_explicit_blob_endpoint() {
        let conn = format!(
            "AccountName=local;AccountKey={};BlobEndpoint=http://127.0.0.1:10000/local",
            KEY
        );
        let client = AzureBlobClient::from_connection_string(&conn).unwrap();
        assert_eq!(client.account().name, "local");
        assert!(!client.account().is_https);
        assert!(client.account().url.starts_with("http://127.0.0.1:10000/local"));
    }

    #[test]
    fn test_development_storage() {
        let client = AzureBlobClient::from_connection_string("UseDevelopmentStorage=true").unwrap();
        assert_eq!(client.account().name, EMULATOR_ACCOUNT);
        assert!(!client.account().is_https);
    }

    #[test]
    fn test_missing_account_name() {
        let conn = format!("AccountKey={}", KEY);
        assert!(AzureBlobClient::from_connection_string(&conn).is_err());
    }
}
