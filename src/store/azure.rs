//! Azure Blob Storage backend.

use async_trait::async_trait;
use azure_storage::{CloudLocation, ConnectionString};
use azure_storage_blobs::prelude::*;
use bytes::Bytes;
use futures::TryStreamExt;
use tracing::debug;

use super::{BlobDeleted, BlobEntry, BlobStore, BlobUploaded, ContainerCreated};
use crate::error::{StoreError, StoreResult};

/// Backend that forwards every operation to Azure Blob Storage.
///
/// The service client is built once from configuration and shared by all
/// requests; per-request container and blob clients are cheap handles derived
/// from it.
#[derive(Clone)]
pub struct AzureBlobStore {
    account: String,
    client: BlobServiceClient,
}

impl std::fmt::Debug for AzureBlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureBlobStore")
            .field("account", &self.account)
            .finish()
    }
}

impl AzureBlobStore {
    /// Creates a backend from a storage connection string.
    ///
    /// `account_name`, when given, overrides the account named in the
    /// connection string. A `BlobEndpoint` entry (as used by local emulators)
    /// is honoured as a custom cloud location.
    pub fn from_connection_string(
        account_name: Option<&str>,
        connection_string: &str,
    ) -> StoreResult<Self> {
        let parsed = ConnectionString::new(connection_string)?;
        let credentials = parsed.storage_credentials()?;

        let account = account_name
            .or(parsed.account_name)
            .ok_or_else(|| StoreError::new("connection string does not name a storage account"))?
            .to_string();

        let builder = match parsed.blob_endpoint {
            Some(endpoint) => {
                debug!("Using custom blob endpoint: {}", endpoint);
                ClientBuilder::with_location(
                    CloudLocation::Custom {
                        account: account.clone(),
                        uri: endpoint.trim_end_matches('/').to_string(),
                    },
                    credentials,
                )
            }
            None => ClientBuilder::new(account.clone(), credentials),
        };

        Ok(Self {
            account,
            client: builder.blob_service_client(),
        })
    }

    /// Returns the storage account name.
    pub fn account(&self) -> &str {
        &self.account
    }
}

#[async_trait]
impl BlobStore for AzureBlobStore {
    async fn create_container(&self, container: &str) -> StoreResult<ContainerCreated> {
        let container_client = self.client.container_client(container);
        container_client.create().await?;

        // Container creation does not surface the service request id.
        Ok(ContainerCreated {
            request_id: None,
            url: container_client.url()?.to_string(),
        })
    }

    async fn list_blobs(&self, container: &str) -> StoreResult<Vec<BlobEntry>> {
        let container_client = self.client.container_client(container);
        let mut pages = container_client.list_blobs().into_stream();

        let mut entries = Vec::new();
        while let Some(page) = pages.try_next().await? {
            for blob in page.blobs.blobs() {
                let url = container_client.blob_client(blob.name.clone()).url()?;
                entries.push(BlobEntry {
                    name: blob.name.clone(),
                    url: url.to_string(),
                });
            }
        }

        Ok(entries)
    }

    async fn upload_blob(
        &self,
        container: &str,
        blob: &str,
        data: Bytes,
        content_type: &str,
    ) -> StoreResult<BlobUploaded> {
        let blob_client = self.client.container_client(container).blob_client(blob);
        let url = blob_client.url()?.to_string();

        let response = blob_client
            .put_block_blob(data)
            .content_type(content_type.to_string())
            .await?;

        Ok(BlobUploaded {
            url,
            request_id: response.request_id.to_string(),
        })
    }

    async fn delete_blob(&self, container: &str, blob: &str) -> StoreResult<BlobDeleted> {
        let blob_client = self.client.container_client(container).blob_client(blob);

        let response = blob_client
            .delete()
            .delete_snapshots_method(DeleteSnapshotsMethod::Include)
            .await?;

        Ok(BlobDeleted {
            request_id: response.request_id.to_string(),
        })
    }

    fn backend_name(&self) -> &'static str {
        "azure"
    }
}
