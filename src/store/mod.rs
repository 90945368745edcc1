//! Storage backends for container and blob operations.

mod azure;
mod memory;

pub use azure::*;
pub use memory::*;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::StoreResult;

/// Result of creating a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerCreated {
    /// Service request identifier, when the backend reports one.
    ///
    /// Always `None` for [`AzureBlobStore`]: the SDK's container create call
    /// returns no response headers, so the id never reaches the gateway.
    pub request_id: Option<String>,
    /// URL of the new container.
    pub url: String,
}

/// A blob as returned by a container listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobEntry {
    pub name: String,
    pub url: String,
}

/// Result of uploading a blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobUploaded {
    /// URL of the uploaded blob.
    pub url: String,
    /// Service request identifier.
    pub request_id: String,
}

/// Result of deleting a blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobDeleted {
    pub request_id: String,
}

/// Trait for the remote storage operations the gateway forwards to.
///
/// Each method maps onto exactly one call against the storage service.
/// Errors carry the service's message text unmodified.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Creates a container named `container`.
    async fn create_container(&self, container: &str) -> StoreResult<ContainerCreated>;

    /// Lists every blob in `container`, flat, in service order.
    async fn list_blobs(&self, container: &str) -> StoreResult<Vec<BlobEntry>>;

    /// Uploads `data` as a block blob named `blob` in `container`.
    async fn upload_blob(
        &self,
        container: &str,
        blob: &str,
        data: Bytes,
        content_type: &str,
    ) -> StoreResult<BlobUploaded>;

    /// Deletes `blob` and all of its snapshots from `container`.
    async fn delete_blob(&self, container: &str, blob: &str) -> StoreResult<BlobDeleted>;

    /// Returns a short name for the backend, for logging.
    fn backend_name(&self) -> &'static str;
}
