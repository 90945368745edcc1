//! In-memory storage backend for local development and tests.

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use std::collections::BTreeMap;
use url::Url;
use uuid::Uuid;

use super::{BlobDeleted, BlobEntry, BlobStore, BlobUploaded, ContainerCreated};
use crate::error::{StoreError, StoreResult};

/// Stored blob content.
#[derive(Debug, Clone)]
pub struct MemoryBlob {
    pub data: Bytes,
    pub content_type: String,
}

/// In-process implementation of [`BlobStore`].
///
/// Mirrors the observable behaviour of the remote service: duplicate
/// containers conflict, operations on missing containers or blobs fail with
/// the service's messages, and listings come back sorted by name.
pub struct MemoryBlobStore {
    base_url: Url,
    /// Blobs indexed by container, then name.
    containers: DashMap<String, BTreeMap<String, MemoryBlob>>,
}

impl MemoryBlobStore {
    /// Creates an empty store whose URLs are rooted at `base_url`.
    pub fn new(base_url: &str) -> StoreResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| StoreError::new(format!("invalid base URL {}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(StoreError::new(format!("invalid base URL {}", base_url)));
        }

        Ok(Self {
            base_url,
            containers: DashMap::new(),
        })
    }

    /// Returns a copy of a stored blob, if present.
    pub fn get_blob(&self, container: &str, blob: &str) -> Option<MemoryBlob> {
        self.containers
            .get(container)
            .and_then(|blobs| blobs.get(blob).cloned())
    }

    fn url_for(&self, segments: &[&str]) -> String {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url.to_string()
    }

    fn container_not_found() -> StoreError {
        StoreError::new("The specified container does not exist.")
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn create_container(&self, container: &str) -> StoreResult<ContainerCreated> {
        if container.is_empty() {
            return Err(StoreError::new(
                "The specified resource name contains invalid characters.",
            ));
        }

        match self.containers.entry(container.to_string()) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(StoreError::new(
                "The specified container already exists.",
            )),
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                entry.insert(BTreeMap::new());
                Ok(ContainerCreated {
                    request_id: Some(Uuid::new_v4().to_string()),
                    url: self.url_for(&[container]),
                })
            }
        }
    }

    async fn list_blobs(&self, container: &str) -> StoreResult<Vec<BlobEntry>> {
        let blobs = self
            .containers
            .get(container)
            .ok_or_else(Self::container_not_found)?;

        Ok(blobs
            .keys()
            .map(|name| BlobEntry {
                name: name.clone(),
                url: self.url_for(&[container, name.as_str()]),
            })
            .collect())
    }

    async fn upload_blob(
        &self,
        container: &str,
        blob: &str,
        data: Bytes,
        content_type: &str,
    ) -> StoreResult<BlobUploaded> {
        let mut blobs = self
            .containers
            .get_mut(container)
            .ok_or_else(Self::container_not_found)?;

        blobs.insert(
            blob.to_string(),
            MemoryBlob {
                data,
                content_type: content_type.to_string(),
            },
        );

        Ok(BlobUploaded {
            url: self.url_for(&[container, blob]),
            request_id: Uuid::new_v4().to_string(),
        })
    }

    async fn delete_blob(&self, container: &str, blob: &str) -> StoreResult<BlobDeleted> {
        let mut blobs = self
            .containers
            .get_mut(container)
            .ok_or_else(Self::container_not_found)?;

        blobs
            .remove(blob)
            .ok_or_else(|| StoreError::new("The specified blob does not exist."))?;

        Ok(BlobDeleted {
            request_id: Uuid::new_v4().to_string(),
        })
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
