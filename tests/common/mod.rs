//! Common test utilities.

#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::net::TcpListener;

use blob_gateway::store::{BlobDeleted, BlobEntry, BlobUploaded, ContainerCreated};
use blob_gateway::config::DEFAULT_MAX_UPLOAD_SIZE;
use blob_gateway::{BlobStore, GatewayServerBuilder, MemoryBlobStore, StoreResult};

/// Account segment used in URLs produced by the test store.
pub const ACCOUNT: &str = "devstoreaccount1";

/// Memory store that counts how many calls reach it.
pub struct CountingStore {
    inner: MemoryBlobStore,
    calls: AtomicUsize,
}

impl CountingStore {
    pub fn inner(&self) -> &MemoryBlobStore {
        &self.inner
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl BlobStore for CountingStore {
    async fn create_container(&self, container: &str) -> StoreResult<ContainerCreated> {
        self.hit();
        self.inner.create_container(container).await
    }

    async fn list_blobs(&self, container: &str) -> StoreResult<Vec<BlobEntry>> {
        self.hit();
        self.inner.list_blobs(container).await
    }

    async fn upload_blob(
        &self,
        container: &str,
        blob: &str,
        data: Bytes,
        content_type: &str,
    ) -> StoreResult<BlobUploaded> {
        self.hit();
        self.inner.upload_blob(container, blob, data, content_type).await
    }

    async fn delete_blob(&self, container: &str, blob: &str) -> StoreResult<BlobDeleted> {
        self.hit();
        self.inner.delete_blob(container, blob).await
    }

    fn backend_name(&self) -> &'static str {
        "counting"
    }
}

/// Test server wrapper.
pub struct TestServer {
    pub base_url: String,
    pub store: Arc<CountingStore>,
    pub client: reqwest::Client,
    upload_dir: TempDir,
}

impl TestServer {
    /// Creates and starts a test server on a random port.
    pub async fn start() -> Self {
        Self::start_with_upload_limit(DEFAULT_MAX_UPLOAD_SIZE).await
    }

    /// Starts a test server whose upload route accepts at most `limit` bytes.
    pub async fn start_with_upload_limit(limit: usize) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let store = Arc::new(CountingStore {
            inner: MemoryBlobStore::new(&format!("{}/{}", base_url, ACCOUNT)).unwrap(),
            calls: AtomicUsize::new(0),
        });
        let upload_dir = TempDir::new().unwrap();

        let server = GatewayServerBuilder::new()
            .host("127.0.0.1")
            .port(port)
            .upload_dir(upload_dir.path())
            .max_upload_size(limit)
            .store(store.clone())
            .build()
            .unwrap();

        // The listener is already bound, so requests queue until serve() runs
        tokio::spawn(async move {
            server.serve(listener).await.unwrap();
        });

        Self {
            base_url,
            store,
            client: reqwest::Client::new(),
            upload_dir,
        }
    }

    /// Returns the URL for a gateway path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Returns the URL the store assigns to a container.
    pub fn container_url(&self, container: &str) -> String {
        format!("{}/{}/{}", self.base_url, ACCOUNT, container)
    }

    pub fn upload_dir(&self) -> &Path {
        self.upload_dir.path()
    }

    /// Number of files currently staged in the upload directory.
    pub fn staged_files(&self) -> usize {
        std::fs::read_dir(self.upload_dir.path()).unwrap().count()
    }

    /// Creates a container through the gateway and asserts success.
    pub async fn create_container(&self, id: &str) {
        let response = self
            .client
            .post(self.url("/container/create"))
            .json(&serde_json::json!({ "id": id }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 201);
    }

    /// Uploads `content` under `filename` to container `id`.
    pub async fn upload(&self, id: &str, filename: &str, content: &'static [u8]) -> reqwest::Response {
        let form = reqwest::multipart::Form::new().text("id", id.to_string()).part(
            "file",
            reqwest::multipart::Part::bytes(content).file_name(filename.to_string()),
        );

        self.client
            .post(self.url("/blob/create"))
            .multipart(form)
            .send()
            .await
            .unwrap()
    }

    /// Lists blob names in container `id`.
    pub async fn blob_names(&self, id: &str) -> Vec<String> {
        let response = self
            .client
            .get(self.url("/container/view"))
            .query(&[("id", id)])
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);

        let body: serde_json::Value = response.json().await.unwrap();
        body["blobs"]
            .as_array()
            .unwrap()
            .iter()
            .map(|b| b["name"].as_str().unwrap().to_string())
            .collect()
    }
}
