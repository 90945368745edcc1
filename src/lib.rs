//! blob-gateway: a JSON HTTP gateway over Azure Blob Storage.
//!
//! Exposes four endpoints that forward directly to container and blob
//! operations of the storage service: create a container, list its blobs,
//! upload a file as a blob, and delete a blob.
//!
//! # Example
//!
//! ```no_run
//! use blob_gateway::{Config, GatewayServer};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config {
//!         in_memory: true,
//!         ..Config::default()
//!     };
//!     let server = GatewayServer::new(config).unwrap();
//!     server.run().await.unwrap();
//! }
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;
pub mod store;
pub mod upload;

// Re-exports for convenience
pub use config::{Args, Config, DEFAULT_PORT};
pub use error::{GatewayError, GatewayResult, Operation, StageError, StoreError, StoreResult};
pub use server::{GatewayServer, GatewayServerBuilder};
pub use store::{AzureBlobStore, BlobStore, MemoryBlobStore};
