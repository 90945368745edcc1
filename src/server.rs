//! HTTP server for the blob gateway.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::error::{StoreError, StoreResult};
use crate::middleware::RouterSecurityExt;
use crate::router::{create_router, AppState};
use crate::store::{AzureBlobStore, BlobStore, MemoryBlobStore};

/// Account name used in URLs served by the in-memory backend.
pub const DEFAULT_MEMORY_ACCOUNT: &str = "devstoreaccount1";

/// Gateway server.
pub struct GatewayServer {
    config: Arc<Config>,
    store: Arc<dyn BlobStore>,
}

impl GatewayServer {
    /// Creates a gateway whose backend is chosen from the configuration.
    ///
    /// In-memory mode serves from a [`MemoryBlobStore`]; otherwise the
    /// connection string is required and an [`AzureBlobStore`] is built.
    pub fn new(config: Config) -> StoreResult<Self> {
        let store: Arc<dyn BlobStore> = if config.in_memory {
            let base_url = format!(
                "http://{}/{}",
                config.bind_address(),
                config.account_name.as_deref().unwrap_or(DEFAULT_MEMORY_ACCOUNT)
            );
            Arc::new(MemoryBlobStore::new(&base_url)?)
        } else {
            let connection_string = config.connection_string.as_deref().ok_or_else(|| {
                StoreError::new(
                    "AZURE_STORAGE_CONNECTION_STRING is required unless --in-memory is set",
                )
            })?;
            Arc::new(AzureBlobStore::from_connection_string(
                config.account_name.as_deref(),
                connection_string,
            )?)
        };

        Ok(Self::with_store(config, store))
    }

    /// Creates a gateway with a custom store.
    pub fn with_store(config: Config, store: Arc<dyn BlobStore>) -> Self {
        Self {
            config: Arc::new(config),
            store,
        }
    }

    /// Runs the server on the configured address.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let addr: SocketAddr = self.config.bind_address().parse()?;
        let listener = TcpListener::bind(addr).await?;
        self.serve(listener).await
    }

    /// Runs the server on an already bound listener.
    pub async fn serve(
        self,
        listener: TcpListener,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        tokio::fs::create_dir_all(&self.config.upload_dir).await?;

        let state = AppState {
            config: self.config.clone(),
            store: self.store.clone(),
        };

        let app = create_router(state)
            .with_security_headers()
            .with_cors()
            .layer(TraceLayer::new_for_http());

        info!(
            "Server running on {} ({} backend, uploads staged in {})",
            listener.local_addr()?,
            self.store.backend_name(),
            self.config.upload_dir.display()
        );

        axum::serve(listener, app).await?;

        Ok(())
    }

    /// Returns the bind address.
    pub fn bind_address(&self) -> String {
        self.config.bind_address()
    }
}

/// Builder for creating a gateway server.
pub struct GatewayServerBuilder {
    config: Config,
    store: Option<Arc<dyn BlobStore>>,
}

impl GatewayServerBuilder {
    /// Creates a new builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            store: None,
        }
    }

    /// Sets the configuration.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Sets the host address.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Sets the listening port.
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Sets the directory uploads are staged in.
    pub fn upload_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.upload_dir = dir.into();
        self
    }

    /// Sets the maximum upload request size in bytes.
    pub fn max_upload_size(mut self, limit: usize) -> Self {
        self.config.max_upload_size = limit;
        self
    }

    /// Sets the store.
    pub fn store(mut self, store: Arc<dyn BlobStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Builds the server, falling back to the configured backend when no
    /// store was given.
    pub fn build(self) -> StoreResult<GatewayServer> {
        match self.store {
            Some(store) => Ok(GatewayServer::with_store(self.config, store)),
            None => GatewayServer::new(self.config),
        }
    }
}

impl Default for GatewayServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
