//! Gateway configuration.

use clap::Parser;
use std::path::PathBuf;

/// Default listening port.
pub const DEFAULT_PORT: u16 = 3001;

/// Default directory for staged uploads.
pub const DEFAULT_UPLOAD_DIR: &str = "uploads";

/// Default request body limit for uploads (256 MiB).
pub const DEFAULT_MAX_UPLOAD_SIZE: usize = 256 * 1024 * 1024;

/// Command-line arguments for the gateway.
#[derive(Parser, Debug, Clone)]
#[command(name = "blob-gateway")]
#[command(about = "JSON HTTP gateway over Azure Blob Storage")]
#[command(version)]
pub struct Args {
    /// Host address to bind to.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Storage account name. Overrides the one in the connection string.
    #[arg(long, env = "AZURE_STORAGE_ACCOUNT_NAME")]
    pub account_name: Option<String>,

    /// Storage connection string.
    #[arg(long, env = "AZURE_STORAGE_CONNECTION_STRING", hide_env_values = true)]
    pub connection_string: Option<String>,

    /// Directory where uploaded files are staged.
    #[arg(long, env = "UPLOAD_DIR", default_value = DEFAULT_UPLOAD_DIR)]
    pub upload_dir: PathBuf,

    /// Maximum upload request size in bytes.
    #[arg(long, env = "MAX_UPLOAD_SIZE", default_value_t = DEFAULT_MAX_UPLOAD_SIZE)]
    pub max_upload_size: usize,

    /// Serve from an in-process store instead of Azure.
    #[arg(long)]
    pub in_memory: bool,

    /// Enable debug logging.
    #[arg(long, short = 'd')]
    pub debug: bool,

    /// Enable silent mode (errors only).
    #[arg(long, short = 's')]
    pub silent: bool,
}

/// Gateway configuration derived from command-line arguments.
#[derive(Debug, Clone)]
pub struct Config {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Storage account name, if set explicitly.
    pub account_name: Option<String>,
    /// Storage connection string.
    pub connection_string: Option<String>,
    /// Directory where uploaded files are staged.
    pub upload_dir: PathBuf,
    /// Maximum upload request size in bytes.
    pub max_upload_size: usize,
    /// In-memory mode (no remote storage).
    pub in_memory: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            account_name: None,
            connection_string: None,
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
            in_memory: false,
        }
    }
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            account_name: args.account_name.filter(|s| !s.is_empty()),
            connection_string: args.connection_string.filter(|s| !s.is_empty()),
            upload_dir: args.upload_dir,
            max_upload_size: args.max_upload_size,
            in_memory: args.in_memory,
        }
    }
}

impl Config {
    /// Returns the bind address for the gateway.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
