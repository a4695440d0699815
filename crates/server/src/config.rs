//! Server configuration

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use pollbus_core::{
    BusConfig, FileStore, MemoryStore, MessageLog, PollCoordinator, SharedStore,
};

pub const DEFAULT_ADDR: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 8124);

/// Where the log snapshot lives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    /// In-process cache, gone when the server exits.
    Memory,
    /// One JSON file per key under this directory, shareable between processes.
    File(PathBuf),
}

/// Configuration for the pollbus server
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Address to listen on
    pub bind_addr: SocketAddr,
    /// Snapshot storage backend
    pub storage: StorageBackend,
    /// Directory served for every path other than the bus endpoints
    pub static_dir: Option<PathBuf>,
    /// Log and poll settings
    pub bus: BusConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_ADDR,
            storage: StorageBackend::Memory,
            static_dir: None,
            bus: BusConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Defaults overridden by `POLLBUS_*` environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Self {
            bus: BusConfig::from_env()?,
            ..Self::default()
        };

        if let Ok(addr) = std::env::var("POLLBUS_ADDR") {
            config.bind_addr = addr
                .parse()
                .with_context(|| format!("POLLBUS_ADDR={:?} is not a socket address", addr))?;
        }
        if let Ok(dir) = std::env::var("POLLBUS_STORE_DIR") {
            config.storage = StorageBackend::File(PathBuf::from(dir));
        }
        if let Ok(dir) = std::env::var("POLLBUS_STATIC_DIR") {
            config.static_dir = Some(PathBuf::from(dir));
        }

        Ok(config)
    }

    /// Open the configured snapshot store.
    pub async fn open_store(&self) -> anyhow::Result<Arc<dyn SharedStore>> {
        let store: Arc<dyn SharedStore> = match &self.storage {
            StorageBackend::Memory => Arc::new(MemoryStore::new()),
            StorageBackend::File(dir) => Arc::new(
                FileStore::open(dir)
                    .await
                    .with_context(|| format!("Failed to open store at {:?}", dir))?,
            ),
        };
        Ok(store)
    }
}

/// App state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub log: MessageLog,
    pub coordinator: PollCoordinator,
}

impl AppState {
    pub async fn new(store: Arc<dyn SharedStore>, bus: &BusConfig) -> pollbus_core::Result<Self> {
        let log = MessageLog::open(store, bus).await?;
        let coordinator = PollCoordinator::new(log.clone(), bus);
        Ok(Self { log, coordinator })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr, "0.0.0.0:8124".parse::<SocketAddr>().unwrap());
        assert_eq!(config.storage, StorageBackend::Memory);
        assert!(config.static_dir.is_none());
        assert_eq!(config.bus, BusConfig::default());
    }

    #[tokio::test]
    async fn test_file_backend_opens_directory() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("cache");
        let config = ServerConfig {
            storage: StorageBackend::File(dir.clone()),
            ..Default::default()
        };

        let store = config.open_store().await.unwrap();
        assert!(dir.is_dir());
        assert!(store.fetch("chat_messages").await.unwrap().is_none());
    }
}
