use clap::Parser;
use pollbus_core::StaleCursorPolicy;
use pollbus_server::config::{ServerConfig, StorageBackend};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pollbus-server")]
#[command(about = "Long-polling chat bus server")]
struct Cli {
    /// Address to listen on [env: POLLBUS_ADDR, default 0.0.0.0:8124]
    #[arg(short, long)]
    addr: Option<SocketAddr>,

    /// Keep snapshots in this directory instead of process memory [env: POLLBUS_STORE_DIR]
    #[arg(long)]
    store_dir: Option<PathBuf>,

    /// Serve the chat page and other static files from this directory [env: POLLBUS_STATIC_DIR]
    #[arg(long)]
    static_dir: Option<PathBuf>,

    /// Messages kept in the log [env: POLLBUS_CAPACITY, default 20]
    #[arg(long)]
    capacity: Option<usize>,

    /// Seconds a poll waits for new messages [env: POLLBUS_POLL_TIMEOUT_SECS, default 10]
    #[arg(long)]
    poll_timeout_secs: Option<u64>,

    /// Milliseconds between snapshot reads while waiting
    /// [env: POLLBUS_SLEEP_INTERVAL_MS, default 200]
    #[arg(long)]
    sleep_interval_ms: Option<u64>,

    /// Store key holding the log [env: POLLBUS_STORE_KEY, default chat_messages]
    #[arg(long)]
    store_key: Option<String>,

    /// What to do with unknown tokens: resync or reject [env: POLLBUS_STALE_CURSOR]
    #[arg(long)]
    stale_cursor: Option<StaleCursorPolicy>,
}

impl Cli {
    fn apply(self, config: &mut ServerConfig) -> anyhow::Result<()> {
        if let Some(addr) = self.addr {
            config.bind_addr = addr;
        }
        if let Some(dir) = self.store_dir {
            config.storage = StorageBackend::File(dir);
        }
        if let Some(dir) = self.static_dir {
            config.static_dir = Some(dir);
        }
        if let Some(capacity) = self.capacity {
            config.bus.capacity = capacity;
        }
        if let Some(secs) = self.poll_timeout_secs {
            config.bus.poll_timeout = Duration::from_secs(secs);
        }
        if let Some(ms) = self.sleep_interval_ms {
            config.bus.sleep_interval = Duration::from_millis(ms);
        }
        if let Some(key) = self.store_key {
            config.bus.store_key = key;
        }
        if let Some(policy) = self.stale_cursor {
            config.bus.stale_cursor = policy;
        }
        config.bus.validate()?;
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = ServerConfig::from_env()?;
    cli.apply(&mut config)?;

    pollbus_server::run(config).await
}
