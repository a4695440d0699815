//! Pollbus HTTP server
//!
//! Long-polling chat transport over the pollbus message log.

pub mod config;
pub mod error;
pub mod handlers;

use axum::{routing::get, Router};
use std::path::Path;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::info;

use config::{AppState, ServerConfig, StorageBackend};
use handlers::{get_bus, post_bus};

/// Build the application router.
///
/// With `static_dir` set, every path other than the bus endpoints is served
/// from that directory (`/` resolves to `index.html`).
pub fn router(state: AppState, static_dir: Option<&Path>) -> Router {
    let app = Router::new()
        .route("/chat", get(get_bus).post(post_bus))
        .route("/health", get(health_check))
        .with_state(state);

    let app = match static_dir {
        Some(dir) => app.fallback_service(ServeDir::new(dir)),
        None => app,
    };

    app.layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Serve on an already-bound listener until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    app: Router,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    info!("=== Pollbus Server ===");
    match &config.storage {
        StorageBackend::Memory => info!("Storage: in-process memory cache"),
        StorageBackend::File(dir) => info!("Storage: file cache at {:?}", dir),
    }
    info!(
        "Log {:?}: capacity {}, poll timeout {:?}, sleep interval {:?}, stale cursors {:?}",
        config.bus.store_key,
        config.bus.capacity,
        config.bus.poll_timeout,
        config.bus.sleep_interval,
        config.bus.stale_cursor
    );

    let store = config.open_store().await?;
    let state = AppState::new(store, &config.bus).await?;

    if let Some(dir) = &config.static_dir {
        info!("Serving static files from {:?}", dir);
    }
    let app = router(state, config.static_dir.as_deref());

    let listener = TcpListener::bind(config.bind_addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    serve(listener, app, shutdown_signal()).await?;

    info!("Server stopped");
    Ok(())
}

async fn health_check() -> &'static str {
    "OK - Pollbus Server"
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown requested");
    }
}
