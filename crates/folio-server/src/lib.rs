//! Development server for Folio books.
//!
//! Serves the compiled book to a client-side renderer:
//! - `/api/config` and `/api/model` expose the book config and the per-path
//!   book model
//! - `/api/theme` exposes the theme file as JSON
//! - `/_content/{*path}` serves raw page markdown
//! - `/ws/live-reload` pushes [`UpdateEvent`]s while the docs are edited
//!
//! # Quick Start
//!
//! ```ignore
//! use std::path::PathBuf;
//! use folio_server::{ServerConfig, run_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig {
//!         source_dir: PathBuf::from("docs"),
//!         live_reload_enabled: true,
//!         ..ServerConfig::default()
//!     };
//!
//!     run_server(config).await.unwrap();
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! Browser ──HTTP──► axum router
//!                        │
//!                        ├─► API routes ──► BookStore (config + model)
//!                        │
//!                        ├─► Raw content ──► Storage
//!                        │
//!                        └─► WebSocket ◄── LiveReloadManager
//!                                               │
//!                                               └─► notify ──► BookCompiler
//! ```

mod app;
mod error;
mod handlers;
mod live_reload;
mod state;
mod theme;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use folio_site::{BookCompiler, BookOptions, BookStore};
use folio_storage::{FsStorage, Storage};
use tokio::sync::broadcast;

pub use error::ServerError;
pub use live_reload::UpdateEvent;

use live_reload::{CHANNEL_CAPACITY, LiveReloadManager, Recompiler};
use state::AppState;
use theme::ThemeState;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Documentation source directory.
    pub source_dir: PathBuf,
    /// Theme file served at `/api/theme`.
    pub theme: Option<PathBuf>,
    /// Enable live reload.
    pub live_reload_enabled: bool,
    /// Quiet period before a batch of file changes is processed.
    pub debounce: Duration,
    /// Book compilation options.
    pub book: BookOptions,
    /// Application version (for cache validation).
    pub version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 7890,
            source_dir: PathBuf::from("docs"),
            theme: None,
            live_reload_enabled: false,
            debounce: Duration::from_millis(100),
            book: BookOptions::default(),
            version: String::new(),
        }
    }
}

/// Run the server until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the docs cannot be compiled, the file watcher cannot
/// be started, or the listener fails to bind.
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let storage: Arc<dyn Storage> = Arc::new(FsStorage::new(config.source_dir.clone()));
    let compiler = BookCompiler::new(Arc::clone(&storage), config.book);
    let store = Arc::new(BookStore::new(compiler.generate()?));
    let theme = Arc::new(ThemeState::load(config.theme));

    let live_reload = if config.live_reload_enabled {
        let (tx, _rx) = broadcast::channel::<UpdateEvent>(CHANNEL_CAPACITY);
        let recompiler = Recompiler::new(compiler, Arc::clone(&store));
        Some(LiveReloadManager::start(
            storage.as_ref(),
            recompiler,
            Arc::clone(&theme),
            config.debounce,
            tx,
        )?)
    } else {
        None
    };

    let state = Arc::new(AppState {
        storage,
        store,
        theme,
        live_reload,
        version: config.version,
    });
    let app = app::create_router(state);

    let addr = SocketAddr::from_str(&format!("{}:{}", config.host, config.port))?;
    tracing::info!(address = %addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}
