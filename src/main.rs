//! Matchday Analytics Engine
//!
//! Event ingestion and sessionization service handling:
//! - typed event validation and idempotent persistence
//! - gap-based session windowing (incremental and batch recompute)
//! - per-user and game-wide stats over the persisted history

use std::net::SocketAddr;
use std::path::Path;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{info, warn};

use api::{router, AppState, DataPaths};
use sqlite_store::{EventStore, StoreConfig};
use telemetry::{health, init_tracing, TracingConfig};

/// Application configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct Config {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,

    /// Event log consumed by /initialize and /admin/ingest.
    #[serde(default = "default_events_path")]
    events_path: String,

    /// Country/timezone reference file.
    #[serde(default = "default_timezones_path")]
    timezones_path: String,

    #[serde(default)]
    store: StoreConfig,

    #[serde(default)]
    tracing: TracingConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_events_path() -> String {
    "data/events.jsonl".to_string()
}

fn default_timezones_path() -> String {
    "data/timezones.jsonl".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            events_path: default_events_path(),
            timezones_path: default_timezones_path(),
            store: StoreConfig::default(),
            tracing: TracingConfig::default(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Load configuration
    let config = load_config()?;

    // Initialize tracing
    init_tracing(&config.tracing);

    info!("Starting Matchday Engine v{}", env!("CARGO_PKG_VERSION"));

    // Open the store and provision the schema
    let store = Arc::new(EventStore::open(&config.store).context("Failed to open event store")?);
    store
        .init_schema()
        .context("Failed to provision the store schema")?;
    health().store.set_healthy();
    info!(path = %config.store.path, "Event store ready");

    // Missing input files are not fatal: the reload endpoints report them
    for (name, path) in [
        ("events", &config.events_path),
        ("timezones", &config.timezones_path),
    ] {
        if !Path::new(path).exists() {
            warn!(file = name, path = %path, "Input file not found at startup");
        }
    }

    // Create application state
    let state = AppState::new(
        store,
        DataPaths::new(&config.events_path, &config.timezones_path),
    );
    let recompute_cancel = state.recompute_cancel.clone();

    // Create router
    let app = router(state);

    // Start HTTP server
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid server address")?;

    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // Stop an in-flight recompute between users
    info!("Shutting down...");
    recompute_cancel.store(true, Ordering::Relaxed);

    info!("Shutdown complete");
    Ok(())
}

/// Load configuration from files and environment.
fn load_config() -> Result<Config> {
    let config = config::Config::builder()
        // Start with defaults
        .add_source(config::Config::try_from(&Config::default())?)
        // Load from config file if exists
        .add_source(
            config::File::with_name("config/default")
                .required(false)
                .format(config::FileFormat::Toml),
        )
        // Override with environment variables
        .add_source(
            config::Environment::default()
                .separator("__")
                .prefix("MATCHDAY")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    let mut config: Config = config
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    // Manual overrides for nested config from environment
    // The config crate's nested parsing doesn't work reliably with underscored field names
    if let Ok(path) = std::env::var("MATCHDAY_STORE_PATH") {
        config.store.path = path;
    }
    if let Ok(path) = std::env::var("MATCHDAY_EVENTS_PATH") {
        config.events_path = path;
    }
    if let Ok(path) = std::env::var("MATCHDAY_TIMEZONES_PATH") {
        config.timezones_path = path;
    }

    Ok(config)
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received terminate signal");
        }
    }
}
