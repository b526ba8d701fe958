//! Application state shared across handlers.

use sqlite_store::EventStore;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Locations of the input files served by the reload endpoints.
#[derive(Debug, Clone)]
pub struct DataPaths {
    /// Line-delimited event log.
    pub events: PathBuf,
    /// Country/timezone reference file.
    pub timezones: PathBuf,
}

impl DataPaths {
    pub fn new(events: impl Into<PathBuf>, timezones: impl Into<PathBuf>) -> Self {
        Self {
            events: events.into(),
            timezones: timezones.into(),
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Event store handle; handlers reach it through the blocking pool.
    pub store: Arc<EventStore>,
    /// Input file locations for /initialize and the /admin steps.
    pub paths: DataPaths,
    /// Raised to stop an in-flight recompute between users.
    pub recompute_cancel: Arc<AtomicBool>,
}

impl AppState {
    pub fn new(store: Arc<EventStore>, paths: DataPaths) -> Self {
        Self {
            store,
            paths,
            recompute_cancel: Arc::new(AtomicBool::new(false)),
        }
    }
}
