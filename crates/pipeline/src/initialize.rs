//! Full reload: reset, reference data, ingest, recompute.

use crate::{ingest_file, load_reference_file, recompute_all, RecomputeReport};
use matchday_core::{BatchReport, Result};
use serde::{Deserialize, Serialize};
use sqlite_store::EventStore;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use tracing::info;

/// Outcome of the four-step reload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitializeReport {
    pub reference_countries: usize,
    pub ingest: BatchReport,
    pub recompute: RecomputeReport,
}

/// Resets storage, loads reference data, ingests the event file, and
/// runs the batch recompute. Each step is also independently callable;
/// this is the composed form the reload endpoint uses.
pub fn initialize(
    store: &EventStore,
    events_path: &Path,
    timezones_path: &Path,
    cancel: &AtomicBool,
) -> Result<InitializeReport> {
    info!("Initialize: full reload starting");
    store.reset()?;
    let reference_countries = load_reference_file(store, timezones_path)?;
    let ingest = ingest_file(store, events_path)?;
    let recompute = recompute_all(store, cancel)?;
    info!(
        countries = reference_countries,
        inserted = ingest.inserted,
        sessions_recomputed = recompute.rows_updated,
        "Initialize: full reload finished"
    );
    Ok(InitializeReport {
        reference_countries,
        ingest,
        recompute,
    })
}
