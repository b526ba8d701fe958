//! Process-global operational counters.
//!
//! Kept in-memory and exposed through the health endpoint; counters
//! survive for the life of the process, not across restarts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// A monotonically increasing counter.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_by(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// A gauge holding the latest observed value.
#[derive(Debug, Default)]
pub struct Gauge(AtomicU64);

impl Gauge {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn set(&self, val: u64) {
        self.0.store(val, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Operational counters for the engine.
#[derive(Debug, Default)]
pub struct Metrics {
    // Ingestion
    pub events_received: Counter,
    pub events_inserted: Counter,
    pub events_skipped_duplicate: Counter,
    pub events_skipped_invalid: Counter,
    pub events_skipped_referential: Counter,
    pub decode_errors: Counter,
    pub batches_ingested: Counter,
    pub batches_failed: Counter,

    // Session recompute
    pub recompute_runs: Counter,
    pub recompute_rows_updated: Counter,

    // Reference data
    pub reference_countries: Gauge,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes a point-in-time snapshot.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            timestamp: Utc::now(),
            events_received: self.events_received.get(),
            events_inserted: self.events_inserted.get(),
            events_skipped_duplicate: self.events_skipped_duplicate.get(),
            events_skipped_invalid: self.events_skipped_invalid.get(),
            events_skipped_referential: self.events_skipped_referential.get(),
            decode_errors: self.decode_errors.get(),
            batches_ingested: self.batches_ingested.get(),
            batches_failed: self.batches_failed.get(),
            recompute_runs: self.recompute_runs.get(),
            recompute_rows_updated: self.recompute_rows_updated.get(),
            reference_countries: self.reference_countries.get(),
        }
    }
}

/// A snapshot of the counters at one point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub timestamp: DateTime<Utc>,
    pub events_received: u64,
    pub events_inserted: u64,
    pub events_skipped_duplicate: u64,
    pub events_skipped_invalid: u64,
    pub events_skipped_referential: u64,
    pub decode_errors: u64,
    pub batches_ingested: u64,
    pub batches_failed: u64,
    pub recompute_runs: u64,
    pub recompute_rows_updated: u64,
    pub reference_countries: u64,
}

/// Global metrics registry.
pub static METRICS: std::sync::LazyLock<Metrics> = std::sync::LazyLock::new(Metrics::new);

/// Get the global metrics instance.
pub fn metrics() -> &'static Metrics {
    &METRICS
}
