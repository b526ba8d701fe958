//! Timezone reference data loading.
//!
//! Reference data underpins the referential checks on registrations, so
//! unlike event ingestion a malformed line here is fatal: a partial
//! reference set would silently reject valid countries.

use matchday_core::reference::TimezoneEntry;
use matchday_core::Result;
use sqlite_store::EventStore;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use telemetry::{health, metrics};
use tracing::info;

/// Loads a `{country, timezone}` JSONL file, replacing the stored set.
pub fn load_reference_file(store: &EventStore, path: &Path) -> Result<usize> {
    let file = File::open(path)?;
    let mut entries = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        entries.push(TimezoneEntry::parse_line(line)?);
    }
    let count = store.load_timezones(&entries)?;
    metrics().reference_countries.set(count as u64);
    health().reference.set_healthy();
    info!(path = %path.display(), countries = count, "Reference data loaded");
    Ok(count)
}
