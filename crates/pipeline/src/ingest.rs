//! Batch ingestion of line-delimited event files.
//!
//! A whole input file is one batch and one transaction. Per-event
//! failures (bad lines, duplicates, validation, referential checks) are
//! recorded in the [`BatchReport`] and the batch keeps going; a store
//! or I/O failure aborts and rolls the whole batch back.

use matchday_core::events::EventEnvelope;
use matchday_core::validate::validate_event_data;
use matchday_core::{BatchReport, Error, Result};
use sqlite_store::{BatchWriter, EventStore};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use telemetry::metrics;
use tracing::{error, info};

/// Ingests a line-delimited JSON event file as one batch.
pub fn ingest_file(store: &EventStore, path: &Path) -> Result<BatchReport> {
    let file = File::open(path)?;
    let mut lines = Vec::new();
    for line in BufReader::new(file).lines() {
        lines.push(line?);
    }
    info!(path = %path.display(), lines = lines.len(), "Ingesting event file");
    ingest_lines(store, lines.iter().map(|l| l.as_str()))
}

/// Ingests one batch of event lines inside a single transaction.
pub fn ingest_lines<'a>(
    store: &EventStore,
    lines: impl IntoIterator<Item = &'a str>,
) -> Result<BatchReport> {
    let result = store.with_batch(|writer| {
        let mut report = BatchReport::new();
        let mut seen = HashSet::new();
        for line in lines {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            report.received += 1;
            match ingest_line(writer, &mut seen, line) {
                Ok(()) => report.record_inserted(),
                Err(err) => {
                    if !report.record_error(&err) {
                        return Err(err);
                    }
                }
            }
        }
        Ok(report)
    });

    match &result {
        Ok(report) => {
            let m = metrics();
            m.events_received.inc_by(report.received as u64);
            m.events_inserted.inc_by(report.inserted as u64);
            m.events_skipped_duplicate.inc_by(report.skipped_duplicate as u64);
            m.events_skipped_invalid.inc_by(report.skipped_invalid as u64);
            m.events_skipped_referential.inc_by(report.skipped_referential as u64);
            m.decode_errors.inc_by(report.decode_errors as u64);
            m.batches_ingested.inc();
            info!(
                batch_id = %report.batch_id,
                received = report.received,
                inserted = report.inserted,
                skipped = report.skipped(),
                decode_errors = report.decode_errors,
                "Batch ingested"
            );
        }
        Err(err) => {
            metrics().batches_failed.inc();
            error!(error = %err, "Batch aborted, transaction rolled back");
        }
    }
    result
}

fn ingest_line(writer: &mut BatchWriter<'_>, seen: &mut HashSet<i64>, line: &str) -> Result<()> {
    let envelope = EventEnvelope::parse_line(line)?;
    // Every parsed id counts, even when the event later fails: a second
    // occurrence is a duplicate regardless of the first one's fate.
    if !seen.insert(envelope.event_id) {
        return Err(Error::DuplicateEvent(envelope.event_id));
    }
    validate_event_data(envelope.event_type, &envelope.event_data)?;
    let payload = envelope.payload()?;
    writer.insert_event(&envelope, &payload)
}
