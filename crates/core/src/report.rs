//! Per-batch ingestion report.
//!
//! Every batch produces one [`BatchReport`]: outcome counts plus the error
//! strings in the order they were encountered. The report is a plain value
//! returned to the caller; nothing accumulates in process-wide state.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;

/// Aggregated result of one ingestion batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    /// Correlates this report with its log lines.
    pub batch_id: Uuid,
    /// Non-empty input lines seen.
    pub received: usize,
    /// Events persisted with their extension row.
    pub inserted: usize,
    /// Events skipped because their id was already persisted or already seen
    /// in this batch.
    pub skipped_duplicate: usize,
    /// Events skipped by envelope or per-type validation.
    pub skipped_invalid: usize,
    /// Events skipped because they referenced an unknown country or user.
    pub skipped_referential: usize,
    /// Lines that could not be decoded as JSON objects.
    pub decode_errors: usize,
    /// Human-readable error strings, encounter order preserved.
    pub errors: Vec<String>,
}

impl BatchReport {
    pub fn new() -> Self {
        Self {
            batch_id: Uuid::new_v4(),
            received: 0,
            inserted: 0,
            skipped_duplicate: 0,
            skipped_invalid: 0,
            skipped_referential: 0,
            decode_errors: 0,
            errors: Vec::new(),
        }
    }

    pub fn record_inserted(&mut self) {
        self.inserted += 1;
    }

    /// Records a recoverable per-event error.
    ///
    /// Returns `false` for fatal errors, which must abort the batch instead
    /// of landing in the report.
    pub fn record_error(&mut self, err: &Error) -> bool {
        match err {
            Error::DuplicateEvent(_) => self.skipped_duplicate += 1,
            Error::MissingField(_) | Error::InvalidDomainValue(_) => self.skipped_invalid += 1,
            Error::ReferentialViolation(_) => self.skipped_referential += 1,
            Error::Decode(_) => self.decode_errors += 1,
            _ => return false,
        }
        self.errors.push(err.to_string());
        true
    }

    /// Events that were skipped for any reason.
    pub fn skipped(&self) -> usize {
        self.skipped_duplicate + self.skipped_invalid + self.skipped_referential
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

impl Default for BatchReport {
    fn default() -> Self {
        Self::new()
    }
}
