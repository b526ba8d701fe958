//! Batch session recompute driver.
//!
//! Walks every user with pings and re-derives their session assignments
//! from full, correctly ordered history. The canonical pass: wherever
//! incremental assignment drifted (out-of-order arrivals), this
//! overwrites it. Cancellation is checked between users, each of whom
//! commits in their own transaction, so a cancelled run leaves every
//! already-processed user fully consistent.

use matchday_core::Result;
use serde::{Deserialize, Serialize};
use sqlite_store::EventStore;
use std::sync::atomic::{AtomicBool, Ordering};
use telemetry::metrics;
use tracing::{info, warn};

/// Outcome of one recompute pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecomputeReport {
    /// Users whose assignments were recomputed.
    pub users: usize,
    /// Session rows written.
    pub rows_updated: usize,
    /// True when the pass stopped early on a cancellation signal.
    pub cancelled: bool,
}

/// Recomputes session ids and durations for every user with pings.
pub fn recompute_all(store: &EventStore, cancel: &AtomicBool) -> Result<RecomputeReport> {
    let users = store.session_users()?;
    let total = users.len();
    let mut report = RecomputeReport {
        users: 0,
        rows_updated: 0,
        cancelled: false,
    };

    for user_id in &users {
        if cancel.load(Ordering::Relaxed) {
            report.cancelled = true;
            warn!(
                done = report.users,
                total, "Recompute cancelled between users"
            );
            break;
        }
        report.rows_updated += store.recompute_user_sessions(user_id)?;
        report.users += 1;
    }

    metrics().recompute_runs.inc();
    metrics()
        .recompute_rows_updated
        .inc_by(report.rows_updated as u64);
    info!(
        users = report.users,
        rows = report.rows_updated,
        cancelled = report.cancelled,
        "Recompute finished"
    );
    Ok(report)
}
