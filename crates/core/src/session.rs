//! Session window assignment from heartbeat timestamps.
//!
//! A user's pings, ordered by `event_timestamp`, partition into maximal runs
//! where consecutive gaps stay within [`SESSION_GAP_SECONDS`]. Session ids
//! count up from 1 independently per user. A ping's duration is the gap back
//! to the previous ping in the same session; the first ping of a session has
//! none. Duration is the inter-ping gap, not elapsed session length.
//!
//! Both execution modes share one step function: the incremental path applies
//! it to the single most recent persisted ping, the batch path folds it over
//! the full sorted history. They agree exactly when pings were ingested in
//! timestamp order; the batch pass is canonical whenever they disagree.

/// Inactivity gap separating two sessions, in seconds.
pub const SESSION_GAP_SECONDS: i64 = 60;

/// The most recent persisted ping for a user. The only state the incremental
/// step consults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LastPing {
    pub timestamp: i64,
    pub session_id: i64,
}

/// Session id and duration assigned to one ping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PingAssignment {
    pub session_id: i64,
    /// Seconds since the previous ping in the same session; `None` at a
    /// session start.
    pub session_duration: Option<i64>,
}

/// Incremental assignment: one ping against its single predecessor.
///
/// With no predecessor the ping opens session 1. Otherwise a gap above the
/// threshold opens the next session; a gap within it extends the current one
/// and records the gap as duration. Correct only when pings arrive in
/// non-decreasing timestamp order per user; out-of-order arrivals are
/// repaired by [`recompute_user`].
pub fn assign_incremental(previous: Option<LastPing>, timestamp: i64) -> PingAssignment {
    match previous {
        None => PingAssignment {
            session_id: 1,
            session_duration: None,
        },
        Some(prev) => {
            let gap = timestamp - prev.timestamp;
            if gap > SESSION_GAP_SECONDS {
                PingAssignment {
                    session_id: prev.session_id + 1,
                    session_duration: None,
                }
            } else {
                PingAssignment {
                    session_id: prev.session_id,
                    session_duration: Some(gap),
                }
            }
        }
    }
}

/// Canonical assignment for one user's complete history.
///
/// `timestamps` must be sorted ascending; ties keep their insertion order.
/// Returns one assignment per input ping, in order. An empty history returns
/// an empty vec (a user with no pings has no session rows at all).
pub fn recompute_user(timestamps: &[i64]) -> Vec<PingAssignment> {
    let mut assignments = Vec::with_capacity(timestamps.len());
    let mut previous: Option<LastPing> = None;

    for &ts in timestamps {
        let assigned = assign_incremental(previous, ts);
        assignments.push(assigned);
        previous = Some(LastPing {
            timestamp: ts,
            session_id: assigned.session_id,
        });
    }

    assignments
}
