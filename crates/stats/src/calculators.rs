//! Pure per-metric calculators.
//!
//! Everything here is a function over values already read from the
//! store; the composition and the reads live in [`crate::user`] and
//! [`crate::game`].

use sqlite_store::MatchEventRow;
use std::collections::HashMap;

/// Points one side takes from a match: 3 for a win, 1 for a draw, 0 for
/// a loss. Applied to each side independently, so a draw pays both.
pub fn side_points(goals_for: i64, goals_against: i64) -> i64 {
    if goals_for > goals_against {
        3
    } else if goals_for == goals_against {
        1
    } else {
        0
    }
}

/// Home and away point totals for one user over their match rows.
pub fn user_points(user_id: &str, matches: &[MatchEventRow]) -> (i64, i64) {
    let mut home = 0;
    let mut away = 0;
    for m in matches {
        if m.home_user_id == user_id {
            home += side_points(m.home_goals_scored, m.away_goals_scored);
        }
        if m.away_user_id == user_id {
            away += side_points(m.away_goals_scored, m.home_goals_scored);
        }
    }
    (home, away)
}

/// Total points per user over a set of match rows.
pub fn points_by_user(matches: &[MatchEventRow]) -> HashMap<&str, i64> {
    let mut totals: HashMap<&str, i64> = HashMap::new();
    for m in matches {
        *totals.entry(m.home_user_id.as_str()).or_default() +=
            side_points(m.home_goals_scored, m.away_goals_scored);
        *totals.entry(m.away_user_id.as_str()).or_default() +=
            side_points(m.away_goals_scored, m.home_goals_scored);
    }
    totals
}

/// Seconds spent in matches: per match id, the span from its first to
/// its last event. A match with a single event contributes zero.
pub fn match_time_seconds(matches: &[MatchEventRow]) -> i64 {
    let mut spans: HashMap<&str, (i64, i64)> = HashMap::new();
    for m in matches {
        let span = spans
            .entry(m.match_id.as_str())
            .or_insert((m.event_timestamp, m.event_timestamp));
        span.0 = span.0.min(m.event_timestamp);
        span.1 = span.1.max(m.event_timestamp);
    }
    spans.values().map(|(first, last)| last - first).sum()
}

/// Seconds in game derived from counts alone: every ping beyond the
/// first of its session stands for one 60-second interval. Actual
/// inter-ping gaps are not consulted.
pub fn time_in_game_seconds(ping_count: i64, session_count: i64) -> i64 {
    (ping_count - session_count) * 60
}

/// Rounds to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
