//! Game-wide statistics reply.

use crate::calculators::{points_by_user, round2};
use crate::date::day_range;
use matchday_core::Result;
use serde::{Deserialize, Serialize};
use sqlite_store::{query, EventStore};

/// The game stats reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameStats {
    /// Distinct users with at least one session ping.
    pub active_users: i64,
    /// Distinct (user, session) pairs.
    pub total_sessions: i64,
    /// Sessions per active user, two decimals; 0 with no active users.
    pub average_sessions_per_user: f64,
    /// Every user tied at the maximum point total.
    pub users_with_most_points: Vec<String>,
    pub most_points: i64,
}

/// Computes the game-wide stats reply, optionally filtered to one UTC
/// day. Unlike user stats nothing here is cached; the scan is cheap
/// enough to run per request.
pub fn game_stats(store: &EventStore, date: Option<&str>) -> Result<GameStats> {
    let range = date.map(day_range).transpose()?;

    let active_users = query::active_users(store, range)?;
    let total_sessions = query::total_sessions(store, range)?;
    let average_sessions_per_user = if active_users > 0 {
        round2(total_sessions as f64 / active_users as f64)
    } else {
        0.0
    };

    let users = query::all_user_ids(store)?;
    let matches = query::all_match_events(store, range)?;
    let totals = points_by_user(&matches);

    let most_points = users
        .iter()
        .map(|u| totals.get(u.as_str()).copied().unwrap_or(0))
        .max()
        .unwrap_or(0);
    let users_with_most_points: Vec<String> = users
        .iter()
        .filter(|u| totals.get(u.as_str()).copied().unwrap_or(0) == most_points)
        .cloned()
        .collect();

    Ok(GameStats {
        active_users,
        total_sessions,
        average_sessions_per_user,
        users_with_most_points,
        most_points,
    })
}
