//! Per-user statistics reply.

use crate::calculators::{
    match_time_seconds, round2, time_in_game_seconds, user_points,
};
use crate::date::day_range;
use chrono::{TimeZone, Utc};
use chrono_tz::Tz;
use matchday_core::{Error, Result};
use serde::{Deserialize, Serialize};
use sqlite_store::{query, EventStore, TimeRange, UserCache};
use tracing::debug;

/// Country and registration info, localized to the user's timezone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountryInfo {
    pub country: String,
    pub timezone: String,
    /// Registration instant formatted `%Y-%m-%d %H:%M:%S` local time.
    pub registered_at_local: String,
}

/// The user stats reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserStats {
    pub user_id: String,
    pub country_info: CountryInfo,
    /// Whole local days since the most recent registration event.
    pub days_since_last_login: i64,
    pub number_of_sessions: i64,
    pub time_spent_in_game_seconds: i64,
    pub total_points_home: i64,
    pub total_points_away: i64,
    /// Match time as a percentage of time in game, two decimals.
    pub match_time_percentage: f64,
}

#[derive(Debug, Clone, Copy)]
struct UserAggregates {
    sessions: i64,
    time_in_game: i64,
    points_home: i64,
    points_away: i64,
    match_time_percentage: f64,
}

impl UserAggregates {
    fn from_cache(cache: &UserCache) -> Option<Self> {
        Some(Self {
            sessions: cache.num_of_sessions?,
            time_in_game: cache.time_spent_in_game?,
            points_home: cache.total_points_home?,
            points_away: cache.total_points_away?,
            match_time_percentage: cache.match_time_percentage?,
        })
    }

    fn to_cache(self) -> UserCache {
        UserCache {
            num_of_sessions: Some(self.sessions),
            time_spent_in_game: Some(self.time_in_game),
            total_points_home: Some(self.points_home),
            total_points_away: Some(self.points_away),
            match_time_percentage: Some(self.match_time_percentage),
        }
    }
}

/// Computes the stats reply for one user.
///
/// With no date filter the aggregate block is served from the cache
/// columns on the user row, computing and writing them through on first
/// use. The cache reflects the history as of that computation; later
/// event arrivals do not refresh it until the next full reload. Dated
/// queries always compute fresh and never touch the cache.
pub fn user_stats(store: &EventStore, user_id: &str, date: Option<&str>) -> Result<UserStats> {
    let range = date.map(day_range).transpose()?;

    let info = query::latest_registration(store, user_id)?
        .ok_or_else(|| Error::not_found(format!("user {user_id}")))?;

    let tz: Tz = info.timezone.parse().map_err(|_| {
        Error::internal(format!(
            "invalid timezone '{}' for country {}",
            info.timezone, info.country
        ))
    })?;
    let registered_local = Utc
        .timestamp_opt(info.registered_at, 0)
        .single()
        .ok_or_else(|| {
            Error::invalid_value(format!("timestamp {} out of range", info.registered_at))
        })?
        .with_timezone(&tz);

    let now_local = Utc::now().with_timezone(&tz);
    let days_since_last_login = (now_local.date_naive() - registered_local.date_naive()).num_days();

    let aggregates = match range {
        Some(range) => compute_aggregates(store, user_id, Some(range))?,
        None => cached_aggregates(store, user_id)?,
    };

    Ok(UserStats {
        user_id: user_id.to_string(),
        country_info: CountryInfo {
            country: info.country,
            timezone: info.timezone,
            registered_at_local: registered_local.format("%Y-%m-%d %H:%M:%S").to_string(),
        },
        days_since_last_login,
        number_of_sessions: aggregates.sessions,
        time_spent_in_game_seconds: aggregates.time_in_game,
        total_points_home: aggregates.points_home,
        total_points_away: aggregates.points_away,
        match_time_percentage: aggregates.match_time_percentage,
    })
}

fn cached_aggregates(store: &EventStore, user_id: &str) -> Result<UserAggregates> {
    if let Some(cache) = query::read_user_cache(store, user_id)? {
        if let Some(aggregates) = UserAggregates::from_cache(&cache) {
            debug!(user_id, "Serving user aggregates from cache");
            return Ok(aggregates);
        }
    }
    let fresh = compute_aggregates(store, user_id, None)?;
    query::write_user_cache(store, user_id, &fresh.to_cache())?;
    debug!(user_id, "Computed and cached user aggregates");
    Ok(fresh)
}

fn compute_aggregates(
    store: &EventStore,
    user_id: &str,
    range: Option<TimeRange>,
) -> Result<UserAggregates> {
    let sessions = query::session_count(store, user_id, range)?;
    let pings = query::ping_count(store, user_id, range)?;
    let time_in_game = time_in_game_seconds(pings, sessions);

    let matches = query::user_match_events(store, user_id, range)?;
    let (points_home, points_away) = user_points(user_id, &matches);
    let match_time = match_time_seconds(&matches);
    let match_time_percentage = if time_in_game > 0 {
        round2(match_time as f64 / time_in_game as f64 * 100.0)
    } else {
        0.0
    };

    Ok(UserAggregates {
        sessions,
        time_in_game,
        points_home,
        points_away,
        match_time_percentage,
    })
}
