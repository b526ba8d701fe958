//! Read accessors over the store.
//!
//! The stats layer composes these into user and game replies; tests use
//! them for verification. Everything here is read-only except the user
//! stat cache writer.

use crate::store::{store_err, EventStore};
use matchday_core::events::EventType;
use matchday_core::Result;
use rusqlite::{params, OptionalExtension};

/// Half-open `[start, end)` filter over `event_timestamp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: i64,
    pub end: i64,
}

fn bounds(range: Option<TimeRange>) -> (Option<i64>, Option<i64>) {
    match range {
        Some(r) => (Some(r.start), Some(r.end)),
        None => (None, None),
    }
}

/// A user's most recent registration joined with its timezone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationInfo {
    pub country: String,
    pub timezone: String,
    pub registered_at: i64,
}

/// One session ping row as persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRow {
    pub session_event_id: i64,
    pub event_id: i64,
    pub user_id: String,
    pub session_id: i64,
    pub session_duration: Option<i64>,
}

/// One match row with its event timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchEventRow {
    pub event_timestamp: i64,
    pub match_id: String,
    pub home_user_id: String,
    pub away_user_id: String,
    pub home_goals_scored: i64,
    pub away_goals_scored: i64,
}

/// The denormalized stat cache on a user row. All fields `None` until
/// the stats layer first computes them.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UserCache {
    pub num_of_sessions: Option<i64>,
    pub time_spent_in_game: Option<i64>,
    pub total_points_home: Option<i64>,
    pub total_points_away: Option<i64>,
    pub match_time_percentage: Option<f64>,
}

impl UserCache {
    /// True when every cached field has been computed.
    pub fn is_complete(&self) -> bool {
        self.num_of_sessions.is_some()
            && self.time_spent_in_game.is_some()
            && self.total_points_home.is_some()
            && self.total_points_away.is_some()
            && self.match_time_percentage.is_some()
    }
}

/// Count all persisted events.
pub fn count_events(store: &EventStore) -> Result<i64> {
    let conn = store.conn.lock();
    conn.query_row("SELECT COUNT(*) FROM events", [], |row| row.get(0))
        .map_err(store_err)
}

/// Count persisted events of one type.
pub fn count_events_by_type(store: &EventStore, event_type: EventType) -> Result<i64> {
    let conn = store.conn.lock();
    conn.query_row(
        "SELECT COUNT(*) FROM events WHERE event_type = ?1",
        params![event_type.as_str()],
        |row| row.get(0),
    )
    .map_err(store_err)
}

/// Count all persisted match rows.
pub fn count_match_rows(store: &EventStore) -> Result<i64> {
    let conn = store.conn.lock();
    conn.query_row("SELECT COUNT(*) FROM match_events", [], |row| row.get(0))
        .map_err(store_err)
}

/// Whether a user row exists.
pub fn user_exists(store: &EventStore, user_id: &str) -> Result<bool> {
    let conn = store.conn.lock();
    conn.query_row(
        "SELECT COUNT(*) FROM users WHERE id = ?1",
        params![user_id],
        |row| row.get::<_, i64>(0),
    )
    .map(|n| n > 0)
    .map_err(store_err)
}

/// All user ids in insertion order.
pub fn all_user_ids(store: &EventStore) -> Result<Vec<String>> {
    let conn = store.conn.lock();
    let mut stmt = conn
        .prepare("SELECT id FROM users ORDER BY num ASC")
        .map_err(store_err)?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .map_err(store_err)?;
    let mut ids = Vec::new();
    for row in rows {
        ids.push(row.map_err(store_err)?);
    }
    Ok(ids)
}

/// The timezone name for a country, if loaded.
pub fn timezone_for_country(store: &EventStore, country: &str) -> Result<Option<String>> {
    let conn = store.conn.lock();
    conn.query_row(
        "SELECT timezone FROM timezones WHERE country = ?1",
        params![country],
        |row| row.get(0),
    )
    .optional()
    .map_err(store_err)
}

/// The user's most recent registration, joined with the timezone for
/// its country. `None` for a user with no registration event.
pub fn latest_registration(store: &EventStore, user_id: &str) -> Result<Option<RegistrationInfo>> {
    let conn = store.conn.lock();
    conn.query_row(
        "SELECT re.country, tz.timezone, e.event_timestamp
         FROM registration_events re
         JOIN events e ON e.event_id = re.event_id
         JOIN timezones tz ON tz.country = re.country
         WHERE re.user_id = ?1
         ORDER BY e.event_timestamp DESC
         LIMIT 1",
        params![user_id],
        |row| {
            Ok(RegistrationInfo {
                country: row.get(0)?,
                timezone: row.get(1)?,
                registered_at: row.get(2)?,
            })
        },
    )
    .optional()
    .map_err(store_err)
}

/// A user's session rows ordered by event timestamp, insertion order
/// breaking ties.
pub fn session_rows_for_user(store: &EventStore, user_id: &str) -> Result<Vec<SessionRow>> {
    let conn = store.conn.lock();
    let mut stmt = conn
        .prepare(
            "SELECT se.session_event_id, se.event_id, se.user_id, se.session_id, se.session_duration
             FROM session_events se
             JOIN events e ON e.event_id = se.event_id
             WHERE se.user_id = ?1
             ORDER BY e.event_timestamp ASC, se.session_event_id ASC",
        )
        .map_err(store_err)?;
    let rows = stmt
        .query_map(params![user_id], |row| {
            Ok(SessionRow {
                session_event_id: row.get(0)?,
                event_id: row.get(1)?,
                user_id: row.get(2)?,
                session_id: row.get(3)?,
                session_duration: row.get(4)?,
            })
        })
        .map_err(store_err)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row.map_err(store_err)?);
    }
    Ok(out)
}

/// Distinct session count for one user, optionally restricted to a
/// time range.
pub fn session_count(store: &EventStore, user_id: &str, range: Option<TimeRange>) -> Result<i64> {
    let (start, end) = bounds(range);
    let conn = store.conn.lock();
    conn.query_row(
        "SELECT COUNT(DISTINCT se.session_id)
         FROM session_events se
         JOIN events e ON e.event_id = se.event_id
         WHERE se.user_id = ?1
           AND (?2 IS NULL OR e.event_timestamp >= ?2)
           AND (?3 IS NULL OR e.event_timestamp < ?3)",
        params![user_id, start, end],
        |row| row.get(0),
    )
    .map_err(store_err)
}

/// Ping count for one user, optionally restricted to a time range.
pub fn ping_count(store: &EventStore, user_id: &str, range: Option<TimeRange>) -> Result<i64> {
    let (start, end) = bounds(range);
    let conn = store.conn.lock();
    conn.query_row(
        "SELECT COUNT(*)
         FROM session_events se
         JOIN events e ON e.event_id = se.event_id
         WHERE se.user_id = ?1
           AND (?2 IS NULL OR e.event_timestamp >= ?2)
           AND (?3 IS NULL OR e.event_timestamp < ?3)",
        params![user_id, start, end],
        |row| row.get(0),
    )
    .map_err(store_err)
}

/// Match rows where the user played either side, ordered by timestamp.
pub fn user_match_events(
    store: &EventStore,
    user_id: &str,
    range: Option<TimeRange>,
) -> Result<Vec<MatchEventRow>> {
    let (start, end) = bounds(range);
    let conn = store.conn.lock();
    let mut stmt = conn
        .prepare(
            "SELECT e.event_timestamp, me.match_id, me.home_user_id, me.away_user_id,
                    me.home_goals_scored, me.away_goals_scored
             FROM match_events me
             JOIN events e ON e.event_id = me.event_id
             WHERE (me.home_user_id = ?1 OR me.away_user_id = ?1)
               AND (?2 IS NULL OR e.event_timestamp >= ?2)
               AND (?3 IS NULL OR e.event_timestamp < ?3)
             ORDER BY e.event_timestamp ASC, me.event_id ASC",
        )
        .map_err(store_err)?;
    let rows = stmt
        .query_map(params![user_id, start, end], match_row)
        .map_err(store_err)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row.map_err(store_err)?);
    }
    Ok(out)
}

/// All match rows, ordered by timestamp.
pub fn all_match_events(store: &EventStore, range: Option<TimeRange>) -> Result<Vec<MatchEventRow>> {
    let (start, end) = bounds(range);
    let conn = store.conn.lock();
    let mut stmt = conn
        .prepare(
            "SELECT e.event_timestamp, me.match_id, me.home_user_id, me.away_user_id,
                    me.home_goals_scored, me.away_goals_scored
             FROM match_events me
             JOIN events e ON e.event_id = me.event_id
             WHERE (?1 IS NULL OR e.event_timestamp >= ?1)
               AND (?2 IS NULL OR e.event_timestamp < ?2)
             ORDER BY e.event_timestamp ASC, me.event_id ASC",
        )
        .map_err(store_err)?;
    let rows = stmt
        .query_map(params![start, end], match_row)
        .map_err(store_err)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row.map_err(store_err)?);
    }
    Ok(out)
}

fn match_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<MatchEventRow> {
    Ok(MatchEventRow {
        event_timestamp: row.get(0)?,
        match_id: row.get(1)?,
        home_user_id: row.get(2)?,
        away_user_id: row.get(3)?,
        home_goals_scored: row.get(4)?,
        away_goals_scored: row.get(5)?,
    })
}

/// Distinct users with at least one ping, optionally in a range.
pub fn active_users(store: &EventStore, range: Option<TimeRange>) -> Result<i64> {
    let (start, end) = bounds(range);
    let conn = store.conn.lock();
    conn.query_row(
        "SELECT COUNT(DISTINCT se.user_id)
         FROM session_events se
         JOIN events e ON e.event_id = se.event_id
         WHERE (?1 IS NULL OR e.event_timestamp >= ?1)
           AND (?2 IS NULL OR e.event_timestamp < ?2)",
        params![start, end],
        |row| row.get(0),
    )
    .map_err(store_err)
}

/// Count of distinct (user, session) pairs, optionally in a range.
/// Session ids are per-user sequences, so the pair is the unit.
pub fn total_sessions(store: &EventStore, range: Option<TimeRange>) -> Result<i64> {
    let (start, end) = bounds(range);
    let conn = store.conn.lock();
    conn.query_row(
        "SELECT COUNT(*) FROM (
             SELECT DISTINCT se.user_id, se.session_id
             FROM session_events se
             JOIN events e ON e.event_id = se.event_id
             WHERE (?1 IS NULL OR e.event_timestamp >= ?1)
               AND (?2 IS NULL OR e.event_timestamp < ?2)
         )",
        params![start, end],
        |row| row.get(0),
    )
    .map_err(store_err)
}

/// Reads the stat cache for a user. `None` means the user does not
/// exist; a row of `None` fields means the cache was never computed.
pub fn read_user_cache(store: &EventStore, user_id: &str) -> Result<Option<UserCache>> {
    let conn = store.conn.lock();
    conn.query_row(
        "SELECT num_of_sessions, time_spent_in_game, total_points_home,
                total_points_away, match_time_percentage
         FROM users WHERE id = ?1",
        params![user_id],
        |row| {
            Ok(UserCache {
                num_of_sessions: row.get(0)?,
                time_spent_in_game: row.get(1)?,
                total_points_home: row.get(2)?,
                total_points_away: row.get(3)?,
                match_time_percentage: row.get(4)?,
            })
        },
    )
    .optional()
    .map_err(store_err)
}

/// Writes the full stat cache for a user in one statement, keeping the
/// cached fields consistent with each other.
pub fn write_user_cache(store: &EventStore, user_id: &str, cache: &UserCache) -> Result<()> {
    let conn = store.conn.lock();
    conn.execute(
        "UPDATE users
         SET num_of_sessions = ?2, time_spent_in_game = ?3, total_points_home = ?4,
             total_points_away = ?5, match_time_percentage = ?6
         WHERE id = ?1",
        params![
            user_id,
            cache.num_of_sessions,
            cache.time_spent_in_game,
            cache.total_points_home,
            cache.total_points_away,
            cache.match_time_percentage
        ],
    )
    .map(|_| ())
    .map_err(store_err)
}
