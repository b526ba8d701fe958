//! SQLite table schemas.
//!
//! One generic `events` row per ingested event plus a type-specific
//! extension row; deleting an event cascades to its extension. The
//! `users` table carries the denormalized per-user stat cache.

/// Connection-level pragmas applied once per open.
pub const PRAGMAS: &str = "
    PRAGMA journal_mode = WAL;
    PRAGMA foreign_keys = ON;
    PRAGMA busy_timeout = 5000;
    PRAGMA synchronous = NORMAL;
";

/// One row per distinct `user_id` seen in a non-match event. The
/// nullable columns are the lazily populated stat cache: all NULL until
/// the stats layer computes them, then consistent with the history as
/// of that computation.
pub const CREATE_USERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    num INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    num_of_sessions INTEGER,
    time_spent_in_game INTEGER,
    total_points_home INTEGER,
    total_points_away INTEGER,
    match_time_percentage REAL
)
"#;

/// Universal event envelope. `event_id` is caller-supplied and globally
/// unique; the primary key is what turns a replayed event into a
/// constraint violation instead of a second row.
pub const CREATE_EVENTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS events (
    event_id INTEGER PRIMARY KEY,
    event_timestamp INTEGER NOT NULL,
    event_type TEXT NOT NULL
        CHECK (event_type IN ('registration', 'session_ping', 'match'))
)
"#;

/// Country to IANA timezone reference data.
pub const CREATE_TIMEZONES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS timezones (
    country TEXT NOT NULL UNIQUE,
    timezone TEXT NOT NULL
)
"#;

pub const CREATE_REGISTRATION_EVENTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS registration_events (
    event_id INTEGER NOT NULL REFERENCES events (event_id) ON DELETE CASCADE,
    user_id TEXT NOT NULL,
    country TEXT NOT NULL,
    device_os TEXT NOT NULL
)
"#;

/// Session pings. `session_id` and `session_duration` are written at
/// ingest by incremental assignment and overwritten wholesale by batch
/// recompute; `session_event_id` preserves insertion order for the
/// equal-timestamp tie-break.
pub const CREATE_SESSION_EVENTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS session_events (
    session_event_id INTEGER PRIMARY KEY AUTOINCREMENT,
    event_id INTEGER NOT NULL REFERENCES events (event_id) ON DELETE CASCADE,
    user_id TEXT NOT NULL,
    session_id INTEGER NOT NULL,
    session_duration INTEGER
)
"#;

/// Match results. Insert-if-absent keyed by (event_id, match_id).
pub const CREATE_MATCH_EVENTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS match_events (
    event_id INTEGER NOT NULL REFERENCES events (event_id) ON DELETE CASCADE,
    match_id TEXT NOT NULL,
    home_user_id TEXT NOT NULL,
    away_user_id TEXT NOT NULL,
    home_goals_scored INTEGER NOT NULL DEFAULT 0,
    away_goals_scored INTEGER NOT NULL DEFAULT 0,
    UNIQUE (event_id, match_id)
)
"#;

/// Indexes for the per-user read paths.
pub const CREATE_INDEXES: &str = r#"
CREATE INDEX IF NOT EXISTS idx_events_timestamp ON events (event_timestamp);
CREATE INDEX IF NOT EXISTS idx_registration_events_user ON registration_events (user_id);
CREATE INDEX IF NOT EXISTS idx_session_events_user ON session_events (user_id);
CREATE INDEX IF NOT EXISTS idx_match_events_home ON match_events (home_user_id);
CREATE INDEX IF NOT EXISTS idx_match_events_away ON match_events (away_user_id)
"#;

/// All DDL statements in dependency order.
pub fn all_tables() -> [&'static str; 7] {
    [
        CREATE_USERS_TABLE,
        CREATE_EVENTS_TABLE,
        CREATE_TIMEZONES_TABLE,
        CREATE_REGISTRATION_EVENTS_TABLE,
        CREATE_SESSION_EVENTS_TABLE,
        CREATE_MATCH_EVENTS_TABLE,
        CREATE_INDEXES,
    ]
}

/// Drop statements in reverse dependency order, children first so the
/// cascade constraints never fire mid-drop.
pub const DROP_TABLES: &str = "
    DROP TABLE IF EXISTS registration_events;
    DROP TABLE IF EXISTS session_events;
    DROP TABLE IF EXISTS match_events;
    DROP TABLE IF EXISTS timezones;
    DROP TABLE IF EXISTS events;
    DROP TABLE IF EXISTS users;
";
