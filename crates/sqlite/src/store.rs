//! Durable, transactional event persistence.
//!
//! One connection guarded by a mutex; one transaction per batch via
//! [`EventStore::with_batch`]; one savepoint per event inside the batch
//! so a failed event rolls back alone while the batch continues. The
//! store never holds a generic event row without its extension row.

use crate::config::StoreConfig;
use crate::schema;
use matchday_core::events::{EventEnvelope, EventPayload, MatchData, RegistrationData, SessionPingData};
use matchday_core::reference::TimezoneEntry;
use matchday_core::session::{assign_incremental, recompute_user, LastPing};
use matchday_core::{Error, Result};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use tracing::{debug, info, trace};

/// Maps a rusqlite failure into the store error class.
pub(crate) fn store_err(e: rusqlite::Error) -> Error {
    Error::store(e.to_string())
}

fn is_constraint_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(f, _) if f.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

/// SQLite-backed event store.
pub struct EventStore {
    pub(crate) conn: Mutex<Connection>,
}

impl EventStore {
    /// Opens (or creates) the database at the configured path and
    /// applies connection pragmas. Parent directories are created for
    /// file-backed databases.
    pub fn open(config: &StoreConfig) -> Result<Self> {
        let conn = if config.path == ":memory:" {
            Connection::open_in_memory().map_err(store_err)?
        } else {
            if let Some(dir) = Path::new(&config.path).parent() {
                if !dir.as_os_str().is_empty() {
                    std::fs::create_dir_all(dir)?;
                }
            }
            Connection::open(&config.path).map_err(store_err)?
        };
        conn.execute_batch(schema::PRAGMAS).map_err(store_err)?;
        info!(path = %config.path, "Opened event store");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Opens a private in-memory store with the schema already created.
    /// Test entry point.
    pub fn open_in_memory() -> Result<Self> {
        let store = Self::open(&StoreConfig {
            path: ":memory:".to_string(),
        })?;
        store.init_schema()?;
        Ok(store)
    }

    /// Creates all tables and indexes if missing. Idempotent.
    pub fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock();
        for ddl in schema::all_tables() {
            conn.execute_batch(ddl).map_err(store_err)?;
        }
        debug!("Schema ready");
        Ok(())
    }

    /// Drops and recreates every table, discarding all data.
    pub fn reset(&self) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute_batch(schema::DROP_TABLES).map_err(store_err)?;
        for ddl in schema::all_tables() {
            conn.execute_batch(ddl).map_err(store_err)?;
        }
        info!("Store reset, all tables recreated");
        Ok(())
    }

    /// Runs `f` inside a single transaction. Commits when the closure
    /// returns `Ok`, rolls the whole batch back when it returns `Err`.
    pub fn with_batch<T>(&self, f: impl FnOnce(&mut BatchWriter<'_>) -> Result<T>) -> Result<T> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction().map_err(store_err)?;
        let mut writer = BatchWriter { tx };
        let out = f(&mut writer)?;
        writer.tx.commit().map_err(store_err)?;
        Ok(out)
    }

    /// Replaces the timezone reference set in one transaction.
    pub fn load_timezones(&self, entries: &[TimezoneEntry]) -> Result<usize> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction().map_err(store_err)?;
        tx.execute("DELETE FROM timezones", []).map_err(store_err)?;
        {
            let mut stmt = tx
                .prepare("INSERT INTO timezones (country, timezone) VALUES (?1, ?2)")
                .map_err(store_err)?;
            for entry in entries {
                stmt.execute(params![entry.country, entry.timezone])
                    .map_err(store_err)?;
            }
        }
        tx.commit().map_err(store_err)?;
        info!(countries = entries.len(), "Loaded timezone reference data");
        Ok(entries.len())
    }

    /// User ids with at least one session ping, sorted so recompute
    /// walks users in a deterministic order.
    pub fn session_users(&self) -> Result<Vec<String>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare("SELECT DISTINCT user_id FROM session_events ORDER BY user_id")
            .map_err(store_err)?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(store_err)?;
        let mut users = Vec::new();
        for row in rows {
            users.push(row.map_err(store_err)?);
        }
        Ok(users)
    }

    /// Re-derives session ids and durations for one user from their
    /// full ping history and overwrites the stored assignments, all in
    /// one transaction. History is ordered by timestamp with insertion
    /// order breaking ties. Returns the number of rows written.
    pub fn recompute_user_sessions(&self, user_id: &str) -> Result<usize> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction().map_err(store_err)?;
        let history: Vec<(i64, i64)> = {
            let mut stmt = tx
                .prepare(
                    "SELECT se.session_event_id, e.event_timestamp
                     FROM session_events se
                     JOIN events e ON e.event_id = se.event_id
                     WHERE se.user_id = ?1
                     ORDER BY e.event_timestamp ASC, se.session_event_id ASC",
                )
                .map_err(store_err)?;
            let rows = stmt
                .query_map(params![user_id], |row| {
                    Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?))
                })
                .map_err(store_err)?;
            let mut history = Vec::new();
            for row in rows {
                history.push(row.map_err(store_err)?);
            }
            history
        };

        let timestamps: Vec<i64> = history.iter().map(|(_, ts)| *ts).collect();
        let assignments = recompute_user(&timestamps);

        let mut updated = 0;
        {
            let mut stmt = tx
                .prepare(
                    "UPDATE session_events
                     SET session_id = ?1, session_duration = ?2
                     WHERE session_event_id = ?3",
                )
                .map_err(store_err)?;
            for ((row_id, _), assignment) in history.iter().zip(assignments.iter()) {
                updated += stmt
                    .execute(params![
                        assignment.session_id,
                        assignment.session_duration,
                        row_id
                    ])
                    .map_err(store_err)?;
            }
        }
        tx.commit().map_err(store_err)?;
        debug!(user_id, rows = updated, "Recomputed session assignments");
        Ok(updated)
    }

    /// Cheap liveness probe for the health endpoint.
    pub fn ping(&self) -> bool {
        let conn = self.conn.lock();
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .is_ok()
    }

    /// True once the events table exists.
    pub fn schema_ready(&self) -> bool {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'events'",
            [],
            |row| row.get::<_, i64>(0),
        )
        .map(|n| n > 0)
        .unwrap_or(false)
    }
}

/// Writer handle scoped to one batch transaction.
pub struct BatchWriter<'conn> {
    pub(crate) tx: rusqlite::Transaction<'conn>,
}

impl BatchWriter<'_> {
    /// Persists one event and its extension row under a savepoint. On
    /// any error the savepoint rolls back and only this event is lost;
    /// the surrounding batch transaction stays usable.
    ///
    /// Duplicate `event_id`s surface as [`Error::DuplicateEvent`],
    /// unknown countries and match participants as
    /// [`Error::ReferentialViolation`]; both leave no trace of the
    /// event behind.
    pub fn insert_event(&mut self, event: &EventEnvelope, payload: &EventPayload) -> Result<()> {
        let sp = self.tx.savepoint().map_err(store_err)?;
        let result = match payload {
            EventPayload::Registration(data) => insert_registration(&sp, event, data),
            EventPayload::SessionPing(data) => insert_session_ping(&sp, event, data),
            EventPayload::Match(data) => insert_match(&sp, event, data),
        };
        match result {
            Ok(()) => sp.commit().map_err(store_err),
            // Dropping the savepoint rolls this event back.
            Err(err) => Err(err),
        }
    }

    /// The most recently ingested ping for a user, if any. Sees rows
    /// written earlier in this batch.
    pub fn last_session_ping(&self, user_id: &str) -> Result<Option<LastPing>> {
        last_session_ping(&self.tx, user_id)
    }
}

fn insert_envelope(conn: &Connection, event: &EventEnvelope) -> Result<()> {
    let inserted = conn.execute(
        "INSERT INTO events (event_id, event_timestamp, event_type) VALUES (?1, ?2, ?3)",
        params![
            event.event_id,
            event.event_timestamp,
            event.event_type.as_str()
        ],
    );
    match inserted {
        Ok(_) => Ok(()),
        Err(e) if is_constraint_violation(&e) => Err(Error::DuplicateEvent(event.event_id)),
        Err(e) => Err(store_err(e)),
    }
}

fn ensure_user(conn: &Connection, user_id: &str) -> Result<()> {
    conn.execute("INSERT OR IGNORE INTO users (id) VALUES (?1)", params![user_id])
        .map(|_| ())
        .map_err(store_err)
}

fn insert_registration(
    conn: &Connection,
    event: &EventEnvelope,
    data: &RegistrationData,
) -> Result<()> {
    insert_envelope(conn, event)?;
    let known: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM timezones WHERE country = ?1",
            params![data.country],
            |row| row.get(0),
        )
        .map_err(store_err)?;
    if known == 0 {
        return Err(Error::referential(format!(
            "unknown country '{}' for user {}",
            data.country, data.user_id
        )));
    }
    ensure_user(conn, &data.user_id)?;
    conn.execute(
        "INSERT INTO registration_events (event_id, user_id, country, device_os)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            event.event_id,
            data.user_id,
            data.country,
            data.device_os.as_str()
        ],
    )
    .map_err(store_err)?;
    Ok(())
}

fn insert_session_ping(
    conn: &Connection,
    event: &EventEnvelope,
    data: &SessionPingData,
) -> Result<()> {
    insert_envelope(conn, event)?;
    ensure_user(conn, &data.user_id)?;
    let previous = last_session_ping(conn, &data.user_id)?;
    let assignment = assign_incremental(previous, event.event_timestamp);
    conn.execute(
        "INSERT INTO session_events (event_id, user_id, session_id, session_duration)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            event.event_id,
            data.user_id,
            assignment.session_id,
            assignment.session_duration
        ],
    )
    .map_err(store_err)?;
    trace!(
        user_id = %data.user_id,
        session_id = assignment.session_id,
        "Assigned session incrementally"
    );
    Ok(())
}

fn insert_match(conn: &Connection, event: &EventEnvelope, data: &MatchData) -> Result<()> {
    insert_envelope(conn, event)?;
    // Both sides must already exist; home == away collapses to one row
    // and fails the count.
    let known: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM users WHERE id IN (?1, ?2)",
            params![data.home_user_id, data.away_user_id],
            |row| row.get(0),
        )
        .map_err(store_err)?;
    if known < 2 {
        return Err(Error::referential(format!(
            "match {} references unknown user (home {}, away {})",
            data.match_id, data.home_user_id, data.away_user_id
        )));
    }
    conn.execute(
        "INSERT OR IGNORE INTO match_events
             (event_id, match_id, home_user_id, away_user_id, home_goals_scored, away_goals_scored)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            event.event_id,
            data.match_id,
            data.home_user_id,
            data.away_user_id,
            data.home_goals_scored,
            data.away_goals_scored
        ],
    )
    .map_err(store_err)?;
    Ok(())
}

fn last_session_ping(conn: &Connection, user_id: &str) -> Result<Option<LastPing>> {
    conn.query_row(
        "SELECT e.event_timestamp, se.session_id
         FROM session_events se
         JOIN events e ON e.event_id = se.event_id
         WHERE se.user_id = ?1
         ORDER BY se.session_event_id DESC
         LIMIT 1",
        params![user_id],
        |row| {
            Ok(LastPing {
                timestamp: row.get(0)?,
                session_id: row.get(1)?,
            })
        },
    )
    .optional()
    .map_err(store_err)
}
