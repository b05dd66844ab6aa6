//! SQLite-backed session store.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{NaiveDateTime, Timelike, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};
use uuid::Uuid;

use super::{ScheduleRow, SessionDraft, SessionRecord, SessionStore};
use crate::error::{StorageError, StorageResult};

/// Busy timeout applied to every connection, in milliseconds.
///
/// Large runs write many rows in one transaction; concurrent writers wait
/// this long before SQLite reports the database as busy.
pub const BUSY_TIMEOUT_MS: u64 = 50_000;

const CREATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";
const CREATED_AT_PARSE: &str = "%Y-%m-%d %H:%M:%S%.f";
const SLOT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS planning_session (
    id          TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    owner_id    TEXT NOT NULL,
    created_at  TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS time_slot (
    id          TEXT PRIMARY KEY,
    start_time  TEXT NOT NULL,
    end_time    TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS schedule (
    id            TEXT PRIMARY KEY,
    exam_id       TEXT NOT NULL,
    subject_title TEXT NOT NULL,
    room_id       TEXT NOT NULL,
    room_name     TEXT NOT NULL,
    room_location TEXT,
    cohort_id     TEXT NOT NULL,
    cohort_size   INTEGER NOT NULL CHECK (cohort_size >= 0),
    cohort_major  TEXT NOT NULL,
    cohort_level  TEXT NOT NULL,
    time_slot_id  TEXT NOT NULL REFERENCES time_slot(id) ON DELETE CASCADE,
    session_id    TEXT NOT NULL REFERENCES planning_session(id) ON DELETE CASCADE
);
CREATE INDEX IF NOT EXISTS idx_schedule_session ON schedule(session_id);
CREATE INDEX IF NOT EXISTS idx_schedule_cohort ON schedule(session_id, cohort_id);
"#;

/// Session store over one shared SQLite connection.
#[derive(Debug, Clone)]
pub struct SqliteSessionStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteSessionStore {
    /// Opens (or creates) a database file.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> StorageResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    /// Configures an existing connection and ensures the schema exists.
    pub fn from_connection(conn: Connection) -> StorageResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.busy_timeout(Duration::from_millis(BUSY_TIMEOUT_MS))?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Shared handle to the underlying connection.
    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        Arc::clone(&self.conn)
    }

    fn get_conn(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StorageError::Lock(e.to_string()))
    }

    fn map_session(row: &rusqlite::Row) -> rusqlite::Result<SessionRecord> {
        Ok(SessionRecord {
            id: row.get(0)?,
            name: row.get(1)?,
            owner_id: row.get(2)?,
            created_at: parse_datetime(row, 3, CREATED_AT_PARSE)?,
        })
    }

    fn map_schedule(row: &rusqlite::Row) -> rusqlite::Result<ScheduleRow> {
        Ok(ScheduleRow {
            schedule_id: row.get(0)?,
            exam_id: row.get(1)?,
            subject_title: row.get(2)?,
            room_id: row.get(3)?,
            room_name: row.get(4)?,
            room_location: row.get(5)?,
            cohort_id: row.get(6)?,
            cohort_size: row.get(7)?,
            cohort_major: row.get(8)?,
            cohort_level: row.get(9)?,
            time_slot_id: row.get(10)?,
            start_time: parse_datetime(row, 11, SLOT_TIME_FORMAT)?,
            end_time: parse_datetime(row, 12, SLOT_TIME_FORMAT)?,
            session_id: row.get(13)?,
        })
    }

    fn ensure_session(conn: &Connection, session_id: &str) -> StorageResult<()> {
        let exists = conn
            .query_row(
                "SELECT 1 FROM planning_session WHERE id = ?1",
                params![session_id],
                |_| Ok(()),
            )
            .optional()?
            .is_some();

        if exists {
            Ok(())
        } else {
            Err(StorageError::NotFound {
                entity: "planning_session".into(),
                id: session_id.into(),
            })
        }
    }
}

impl SessionStore for SqliteSessionStore {
    fn save_session(&self, draft: &SessionDraft) -> StorageResult<SessionRecord> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let record = SessionRecord {
            id: Uuid::new_v4().to_string(),
            name: draft.name.clone(),
            owner_id: draft.owner_id.clone(),
            created_at: now_micros(),
        };

        tx.execute(
            r#"INSERT INTO planning_session (id, name, owner_id, created_at)
               VALUES (?1, ?2, ?3, ?4)"#,
            params![
                &record.id,
                &record.name,
                &record.owner_id,
                &record.created_at.format(CREATED_AT_FORMAT).to_string(),
            ],
        )?;

        for slot in &draft.slots {
            let slot_id = Uuid::new_v4().to_string();
            tx.execute(
                "INSERT INTO time_slot (id, start_time, end_time) VALUES (?1, ?2, ?3)",
                params![
                    &slot_id,
                    &slot.start.format(SLOT_TIME_FORMAT).to_string(),
                    &slot.end.format(SLOT_TIME_FORMAT).to_string(),
                ],
            )?;

            for room in &slot.rooms {
                tx.execute(
                    r#"INSERT INTO schedule (
                           id, exam_id, subject_title,
                           room_id, room_name, room_location,
                           cohort_id, cohort_size, cohort_major, cohort_level,
                           time_slot_id, session_id
                       ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"#,
                    params![
                        Uuid::new_v4().to_string(),
                        &slot.exam_id,
                        &slot.subject_title,
                        &room.id,
                        &room.name,
                        &room.location,
                        &slot.cohort.id,
                        slot.cohort.size,
                        &slot.cohort.major,
                        &slot.cohort.level,
                        &slot_id,
                        &record.id,
                    ],
                )?;
            }
        }

        tx.commit()?;

        info!(
            session = %record.id,
            exams = draft.exam_count(),
            rows = draft.schedule_row_count(),
            "session saved"
        );
        Ok(record)
    }

    fn list_sessions(&self, owner_id: Option<&str>) -> StorageResult<Vec<SessionRecord>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT id, name, owner_id, created_at
               FROM planning_session
               WHERE ?1 IS NULL OR owner_id = ?1
               ORDER BY created_at DESC, rowid DESC"#,
        )?;

        let sessions = stmt
            .query_map(params![owner_id], Self::map_session)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(sessions)
    }

    fn session_schedule(&self, session_id: &str) -> StorageResult<Vec<ScheduleRow>> {
        let conn = self.get_conn()?;
        Self::ensure_session(&conn, session_id)?;

        let mut stmt = conn.prepare(
            r#"SELECT s.id, s.exam_id, s.subject_title,
                      s.room_id, s.room_name, s.room_location,
                      s.cohort_id, s.cohort_size, s.cohort_major, s.cohort_level,
                      s.time_slot_id, t.start_time, t.end_time, s.session_id
               FROM schedule s
               JOIN time_slot t ON t.id = s.time_slot_id
               WHERE s.session_id = ?1
               ORDER BY t.start_time ASC, s.rowid ASC"#,
        )?;

        let rows = stmt
            .query_map(params![session_id], Self::map_schedule)?
            .collect::<Result<Vec<_>, _>>()?;

        debug!(session = %session_id, rows = rows.len(), "loaded session schedule");
        Ok(rows)
    }

    fn placed_exam_count(&self, session_id: &str) -> StorageResult<usize> {
        let conn = self.get_conn()?;
        Self::ensure_session(&conn, session_id)?;

        let count: i64 = conn.query_row(
            "SELECT COUNT(DISTINCT exam_id) FROM schedule WHERE session_id = ?1",
            params![session_id],
            |row| row.get(0),
        )?;

        usize::try_from(count)
            .map_err(|_| StorageError::Corrupt(format!("negative exam count: {count}")))
    }
}

fn parse_datetime(row: &rusqlite::Row, idx: usize, format: &str) -> rusqlite::Result<NaiveDateTime> {
    let raw: String = row.get(idx)?;
    NaiveDateTime::parse_from_str(&raw, format).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Current UTC time truncated to the stored precision.
fn now_micros() -> NaiveDateTime {
    let now = Utc::now().naive_utc();
    now.with_nanosecond(now.nanosecond() / 1_000 * 1_000)
        .unwrap_or(now)
}
