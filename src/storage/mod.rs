//! Session persistence.
//!
//! A run's final ledger is written as one planning session: a session row,
//! one time-slot row per exam occurrence, and one schedule row per room used.
//! Writes are all-or-nothing.
//!
//! [`SessionStore`] is the seam between the engine and storage;
//! [`SqliteSessionStore`] implements it on `rusqlite`.

mod sqlite;
mod writer;

pub use sqlite::{SqliteSessionStore, BUSY_TIMEOUT_MS};
pub use writer::{RoomDraft, SessionDraft, TimeSlotDraft};

use std::collections::HashSet;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::StorageResult;

/// A persisted planning session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Session identifier (UUID v4).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Owning tenant or user.
    pub owner_id: String,
    /// Creation time (UTC).
    pub created_at: NaiveDateTime,
}

/// One persisted schedule row joined with its time slot.
///
/// Room and cohort details are stored with the row, so reports can group by
/// exam, room, cohort or window from this record alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub schedule_id: String,
    pub exam_id: String,
    pub subject_title: String,
    pub room_id: String,
    pub room_name: String,
    pub room_location: Option<String>,
    pub cohort_id: String,
    pub cohort_size: u32,
    pub cohort_major: String,
    pub cohort_level: String,
    pub time_slot_id: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub session_id: String,
}

/// Storage for planning sessions.
pub trait SessionStore {
    /// Persists a draft atomically; on error nothing is written.
    fn save_session(&self, draft: &SessionDraft) -> StorageResult<SessionRecord>;

    /// Sessions newest first, optionally restricted to one owner.
    fn list_sessions(&self, owner_id: Option<&str>) -> StorageResult<Vec<SessionRecord>>;

    /// Schedule rows of a session ordered by start time.
    fn session_schedule(&self, session_id: &str) -> StorageResult<Vec<ScheduleRow>>;

    /// The newest session, if any.
    fn latest_session(&self, owner_id: Option<&str>) -> StorageResult<Option<SessionRecord>> {
        Ok(self.list_sessions(owner_id)?.into_iter().next())
    }

    /// Distinct exams with at least one schedule row in the session.
    fn placed_exam_count(&self, session_id: &str) -> StorageResult<usize> {
        let rows = self.session_schedule(session_id)?;
        Ok(rows
            .iter()
            .map(|r| r.exam_id.as_str())
            .collect::<HashSet<_>>()
            .len())
    }
}
