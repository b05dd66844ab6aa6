//! Placement model.
//!
//! A placement records that an exam occupies one room in one slot. An exam
//! split across rooms has one placement per room, all sharing the same slot;
//! the first room of the chosen option is flagged as the primary room.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::SlotKey;

/// One room occupied by one exam in one slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    /// Placed exam.
    pub exam_id: String,
    /// Cohort sitting the exam (denormalized for conflict queries).
    pub cohort_id: String,
    /// Occupied room.
    pub room_id: String,
    /// Day and window.
    pub slot: SlotKey,
    /// Whether this is the first room of the exam's room set.
    pub is_primary_room: bool,
}

impl Placement {
    /// Creates a placement.
    pub fn new(
        exam_id: impl Into<String>,
        cohort_id: impl Into<String>,
        room_id: impl Into<String>,
        slot: SlotKey,
        is_primary_room: bool,
    ) -> Self {
        Self {
            exam_id: exam_id.into(),
            cohort_id: cohort_id.into(),
            room_id: room_id.into(),
            slot,
            is_primary_room,
        }
    }

    /// Calendar day of the placement.
    #[inline]
    pub fn date(&self) -> NaiveDate {
        self.slot.date
    }

    /// Window index of the placement.
    #[inline]
    pub fn window(&self) -> usize {
        self.slot.window
    }
}
