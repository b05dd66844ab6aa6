//! Session drafts: the placement ledger grouped for persistence.
//!
//! Every exam occurrence becomes one time slot carrying the window's clock
//! times on the committed date, shared by all rooms the exam uses. Room and
//! cohort details are copied from the request so that stored rows can be
//! read back for reporting without the original input.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::{Cohort, Exam, Placement, Room};

/// A room as recorded on a schedule row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomDraft {
    pub id: String,
    pub name: String,
    pub location: Option<String>,
}

impl From<&Room> for RoomDraft {
    fn from(room: &Room) -> Self {
        Self {
            id: room.id.clone(),
            name: room.name.clone(),
            location: room.location.clone(),
        }
    }
}

/// One exam occurrence to persist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlotDraft {
    /// The exam.
    pub exam_id: String,
    /// Subject title of the exam.
    pub subject_title: String,
    /// Cohort sitting the exam.
    pub cohort: Cohort,
    /// Window start on the committed date.
    pub start: NaiveDateTime,
    /// Window end on the committed date.
    pub end: NaiveDateTime,
    /// Rooms used, primary room first.
    pub rooms: Vec<RoomDraft>,
}

impl TimeSlotDraft {
    /// Ids of the rooms used, primary room first.
    pub fn room_ids(&self) -> impl Iterator<Item = &str> {
        self.rooms.iter().map(|r| r.id.as_str())
    }
}

/// Everything one run writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDraft {
    /// Human-readable session name.
    pub name: String,
    /// Owning tenant or user.
    pub owner_id: String,
    /// One entry per placed exam, in first-placement order.
    pub slots: Vec<TimeSlotDraft>,
}

impl SessionDraft {
    /// Groups a placement ledger by exam.
    ///
    /// `exams` and `rooms` are the run's input; a placement referring to an
    /// id missing from them is still written, with the details it carries.
    pub fn from_placements(
        name: impl Into<String>,
        owner_id: impl Into<String>,
        placements: &[Placement],
        exams: &[Exam],
        rooms: &[Room],
    ) -> Self {
        let exams_by_id: HashMap<&str, &Exam> = exams.iter().map(|e| (e.id.as_str(), e)).collect();
        let rooms_by_id: HashMap<&str, &Room> = rooms.iter().map(|r| (r.id.as_str(), r)).collect();

        let room_draft = |room_id: &str| match rooms_by_id.get(room_id) {
            Some(room) => RoomDraft::from(*room),
            None => {
                warn!(room = %room_id, "placement refers to an unknown room");
                RoomDraft {
                    id: room_id.to_string(),
                    name: String::new(),
                    location: None,
                }
            }
        };

        let mut slots: Vec<TimeSlotDraft> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();

        for p in placements {
            match index.get(p.exam_id.as_str()) {
                Some(&i) => slots[i].rooms.push(room_draft(&p.room_id)),
                None => {
                    let window = p.slot.time_window();
                    let (subject_title, cohort) = match exams_by_id.get(p.exam_id.as_str()) {
                        Some(exam) => (exam.subject.title.clone(), exam.cohort().clone()),
                        None => {
                            warn!(exam = %p.exam_id, "placement refers to an unknown exam");
                            (String::new(), Cohort::new(p.cohort_id.as_str(), 0))
                        }
                    };
                    index.insert(&p.exam_id, slots.len());
                    slots.push(TimeSlotDraft {
                        exam_id: p.exam_id.clone(),
                        subject_title,
                        cohort,
                        start: window.start_on(p.slot.date),
                        end: window.end_on(p.slot.date),
                        rooms: vec![room_draft(&p.room_id)],
                    });
                }
            }
        }

        Self {
            name: name.into(),
            owner_id: owner_id.into(),
            slots,
        }
    }

    /// Number of distinct exams in the draft.
    pub fn exam_count(&self) -> usize {
        self.slots.len()
    }

    /// Number of schedule rows the draft produces (one per room).
    pub fn schedule_row_count(&self) -> usize {
        self.slots.iter().map(|s| s.rooms.len()).sum()
    }
}
