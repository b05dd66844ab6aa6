//! Calendar grid: days in range × the fixed daily window catalog.
//!
//! Every day in a planning range offers the same five windows. A window is
//! identified inside the grid by its index into [`WINDOW_CATALOG`], and a
//! concrete placement slot by [`SlotKey`] (date + window index).
//!
//! # Enumeration order
//! [`SlotGrid::slots`] walks days in ascending order and, within a day,
//! windows in catalog order. The repair pass relies on this order.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Length of every window, and therefore the longest placeable exam.
pub const WINDOW_MINUTES: u32 = 120;

/// The static daily window catalog.
pub const WINDOW_CATALOG: [TimeWindow; 5] = [
    TimeWindow::from_clock(8, 0, 10, 0),
    TimeWindow::from_clock(10, 15, 12, 15),
    TimeWindow::from_clock(12, 30, 14, 30),
    TimeWindow::from_clock(14, 45, 16, 45),
    TimeWindow::from_clock(17, 0, 19, 0),
];

/// A daily time window [start, end), as minutes after midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Window start (minutes after midnight, inclusive).
    pub start_minute: u32,
    /// Window end (minutes after midnight, exclusive).
    pub end_minute: u32,
}

impl TimeWindow {
    /// Creates a window from clock times.
    pub const fn from_clock(start_h: u32, start_m: u32, end_h: u32, end_m: u32) -> Self {
        Self {
            start_minute: start_h * 60 + start_m,
            end_minute: end_h * 60 + end_m,
        }
    }

    /// Window length in minutes.
    #[inline]
    pub fn duration_minutes(&self) -> u32 {
        self.end_minute - self.start_minute
    }

    /// Start of this window on a given date.
    pub fn start_on(&self, date: NaiveDate) -> NaiveDateTime {
        at_minute(date, self.start_minute)
    }

    /// End of this window on a given date.
    pub fn end_on(&self, date: NaiveDate) -> NaiveDateTime {
        at_minute(date, self.end_minute)
    }

    /// Start time as `HH:MM`.
    pub fn label(&self) -> String {
        format!("{:02}:{:02}", self.start_minute / 60, self.start_minute % 60)
    }
}

fn at_minute(date: NaiveDate, minute: u32) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN) + Duration::minutes(i64::from(minute))
}

/// A concrete placement slot: one window on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotKey {
    /// Calendar day.
    pub date: NaiveDate,
    /// Index into [`WINDOW_CATALOG`].
    pub window: usize,
}

impl SlotKey {
    /// Creates a slot key.
    pub fn new(date: NaiveDate, window: usize) -> Self {
        Self { date, window }
    }

    /// The catalog window for this slot.
    ///
    /// Out-of-range indices clamp to the last window; keys produced by
    /// [`SlotGrid`] are always in range.
    pub fn time_window(&self) -> TimeWindow {
        WINDOW_CATALOG[self.window.min(WINDOW_CATALOG.len() - 1)]
    }
}

/// Candidate grid for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotGrid {
    days: Vec<NaiveDate>,
}

impl SlotGrid {
    /// Lists every calendar day from `start` to `end`, both inclusive.
    ///
    /// An inverted range yields an empty grid.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        let mut days = Vec::new();
        let mut current = Some(start);
        while let Some(day) = current {
            if day > end {
                break;
            }
            days.push(day);
            current = day.succ_opt();
        }
        Self { days }
    }

    /// Days in ascending order.
    pub fn days(&self) -> &[NaiveDate] {
        &self.days
    }

    /// The daily window catalog.
    pub fn windows(&self) -> &'static [TimeWindow] {
        &WINDOW_CATALOG
    }

    /// Whether the grid has no days.
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Number of slots (days × windows).
    pub fn slot_count(&self) -> usize {
        self.days.len() * WINDOW_CATALOG.len()
    }

    /// All slots, day-major then window-minor.
    pub fn slots(&self) -> impl Iterator<Item = SlotKey> + '_ {
        self.days
            .iter()
            .flat_map(|&date| (0..WINDOW_CATALOG.len()).map(move |w| SlotKey::new(date, w)))
    }
}
