//! Booking state for one allocation run.
//!
//! The registry owns every booking made during a run together with the
//! placement ledger, so the conflict sets and the ledger can never drift
//! apart. It is created empty per run and dropped (or persisted) at the end.
//!
//! # Invariants
//! After every [`BookingRegistry::commit`] / [`BookingRegistry::evict`]:
//! - a cohort holds at most one booking per slot;
//! - a room holds at most one exam per slot;
//! - the ledger rows of a slot agree with its room bookings.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;

use super::evaluator::PlacementOption;
use crate::models::{Exam, Placement, Room, SlotKey};

/// Per-run booking sets plus the placement ledger.
#[derive(Debug, Clone, Default)]
pub struct BookingRegistry {
    /// slot → cohorts sitting an exam in it.
    cohort_slots: HashMap<SlotKey, HashSet<String>>,
    /// slot → rooms occupied in it.
    room_slots: HashMap<SlotKey, HashSet<String>>,
    /// slot → rooms ever touched in it (selection bias only).
    slot_room_usage: HashMap<SlotKey, HashSet<String>>,
    /// cohort → day → exams already placed that day.
    cohort_day_usage: HashMap<String, HashMap<NaiveDate, u32>>,
    placements: Vec<Placement>,
}

impl BookingRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the cohort already sits an exam in this slot.
    pub fn is_cohort_booked(&self, cohort_id: &str, slot: SlotKey) -> bool {
        self.cohort_slots
            .get(&slot)
            .is_some_and(|cohorts| cohorts.contains(cohort_id))
    }

    /// Whether the room already hosts an exam in this slot.
    pub fn is_room_booked(&self, room_id: &str, slot: SlotKey) -> bool {
        self.room_slots
            .get(&slot)
            .is_some_and(|booked| booked.contains(room_id))
    }

    /// Exams the cohort already has on this day.
    pub fn day_usage(&self, cohort_id: &str, date: NaiveDate) -> u32 {
        self.cohort_day_usage
            .get(cohort_id)
            .and_then(|days| days.get(&date))
            .copied()
            .unwrap_or(0)
    }

    /// Rooms free in this slot, untouched rooms first, otherwise in input order.
    pub fn available_rooms<'r>(&self, rooms: &'r [Room], slot: SlotKey) -> Vec<&'r Room> {
        self.available_rooms_ignoring(rooms, slot, None)
    }

    /// Like [`Self::available_rooms`], but rooms held by `ignored_exam` in
    /// this slot count as free. Used to test an eviction before doing it.
    pub fn available_rooms_ignoring<'r>(
        &self,
        rooms: &'r [Room],
        slot: SlotKey,
        ignored_exam: Option<&str>,
    ) -> Vec<&'r Room> {
        let released: HashSet<&str> = match ignored_exam {
            Some(exam_id) => self
                .placements_in(slot)
                .filter(|p| p.exam_id == exam_id)
                .map(|p| p.room_id.as_str())
                .collect(),
            None => HashSet::new(),
        };

        let free = rooms
            .iter()
            .filter(|r| !self.is_room_booked(&r.id, slot) || released.contains(r.id.as_str()));

        let touched = self.slot_room_usage.get(&slot);
        let (untouched, used): (Vec<&Room>, Vec<&Room>) =
            free.partition(|r| touched.map_or(true, |t| !t.contains(&r.id)));

        untouched.into_iter().chain(used).collect()
    }

    /// Records `exam` in `slot` using the rooms of `option`.
    ///
    /// The caller guarantees that the cohort and every room are free in
    /// `slot`; this is checked in debug builds.
    pub fn commit(&mut self, exam: &Exam, slot: SlotKey, option: &PlacementOption) {
        debug_assert!(!self.is_cohort_booked(exam.cohort_id(), slot));

        for (i, room_id) in option.room_ids().iter().enumerate() {
            debug_assert!(!self.is_room_booked(room_id, slot));

            self.placements.push(Placement::new(
                &exam.id,
                exam.cohort_id(),
                room_id,
                slot,
                i == 0,
            ));
            self.room_slots
                .entry(slot)
                .or_default()
                .insert(room_id.clone());
            self.slot_room_usage
                .entry(slot)
                .or_default()
                .insert(room_id.clone());
        }

        self.cohort_slots
            .entry(slot)
            .or_default()
            .insert(exam.cohort_id().to_string());
        *self
            .cohort_day_usage
            .entry(exam.cohort_id().to_string())
            .or_default()
            .entry(slot.date)
            .or_insert(0) += 1;
    }

    /// Removes every placement of an exam and releases its bookings.
    ///
    /// Returns the removed rows (empty if the exam was not placed). Room
    /// usage marks are kept: the rooms were touched in that slot.
    pub fn evict(&mut self, exam_id: &str) -> Vec<Placement> {
        let (removed, kept): (Vec<Placement>, Vec<Placement>) = std::mem::take(&mut self.placements)
            .into_iter()
            .partition(|p| p.exam_id == exam_id);
        self.placements = kept;

        for p in &removed {
            if let Some(booked) = self.room_slots.get_mut(&p.slot) {
                booked.remove(&p.room_id);
            }
        }

        if let Some(first) = removed.first() {
            if let Some(cohorts) = self.cohort_slots.get_mut(&first.slot) {
                cohorts.remove(&first.cohort_id);
            }
            if let Some(count) = self
                .cohort_day_usage
                .get_mut(&first.cohort_id)
                .and_then(|days| days.get_mut(&first.slot.date))
            {
                *count = count.saturating_sub(1);
            }
        }

        removed
    }

    /// Ledger rows in commit order.
    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    /// Consumes the registry, returning the ledger.
    pub fn into_placements(self) -> Vec<Placement> {
        self.placements
    }

    /// Ledger rows in one slot.
    pub fn placements_in(&self, slot: SlotKey) -> impl Iterator<Item = &Placement> + '_ {
        self.placements.iter().filter(move |p| p.slot == slot)
    }

    /// Distinct exams in one slot, in ledger order.
    pub fn exam_ids_in(&self, slot: SlotKey) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.placements_in(slot)
            .map(|p| p.exam_id.as_str())
            .filter(|id| seen.insert(*id))
            .collect()
    }

    /// Rooms occupied in one slot.
    pub fn rooms_used(&self, slot: SlotKey) -> usize {
        self.room_slots.get(&slot).map_or(0, HashSet::len)
    }

    /// Whether the exam has at least one placement.
    pub fn is_placed(&self, exam_id: &str) -> bool {
        self.placements.iter().any(|p| p.exam_id == exam_id)
    }

    /// Number of distinct placed exams.
    pub fn placed_exam_count(&self) -> usize {
        self.placements
            .iter()
            .map(|p| p.exam_id.as_str())
            .collect::<HashSet<_>>()
            .len()
    }
}
