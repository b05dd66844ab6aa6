//! Repair pass with bounded eviction.
//!
//! # Algorithm
//!
//! Exams the primary pass could not place are processed from a FIFO
//! worklist. For each exam, slots are scanned in enumeration order:
//!
//! 1. If the free rooms of the slot hold enough raw seats for the cohort,
//!    try a normal placement; stop on success.
//! 2. Otherwise look at the placed exam with the smallest cohort in that
//!    slot. If it is strictly smaller and the eviction budget allows, check
//!    that its rooms would let the current exam fit; if so, evict it, place
//!    the current exam, and append the evicted exam to the worklist.
//! 3. An exam that reaches the end of the grid stays unplaced.
//!
//! Every eviction consumes one unit of budget, so the worklist receives at
//! most `initial + budget` entries and the pass always terminates.

use std::collections::{HashMap, VecDeque};

use tracing::{debug, warn};

use super::booking::BookingRegistry;
use super::evaluator::PlacementEvaluator;
use super::primary::try_commit;
use crate::models::{Exam, Room, SlotGrid, SlotKey, WINDOW_MINUTES};

/// Result of one repair attempt for a single exam.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryStep {
    /// Placed into free capacity.
    Placed(SlotKey),
    /// Placed after evicting a smaller exam from the slot.
    Displaced {
        /// Slot the exam now occupies.
        slot: SlotKey,
        /// The exam that was removed.
        evicted: String,
    },
    /// No slot worked.
    Exhausted,
}

/// Totals of a repair pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetryOutcome {
    /// Exams left without any placement, in the order they gave up.
    pub still_unplaced: Vec<String>,
    /// Number of evictions performed.
    pub evictions: usize,
    /// Number of worklist entries that ended up placed.
    pub placed: usize,
}

/// Worklist-driven repair engine.
#[derive(Debug, Clone, Copy)]
pub struct RetryEngine<'a> {
    grid: &'a SlotGrid,
    rooms: &'a [Room],
    evaluator: PlacementEvaluator,
    max_evictions: Option<usize>,
}

impl<'a> RetryEngine<'a> {
    /// Creates a repair engine over a grid and room set.
    pub fn new(grid: &'a SlotGrid, rooms: &'a [Room], evaluator: PlacementEvaluator) -> Self {
        Self {
            grid,
            rooms,
            evaluator,
            max_evictions: None,
        }
    }

    /// Caps the number of evictions. Defaults to the initial worklist size.
    pub fn with_max_evictions(mut self, max_evictions: Option<usize>) -> Self {
        self.max_evictions = max_evictions;
        self
    }

    /// Runs the repair pass.
    ///
    /// `exams` is the full exam list of the run; it resolves evicted exam
    /// ids back to exams.
    pub fn run(
        &self,
        unplaced: Vec<&Exam>,
        exams: &[Exam],
        registry: &mut BookingRegistry,
    ) -> RetryOutcome {
        let by_id: HashMap<&str, &Exam> = exams.iter().map(|e| (e.id.as_str(), e)).collect();
        let mut budget = self.max_evictions.unwrap_or(unplaced.len());
        let mut queue: VecDeque<&Exam> = unplaced.into();
        let mut outcome = RetryOutcome::default();

        while let Some(exam) = queue.pop_front() {
            match self.attempt(exam, &by_id, registry, budget > 0) {
                RetryStep::Placed(slot) => {
                    debug!(exam = %exam.id, date = %slot.date, window = slot.window, "repair placed");
                    outcome.placed += 1;
                }
                RetryStep::Displaced { slot, evicted } => {
                    debug!(
                        exam = %exam.id,
                        evicted = %evicted,
                        date = %slot.date,
                        window = slot.window,
                        "repair placed after eviction"
                    );
                    budget -= 1;
                    outcome.evictions += 1;
                    outcome.placed += 1;
                    if let Some(&victim) = by_id.get(evicted.as_str()) {
                        queue.push_back(victim);
                    }
                }
                RetryStep::Exhausted => {
                    warn!(
                        exam = %exam.id,
                        cohort = %exam.cohort_id(),
                        size = exam.cohort_size(),
                        duration = exam.duration_minutes,
                        "exam could not be placed"
                    );
                    outcome.still_unplaced.push(exam.id.clone());
                }
            }
        }

        outcome
    }

    /// One scan of the grid for a single exam.
    pub fn attempt(
        &self,
        exam: &Exam,
        by_id: &HashMap<&str, &Exam>,
        registry: &mut BookingRegistry,
        may_evict: bool,
    ) -> RetryStep {
        if exam.duration_minutes > WINDOW_MINUTES {
            return RetryStep::Exhausted;
        }

        let size = exam.cohort_size();

        for slot in self.grid.slots() {
            if registry.is_cohort_booked(exam.cohort_id(), slot) {
                continue;
            }

            let raw_free: u64 = registry
                .available_rooms(self.rooms, slot)
                .iter()
                .map(|r| u64::from(r.capacity))
                .sum();

            if raw_free >= u64::from(size) {
                if try_commit(&self.evaluator, self.rooms, exam, slot, registry) {
                    return RetryStep::Placed(slot);
                }
                continue;
            }

            if !may_evict {
                continue;
            }

            let Some(victim) = smallest_in_slot(registry, slot, by_id) else {
                continue;
            };
            if victim.cohort_size() >= size {
                continue;
            }

            let freed = registry.available_rooms_ignoring(self.rooms, slot, Some(&victim.id));
            let Some(option) = self.evaluator.best(size, &freed, exam.duration_minutes) else {
                continue;
            };

            registry.evict(&victim.id);
            registry.commit(exam, slot, &option);
            return RetryStep::Displaced {
                slot,
                evicted: victim.id.clone(),
            };
        }

        RetryStep::Exhausted
    }
}

/// Smallest-cohort exam placed in a slot; first in ledger order on ties.
fn smallest_in_slot<'e>(
    registry: &BookingRegistry,
    slot: SlotKey,
    by_id: &HashMap<&str, &'e Exam>,
) -> Option<&'e Exam> {
    registry
        .exam_ids_in(slot)
        .into_iter()
        .filter_map(|id| by_id.get(id).copied())
        .min_by_key(|e| e.cohort_size())
}
