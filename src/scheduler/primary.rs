//! Primary placement pass.
//!
//! # Algorithm
//!
//! For each exam, in priority order:
//! 1. For every slot where the cohort is free, evaluate placement options
//!    over the free rooms and score the slot if any option exists.
//! 2. Take the lowest-scored slot.
//! 3. Re-evaluate that slot and commit its minimum-waste option.
//! 4. If no slot is feasible, defer the exam to the repair pass.
//!
//! # Complexity
//! O(n · s · r log r) where n = exams, s = slots, r = rooms.

use rand::Rng;
use tracing::debug;

use super::booking::BookingRegistry;
use super::evaluator::PlacementEvaluator;
use super::scoring::{best_candidate, Scorer, SlotCandidate};
use crate::models::{Exam, Room, SlotGrid, SlotKey};

/// Greedy best-slot placement.
#[derive(Debug, Clone, Copy)]
pub struct PrimaryPlacement<'a> {
    grid: &'a SlotGrid,
    rooms: &'a [Room],
    evaluator: PlacementEvaluator,
    scorer: Scorer,
}

impl<'a> PrimaryPlacement<'a> {
    /// Creates the pass over a grid and room set.
    pub fn new(
        grid: &'a SlotGrid,
        rooms: &'a [Room],
        evaluator: PlacementEvaluator,
        scorer: Scorer,
    ) -> Self {
        Self {
            grid,
            rooms,
            evaluator,
            scorer,
        }
    }

    /// Places exams in the given order; returns those left unplaced.
    pub fn run<'e, R: Rng + ?Sized>(
        &self,
        exams: &[&'e Exam],
        registry: &mut BookingRegistry,
        rng: &mut R,
    ) -> Vec<&'e Exam> {
        let mut unplaced = Vec::new();

        for &exam in exams {
            match self.place(exam, registry, rng) {
                Some(slot) => debug!(
                    exam = %exam.id,
                    date = %slot.date,
                    window = slot.window,
                    "placed"
                ),
                None => {
                    debug!(exam = %exam.id, "no feasible slot, deferred to repair");
                    unplaced.push(exam);
                }
            }
        }

        unplaced
    }

    /// Places one exam at its best-scored slot.
    pub fn place<R: Rng + ?Sized>(
        &self,
        exam: &Exam,
        registry: &mut BookingRegistry,
        rng: &mut R,
    ) -> Option<SlotKey> {
        let candidates = self.candidates(exam, registry, rng);
        let best = best_candidate(&candidates)?;

        if try_commit(&self.evaluator, self.rooms, exam, best.slot, registry) {
            Some(best.slot)
        } else {
            None
        }
    }

    /// Scores every feasible slot for an exam, in enumeration order.
    pub fn candidates<R: Rng + ?Sized>(
        &self,
        exam: &Exam,
        registry: &BookingRegistry,
        rng: &mut R,
    ) -> Vec<SlotCandidate> {
        let mut candidates = Vec::new();

        for slot in self.grid.slots() {
            if registry.is_cohort_booked(exam.cohort_id(), slot) {
                continue;
            }

            let free = registry.available_rooms(self.rooms, slot);
            let Some(best) = self
                .evaluator
                .best(exam.cohort_size(), &free, exam.duration_minutes)
            else {
                continue;
            };

            let usage = registry.day_usage(exam.cohort_id(), slot.date);
            candidates.push(self.scorer.candidate(slot, best.waste(), usage, rng));
        }

        candidates
    }
}

/// Evaluates `slot` afresh and commits the minimum-waste option.
///
/// Returns `false` (and leaves the registry untouched) if nothing fits.
pub(crate) fn try_commit(
    evaluator: &PlacementEvaluator,
    rooms: &[Room],
    exam: &Exam,
    slot: SlotKey,
    registry: &mut BookingRegistry,
) -> bool {
    if registry.is_cohort_booked(exam.cohort_id(), slot) {
        return false;
    }

    let free = registry.available_rooms(rooms, slot);
    match evaluator.best(exam.cohort_size(), &free, exam.duration_minutes) {
        Some(option) => {
            registry.commit(exam, slot, &option);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Cohort;
    use chrono::NaiveDate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    fn exam(id: &str, cohort: &str, size: u32, duration: u32) -> Exam {
        Exam::for_cohort(id, Cohort::new(cohort, size), duration)
    }

    #[test]
    fn test_single_exam_split_placement() {
        let grid = SlotGrid::new(date(2), date(2));
        let rooms = vec![Room::new("R30", 30), Room::new("R40", 40)];
        let pass = PrimaryPlacement::new(&grid, &rooms, PlacementEvaluator::new(0), Scorer::new(0.0));
        let mut reg = BookingRegistry::new();
        let mut rng = StdRng::seed_from_u64(1);

        let e = exam("E1", "C1", 50, 90);
        let unplaced = pass.run(&[&e], &mut reg, &mut rng);

        assert!(unplaced.is_empty());
        let rows = reg.placements();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].room_id, "R40");
        assert!(rows[0].is_primary_room);
        assert_eq!(rows[1].room_id, "R30");
        assert_eq!(rows[0].slot, rows[1].slot);
    }

    #[test]
    fn test_overlong_exam_deferred() {
        let grid = SlotGrid::new(date(2), date(6));
        let rooms = vec![Room::new("R1", 500)];
        let pass = PrimaryPlacement::new(&grid, &rooms, PlacementEvaluator::new(0), Scorer::default());
        let mut reg = BookingRegistry::new();
        let mut rng = StdRng::seed_from_u64(1);

        let e = exam("E1", "C1", 10, 150);
        let unplaced = pass.run(&[&e], &mut reg, &mut rng);

        assert_eq!(unplaced.len(), 1);
        assert!(reg.placements().is_empty());
    }

    #[test]
    fn test_same_cohort_distinct_windows() {
        let grid = SlotGrid::new(date(2), date(2));
        let rooms = vec![Room::new("R1", 100), Room::new("R2", 100)];
        let pass = PrimaryPlacement::new(&grid, &rooms, PlacementEvaluator::new(0), Scorer::default());
        let mut reg = BookingRegistry::new();
        let mut rng = StdRng::seed_from_u64(7);

        let a = exam("A", "C1", 40, 120);
        let b = exam("B", "C1", 40, 120);
        let unplaced = pass.run(&[&a, &b], &mut reg, &mut rng);

        assert!(unplaced.is_empty());
        let windows: Vec<usize> = reg.placements().iter().map(|p| p.window()).collect();
        assert_eq!(windows.len(), 2);
        assert_ne!(windows[0], windows[1]);
    }

    #[test]
    fn test_minimum_waste_slot_chosen_without_noise() {
        let grid = SlotGrid::new(date(2), date(2));
        let rooms = vec![Room::new("big", 100), Room::new("fit", 25)];
        let pass = PrimaryPlacement::new(&grid, &rooms, PlacementEvaluator::new(0), Scorer::new(0.0));
        let mut reg = BookingRegistry::new();
        let mut rng = StdRng::seed_from_u64(0);

        let e = exam("E1", "C1", 25, 60);
        let slot = pass.place(&e, &mut reg, &mut rng).unwrap();

        // Every window ties at waste 0 → the first enumerated wins.
        assert_eq!(slot, SlotKey::new(date(2), 0));
        assert_eq!(reg.placements()[0].room_id, "fit");
    }

    #[test]
    fn test_spreads_cohort_across_days() {
        let grid = SlotGrid::new(date(2), date(6));
        let rooms = vec![Room::new("R1", 200), Room::new("R2", 200)];
        let pass = PrimaryPlacement::new(&grid, &rooms, PlacementEvaluator::new(0), Scorer::default());
        let mut reg = BookingRegistry::new();
        let mut rng = StdRng::seed_from_u64(11);

        let exams = [
            exam("E1", "C1", 60, 90),
            exam("E2", "C1", 60, 90),
            exam("E3", "C1", 60, 90),
        ];
        let refs: Vec<&Exam> = exams.iter().collect();
        assert!(pass.run(&refs, &mut reg, &mut rng).is_empty());

        let mut days: Vec<NaiveDate> = reg.placements().iter().map(|p| p.date()).collect();
        days.sort();
        days.dedup();
        assert_eq!(days.len(), 3);
    }

    #[test]
    fn test_candidates_skip_booked_cohort_slots() {
        let grid = SlotGrid::new(date(2), date(2));
        let rooms = vec![Room::new("R1", 50)];
        let pass = PrimaryPlacement::new(&grid, &rooms, PlacementEvaluator::new(0), Scorer::new(0.0));
        let mut reg = BookingRegistry::new();
        let mut rng = StdRng::seed_from_u64(0);

        let first = exam("E1", "C1", 10, 60);
        pass.place(&first, &mut reg, &mut rng).unwrap();

        let second = exam("E2", "C1", 10, 60);
        let cands = pass.candidates(&second, &reg, &mut rng);
        assert_eq!(cands.len(), 4);
        assert!(cands.iter().all(|c| c.slot.window != 0));
        // Same day already used once → penalty applied everywhere.
        assert!(cands.iter().all(|c| c.score >= 10_000.0));
    }

    #[test]
    fn test_try_commit_rejects_when_nothing_fits() {
        let rooms = vec![Room::new("R1", 10)];
        let mut reg = BookingRegistry::new();
        let e = exam("E1", "C1", 11, 60);
        assert!(!try_commit(
            &PlacementEvaluator::new(0),
            &rooms,
            &e,
            SlotKey::new(date(2), 0),
            &mut reg
        ));
        assert!(reg.placements().is_empty());
    }
}
