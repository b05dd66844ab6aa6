//! Placement option evaluation.
//!
//! For one (exam, slot) pair, lists the room sets that can seat the cohort
//! and how much effective capacity each wastes.
//!
//! # Algorithm
//!
//! 1. Exams longer than a window have no options.
//! 2. **Single room**: every room whose effective capacity covers the
//!    cohort, ascending by effective capacity.
//! 3. **Split** (only if step 2 found nothing): rooms sorted by effective
//!    capacity descending; from each of the first [`MAX_SPLIT_OFFSETS`]
//!    start positions, greedily take rooms until the cohort is covered.
//!    The lowest-waste accumulation is the split option.
//!
//! # Complexity
//! O(r log r) per call, r = candidate rooms.

use crate::models::{Room, WINDOW_MINUTES};

/// Number of start offsets tried when splitting a cohort across rooms.
pub const MAX_SPLIT_OFFSETS: usize = 5;

/// A feasible room set for one exam in one slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlacementOption {
    /// The whole cohort fits in one room.
    Single {
        /// The room.
        room_id: String,
        /// Effective capacity left empty.
        waste: u32,
    },
    /// The cohort is spread over several rooms, largest first.
    Split {
        /// Rooms in accumulation order; the first is the primary room.
        room_ids: Vec<String>,
        /// Effective capacity left empty.
        waste: u32,
    },
}

impl PlacementOption {
    /// Effective seats left empty by this option.
    pub fn waste(&self) -> u32 {
        match self {
            Self::Single { waste, .. } | Self::Split { waste, .. } => *waste,
        }
    }

    /// Rooms used, primary room first.
    pub fn room_ids(&self) -> &[String] {
        match self {
            Self::Single { room_id, .. } => std::slice::from_ref(room_id),
            Self::Split { room_ids, .. } => room_ids,
        }
    }

    /// Whether the exam spans more than one room.
    pub fn is_split(&self) -> bool {
        matches!(self, Self::Split { .. })
    }
}

/// Computes placement options under a fixed seating gap.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlacementEvaluator {
    seat_gap: u32,
}

impl PlacementEvaluator {
    /// Creates an evaluator for the given seating gap.
    pub fn new(seat_gap: u32) -> Self {
        Self { seat_gap }
    }

    /// The seating gap in use.
    pub fn seat_gap(&self) -> u32 {
        self.seat_gap
    }

    /// Lists feasible options for a cohort over the given free rooms.
    ///
    /// `rooms` order matters only for ties: among equal effective
    /// capacities, earlier rooms are preferred.
    pub fn options(
        &self,
        cohort_size: u32,
        rooms: &[&Room],
        duration_minutes: u32,
    ) -> Vec<PlacementOption> {
        if duration_minutes > WINDOW_MINUTES {
            return Vec::new();
        }

        let gap = self.seat_gap;
        let mut singles: Vec<&Room> = rooms
            .iter()
            .copied()
            .filter(|r| r.effective_capacity(gap) >= cohort_size)
            .collect();

        if !singles.is_empty() {
            singles.sort_by_key(|r| r.effective_capacity(gap));
            return singles
                .into_iter()
                .map(|r| PlacementOption::Single {
                    room_id: r.id.clone(),
                    waste: r.effective_capacity(gap) - cohort_size,
                })
                .collect();
        }

        self.best_split(cohort_size, rooms).into_iter().collect()
    }

    /// Convenience: the minimum-waste option, if any.
    pub fn best(
        &self,
        cohort_size: u32,
        rooms: &[&Room],
        duration_minutes: u32,
    ) -> Option<PlacementOption> {
        best_option(self.options(cohort_size, rooms, duration_minutes))
    }

    fn best_split(&self, cohort_size: u32, rooms: &[&Room]) -> Option<PlacementOption> {
        let gap = self.seat_gap;
        let mut sorted: Vec<&Room> = rooms.to_vec();
        sorted.sort_by_key(|r| std::cmp::Reverse(r.effective_capacity(gap)));

        let target = u64::from(cohort_size);
        let mut best: Option<(u64, Vec<&Room>)> = None;

        for start in 0..sorted.len().min(MAX_SPLIT_OFFSETS) {
            let mut total = 0u64;
            let mut combination = Vec::new();

            for room in &sorted[start..] {
                if total >= target {
                    break;
                }
                let effective = room.effective_capacity(gap);
                if effective > 0 {
                    combination.push(*room);
                    total += u64::from(effective);
                }
            }

            if total < target || combination.is_empty() {
                continue;
            }
            let waste = total - target;
            if best.as_ref().map_or(true, |(w, _)| waste < *w) {
                best = Some((waste, combination));
            }
        }

        best.map(|(waste, combination)| PlacementOption::Split {
            room_ids: combination.iter().map(|r| r.id.clone()).collect(),
            waste: u32::try_from(waste).unwrap_or(u32::MAX),
        })
    }
}

/// Picks the minimum-waste option; the first one found wins ties.
pub fn best_option(options: Vec<PlacementOption>) -> Option<PlacementOption> {
    options.into_iter().min_by_key(PlacementOption::waste)
}
