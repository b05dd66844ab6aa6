//! Candidate slot scoring.
//!
//! `score = waste + day_usage × DAY_USAGE_PENALTY + noise`
//!
//! The day-usage term dominates waste as soon as the cohort already has an
//! exam on the candidate day, which spreads a cohort's exams across days.
//! The noise term (uniform in `[0, noise)`) only separates otherwise equal
//! candidates so the first enumerated day is not always chosen; it is drawn
//! from the run's RNG and is therefore reproducible under a fixed seed.
//!
//! Lower score wins.

use rand::Rng;

use crate::config::{DAY_USAGE_PENALTY, TIE_BREAK_NOISE};
use crate::models::SlotKey;

/// A scored feasible slot for one exam.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotCandidate {
    /// The slot.
    pub slot: SlotKey,
    /// Waste of the best option in that slot.
    pub waste: u32,
    /// Final score (lower = better).
    pub score: f64,
}

/// Turns (waste, day usage) into a comparable score.
#[derive(Debug, Clone, Copy)]
pub struct Scorer {
    noise: f64,
}

impl Scorer {
    /// Creates a scorer with the given noise amplitude (`0` = no noise).
    pub fn new(noise: f64) -> Self {
        Self {
            noise: if noise.is_finite() { noise.max(0.0) } else { 0.0 },
        }
    }

    /// Scores a candidate.
    pub fn score<R: Rng + ?Sized>(&self, waste: u32, day_usage: u32, rng: &mut R) -> f64 {
        let noise = if self.noise > 0.0 {
            rng.random_range(0.0..self.noise)
        } else {
            0.0
        };
        f64::from(waste) + f64::from(day_usage) * DAY_USAGE_PENALTY + noise
    }

    /// Builds a scored candidate.
    pub fn candidate<R: Rng + ?Sized>(
        &self,
        slot: SlotKey,
        waste: u32,
        day_usage: u32,
        rng: &mut R,
    ) -> SlotCandidate {
        SlotCandidate {
            slot,
            waste,
            score: self.score(waste, day_usage, rng),
        }
    }
}

impl Default for Scorer {
    fn default() -> Self {
        Self::new(TIE_BREAK_NOISE)
    }
}

/// Lowest-score candidate; the earliest one wins exact ties.
pub fn best_candidate(candidates: &[SlotCandidate]) -> Option<SlotCandidate> {
    candidates.iter().copied().fold(None, |best, c| match best {
        Some(b) if b.score <= c.score => Some(b),
        _ => Some(c),
    })
}
