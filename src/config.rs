//! Run configuration.
//!
//! Mirrors the per-owner settings record the surrounding application keeps
//! (seat gap and the two per-day knobs) and adds the engine's own tuning
//! values. Field names serialize in camelCase so a stored settings document
//! can be loaded as-is.

use serde::{Deserialize, Serialize};

/// Weight applied per exam a cohort already has on a candidate day.
pub const DAY_USAGE_PENALTY: f64 = 10_000.0;

/// Default upper bound (exclusive) of the score tie-break noise.
pub const TIE_BREAK_NOISE: f64 = 50.0;

/// Default occupancy below which the auditor reports a slot.
pub const LOW_UTILIZATION_THRESHOLD: f64 = 0.9;

/// Configuration consumed by [`crate::scheduler::ExamScheduler`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SchedulerConfig {
    /// Empty seats left between two candidates.
    pub seat_gap: u32,
    /// Maximum exams per cohort per day. Carried but not enforced.
    pub max_exams_per_day: u32,
    /// Maximum back-to-back exams per cohort. Carried but not enforced.
    pub max_consecutive_exams: u32,
    /// RNG seed for tie-breaking. `None` draws from OS entropy.
    pub seed: Option<u64>,
    /// Upper bound (exclusive) of the score noise. `0` disables noise.
    pub tie_break_noise: f64,
    /// Eviction budget for the repair pass. `None` = exams left unplaced
    /// by the primary pass.
    pub max_evictions: Option<usize>,
    /// Occupancy ratio under which a slot is logged as under-used.
    pub low_utilization_threshold: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            seat_gap: 0,
            max_exams_per_day: 2,
            max_consecutive_exams: 2,
            seed: None,
            tie_break_noise: TIE_BREAK_NOISE,
            max_evictions: None,
            low_utilization_threshold: LOW_UTILIZATION_THRESHOLD,
        }
    }
}

impl SchedulerConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a configuration from JSON. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Sets the seating gap.
    pub fn with_seat_gap(mut self, gap: u32) -> Self {
        self.seat_gap = gap;
        self
    }

    /// Sets the max-exams-per-day knob.
    pub fn with_max_exams_per_day(mut self, max: u32) -> Self {
        self.max_exams_per_day = max;
        self
    }

    /// Sets the max-consecutive-exams knob.
    pub fn with_max_consecutive_exams(mut self, max: u32) -> Self {
        self.max_consecutive_exams = max;
        self
    }

    /// Fixes the RNG seed so identical inputs yield identical schedules.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the tie-break noise amplitude (negative values clamp to 0).
    pub fn with_tie_break_noise(mut self, noise: f64) -> Self {
        self.tie_break_noise = noise.max(0.0);
        self
    }

    /// Caps the number of evictions in the repair pass.
    pub fn with_max_evictions(mut self, max: usize) -> Self {
        self.max_evictions = Some(max);
        self
    }

    /// Sets the under-use reporting threshold (clamped to 0.0..=1.0).
    pub fn with_low_utilization_threshold(mut self, threshold: f64) -> Self {
        self.low_utilization_threshold = threshold.clamp(0.0, 1.0);
        self
    }
}
