//! Built-in prioritization rules.
//!
//! # Categories
//!
//! - **Cohort-based**: LARGEST_COHORT
//! - **Duration-based**: LONGEST_DURATION
//!
//! # Score Convention
//! All rules return lower scores for exams that should be attempted first.

use super::{DispatchingRule, RuleScore};
use crate::models::Exam;

/// Largest cohort first.
///
/// Large cohorts need the biggest rooms or multi-room splits, which run out
/// first; this is the dominant key of the default ordering.
#[derive(Debug, Clone, Copy)]
pub struct LargestCohort;

impl DispatchingRule for LargestCohort {
    fn name(&self) -> &'static str {
        "LARGEST_COHORT"
    }

    fn evaluate(&self, exam: &Exam) -> RuleScore {
        -f64::from(exam.cohort_size())
    }

    fn description(&self) -> &'static str {
        "Largest Cohort First"
    }
}

/// Longest sitting first.
#[derive(Debug, Clone, Copy)]
pub struct LongestDuration;

impl DispatchingRule for LongestDuration {
    fn name(&self) -> &'static str {
        "LONGEST_DURATION"
    }

    fn evaluate(&self, exam: &Exam) -> RuleScore {
        -f64::from(exam.duration_minutes)
    }

    fn description(&self) -> &'static str {
        "Longest Duration First"
    }
}
