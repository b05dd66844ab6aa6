//! Exam prioritization rules and rule engine.
//!
//! Decides the order in which the primary pass attempts exams. Harder
//! exams (large cohorts, long sittings) go first: they have the fewest
//! feasible slots, and placing them early avoids dead ends later.
//!
//! # Usage
//!
//! ```
//! use u_examplan::dispatching::{RuleEngine, TieBreaker};
//! use u_examplan::dispatching::rules;
//!
//! let engine = RuleEngine::new()
//!     .with_rule(rules::LargestCohort)
//!     .with_tie_breaker(rules::LongestDuration)
//!     .with_final_tie_breaker(TieBreaker::Shuffled);
//! ```
//!
//! The ordering is a heuristic, not a correctness requirement: only the
//! dominant key (cohort size, descending) is part of the contract.

mod engine;
pub mod rules;

pub use engine::{RuleEngine, TieBreaker};

use crate::models::Exam;
use std::fmt::Debug;

/// Score returned by a dispatching rule.
///
/// Lower scores = higher priority (attempted first).
pub type RuleScore = f64;

/// A rule that scores how early an exam should be attempted.
///
/// # Score Convention
/// **Lower score = higher priority.**
pub trait DispatchingRule: Send + Sync + Debug {
    /// Rule name (e.g., "LARGEST_COHORT").
    fn name(&self) -> &'static str;

    /// Scores an exam; lower = attempted earlier.
    fn evaluate(&self, exam: &Exam) -> RuleScore;

    /// Rule description.
    fn description(&self) -> &'static str {
        self.name()
    }
}
