//! Rule engine for multi-criteria exam ordering.
//!
//! Applies rules in sequence (later rules only break ties of earlier ones),
//! then a final tie-breaking strategy.

use std::cmp::Ordering;
use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;

use super::rules::{LargestCohort, LongestDuration};
use super::DispatchingRule;
use crate::models::Exam;

/// How ties are broken after all rules are exhausted.
#[derive(Debug, Clone, Default)]
pub enum TieBreaker {
    /// Keep input order.
    #[default]
    Stable,
    /// Random order among equals, drawn from the caller's RNG.
    Shuffled,
}

/// A composable rule engine for exam prioritization.
///
/// # Example
/// ```
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
/// use u_examplan::dispatching::RuleEngine;
/// use u_examplan::models::{Cohort, Exam};
///
/// let exams = vec![
///     Exam::for_cohort("small", Cohort::new("C1", 20), 60),
///     Exam::for_cohort("big", Cohort::new("C2", 200), 60),
/// ];
/// let mut rng = StdRng::seed_from_u64(1);
/// let order = RuleEngine::exam_difficulty().sort_indices(&exams, &mut rng);
/// assert_eq!(exams[order[0]].id, "big");
/// ```
#[derive(Clone)]
pub struct RuleEngine {
    rules: Vec<Arc<dyn DispatchingRule>>,
    tie_breaker: TieBreaker,
    epsilon: f64,
}

impl RuleEngine {
    /// Creates an empty rule engine.
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            tie_breaker: TieBreaker::Stable,
            epsilon: 1e-9,
        }
    }

    /// Default difficulty ordering: cohort size descending, then duration
    /// descending, then random among equals.
    pub fn exam_difficulty() -> Self {
        Self::new()
            .with_rule(LargestCohort)
            .with_tie_breaker(LongestDuration)
            .with_final_tie_breaker(TieBreaker::Shuffled)
    }

    /// Adds a primary rule.
    pub fn with_rule<R: DispatchingRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    /// Adds a rule consulted only when all earlier rules tie.
    pub fn with_tie_breaker<R: DispatchingRule + 'static>(self, rule: R) -> Self {
        self.with_rule(rule)
    }

    /// Sets the final tie-breaking strategy.
    pub fn with_final_tie_breaker(mut self, tie_breaker: TieBreaker) -> Self {
        self.tie_breaker = tie_breaker;
        self
    }

    /// Orders exams (highest priority first).
    ///
    /// Returns indices into the given slice. `rng` is only drawn from
    /// when the final tie-breaker is [`TieBreaker::Shuffled`].
    pub fn sort_indices<R: Rng + ?Sized>(&self, exams: &[Exam], rng: &mut R) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..exams.len()).collect();

        // Shuffle first, then stable-sort: equal keys keep the shuffled order.
        if matches!(self.tie_breaker, TieBreaker::Shuffled) {
            indices.shuffle(rng);
        }

        indices.sort_by(|&a, &b| self.compare(&exams[a], &exams[b]));
        indices
    }

    /// Returns exams in priority order.
    pub fn sort<'a, R: Rng + ?Sized>(&self, exams: &'a [Exam], rng: &mut R) -> Vec<&'a Exam> {
        self.sort_indices(exams, rng)
            .into_iter()
            .map(|i| &exams[i])
            .collect()
    }

    fn compare(&self, a: &Exam, b: &Exam) -> Ordering {
        for rule in &self.rules {
            let score_a = rule.evaluate(a);
            let score_b = rule.evaluate(b);

            if (score_a - score_b).abs() > self.epsilon {
                return score_a.partial_cmp(&score_b).unwrap_or(Ordering::Equal);
            }
        }
        Ordering::Equal
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::exam_difficulty()
    }
}

impl std::fmt::Debug for RuleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleEngine")
            .field(
                "rules",
                &self.rules.iter().map(|r| r.name()).collect::<Vec<_>>(),
            )
            .field("tie_breaker", &self.tie_breaker)
            .finish()
    }
}
