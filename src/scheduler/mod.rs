//! Exam allocation engine.
//!
//! Places exams onto a day × window × room grid and persists the result.
//!
//! # Algorithm
//!
//! `ExamScheduler` runs a greedy, score-driven primary pass followed by a
//! bounded repair pass:
//!
//! - [`PlacementEvaluator`] lists feasible room sets for one (exam, slot),
//!   splitting a cohort across rooms when no single room seats it.
//! - [`Scorer`] ranks slots by waste plus a per-day repetition penalty, with
//!   seeded noise to separate ties.
//! - [`PrimaryPlacement`] commits each exam to its best slot.
//! - [`RetryEngine`] retries the leftovers in enumeration order and may
//!   evict one smaller exam per slot to make room.
//! - [`UtilizationReport`] audits room occupancy afterwards.
//!
//! All booking state lives in one [`BookingRegistry`] per run. The engine is
//! a heuristic; it does not search for an optimal assignment.
//!
//! # References
//!
//! - Carter, Laporte & Lee (1996), "Examination Timetabling: Algorithmic
//!   Strategies and Applications"
//! - Burke & Newall (1999), "A Multistage Evolutionary Algorithm for the
//!   Timetable Problem"

mod audit;
mod booking;
mod evaluator;
mod exam_scheduler;
mod primary;
mod retry;
mod scoring;

pub use audit::UtilizationReport;
pub use booking::BookingRegistry;
pub use evaluator::{best_option, PlacementEvaluator, PlacementOption, MAX_SPLIT_OFFSETS};
pub use exam_scheduler::{ExamScheduler, PlanOutcome, RunSummary, ScheduleRequest};
pub use primary::PrimaryPlacement;
pub use retry::{RetryEngine, RetryOutcome, RetryStep};
pub use scoring::{best_candidate, Scorer, SlotCandidate};
