//! Run orchestration.
//!
//! # Algorithm
//!
//! 1. Validate exams and rooms.
//! 2. Build the day × window grid for the requested range.
//! 3. Order exams by difficulty (cohort size, then duration, then seeded
//!    shuffle among equals).
//! 4. Primary pass: best-scored slot per exam.
//! 5. Repair pass: enumeration-order retry with bounded eviction.
//! 6. Audit room utilization (diagnostics only).
//! 7. Persist the ledger as one session.
//!
//! Steps 1-6 are pure ([`ExamScheduler::plan`]); step 7 goes through a
//! [`SessionStore`] ([`ExamScheduler::run`]) and is all-or-nothing.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use super::audit::UtilizationReport;
use super::booking::BookingRegistry;
use super::evaluator::PlacementEvaluator;
use super::primary::PrimaryPlacement;
use super::retry::RetryEngine;
use super::scoring::Scorer;
use crate::config::SchedulerConfig;
use crate::dispatching::RuleEngine;
use crate::error::{ScheduleError, ScheduleResult};
use crate::models::{Exam, Placement, Room, SlotGrid};
use crate::storage::{SessionDraft, SessionStore};
use crate::validation::validate_input;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Input container for one allocation run.
#[derive(Debug, Clone)]
pub struct ScheduleRequest {
    /// Exams to place.
    pub exams: Vec<Exam>,
    /// Rooms available in every window.
    pub rooms: Vec<Room>,
    /// First day (inclusive).
    pub start_date: NaiveDate,
    /// Last day (inclusive).
    pub end_date: NaiveDate,
    /// Name given to the persisted session.
    pub session_name: String,
    /// Owner the session is recorded under.
    pub owner_id: String,
}

impl ScheduleRequest {
    /// Creates a request over an inclusive date range.
    pub fn new(exams: Vec<Exam>, rooms: Vec<Room>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            exams,
            rooms,
            start_date,
            end_date,
            session_name: format!("Session {start_date} - {end_date}"),
            owner_id: String::new(),
        }
    }

    /// Creates a request from `YYYY-MM-DD` dates.
    pub fn from_date_strings(
        exams: Vec<Exam>,
        rooms: Vec<Room>,
        start_date: &str,
        end_date: &str,
    ) -> ScheduleResult<Self> {
        Ok(Self::new(
            exams,
            rooms,
            parse_date(start_date)?,
            parse_date(end_date)?,
        ))
    }

    /// Sets the session name.
    pub fn with_session_name(mut self, name: impl Into<String>) -> Self {
        self.session_name = name.into();
        self
    }

    /// Sets the owner.
    pub fn with_owner(mut self, owner_id: impl Into<String>) -> Self {
        self.owner_id = owner_id.into();
        self
    }
}

fn parse_date(raw: &str) -> ScheduleResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| ScheduleError::InvalidDate(raw.to_string()))
}

/// Result of the in-memory part of a run.
#[derive(Debug, Clone)]
pub struct PlanOutcome {
    /// Final ledger, one row per (exam, room).
    pub placements: Vec<Placement>,
    /// Exams left without a placement.
    pub unplaced: Vec<String>,
    /// Room occupancy per slot.
    pub utilization: UtilizationReport,
    /// Evictions performed by the repair pass.
    pub evictions: usize,
    /// Exams in the request.
    pub total_exams: usize,
}

impl PlanOutcome {
    /// Distinct exams with at least one placement.
    pub fn placed_exam_count(&self) -> usize {
        self.placements
            .iter()
            .map(|p| p.exam_id.as_str())
            .collect::<HashSet<_>>()
            .len()
    }
}

/// What a completed run reports back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub total_exams: usize,
    pub placed_exams: usize,
    pub unplaced_exams: usize,
    pub session_id: String,
    /// `"{YYYY-MM-DD}-{HH:MM}"` → fraction of rooms occupied.
    pub room_utilization: BTreeMap<String, f64>,
}

/// The exam allocation engine.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use u_examplan::config::SchedulerConfig;
/// use u_examplan::models::{Cohort, Exam, Room};
/// use u_examplan::scheduler::{ExamScheduler, ScheduleRequest};
///
/// let day = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
/// let request = ScheduleRequest::new(
///     vec![Exam::for_cohort("E1", Cohort::new("C1", 50), 90)],
///     vec![Room::new("R1", 30), Room::new("R2", 40)],
///     day,
///     day,
/// );
///
/// let outcome = ExamScheduler::new(SchedulerConfig::new().with_seed(7))
///     .plan(&request)
///     .unwrap();
/// assert_eq!(outcome.placed_exam_count(), 1);
/// assert_eq!(outcome.placements.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct ExamScheduler {
    config: SchedulerConfig,
    rule_engine: RuleEngine,
}

impl ExamScheduler {
    /// Creates a scheduler with the default difficulty ordering.
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            rule_engine: RuleEngine::exam_difficulty(),
        }
    }

    /// Replaces the exam ordering.
    pub fn with_rule_engine(mut self, engine: RuleEngine) -> Self {
        self.rule_engine = engine;
        self
    }

    /// The configuration in use.
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Runs every stage except persistence.
    pub fn plan(&self, request: &ScheduleRequest) -> ScheduleResult<PlanOutcome> {
        validate_input(&request.exams, &request.rooms).map_err(ScheduleError::InvalidInput)?;

        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let grid = SlotGrid::new(request.start_date, request.end_date);
        info!(
            exams = request.exams.len(),
            rooms = request.rooms.len(),
            days = grid.days().len(),
            seat_gap = self.config.seat_gap,
            "planning run started"
        );
        debug!(
            max_exams_per_day = self.config.max_exams_per_day,
            max_consecutive_exams = self.config.max_consecutive_exams,
            "per-day limits are not enforced"
        );

        let order = self.rule_engine.sort(&request.exams, &mut rng);
        let evaluator = PlacementEvaluator::new(self.config.seat_gap);
        let scorer = Scorer::new(self.config.tie_break_noise);
        let mut registry = BookingRegistry::new();

        let deferred = PrimaryPlacement::new(&grid, &request.rooms, evaluator, scorer)
            .run(&order, &mut registry, &mut rng);
        debug!(deferred = deferred.len(), "primary pass finished");

        let repair = RetryEngine::new(&grid, &request.rooms, evaluator)
            .with_max_evictions(self.config.max_evictions)
            .run(deferred, &request.exams, &mut registry);

        let utilization = UtilizationReport::from_registry(&grid, &registry, request.rooms.len());
        utilization.log_low_utilization(self.config.low_utilization_threshold);

        let outcome = PlanOutcome {
            placements: registry.into_placements(),
            unplaced: repair.still_unplaced,
            utilization,
            evictions: repair.evictions,
            total_exams: request.exams.len(),
        };

        info!(
            placed = outcome.placed_exam_count(),
            unplaced = outcome.unplaced.len(),
            evictions = outcome.evictions,
            average_utilization = outcome.utilization.average(),
            "planning run finished"
        );
        Ok(outcome)
    }

    /// Plans and persists one session.
    ///
    /// On storage failure nothing is persisted and the error is returned.
    pub fn run<S: SessionStore + ?Sized>(
        &self,
        request: &ScheduleRequest,
        store: &S,
    ) -> ScheduleResult<RunSummary> {
        let outcome = self.plan(request)?;
        let draft = SessionDraft::from_placements(
            request.session_name.as_str(),
            request.owner_id.as_str(),
            &outcome.placements,
            &request.exams,
            &request.rooms,
        );

        let session = store.save_session(&draft).map_err(|e| {
            error!(error = %e, "failed to persist session");
            ScheduleError::from(e)
        })?;

        Ok(RunSummary {
            total_exams: outcome.total_exams,
            placed_exams: outcome.placed_exam_count(),
            unplaced_exams: outcome.unplaced.len(),
            session_id: session.id,
            room_utilization: outcome.utilization.to_label_map(),
        })
    }
}

impl Default for ExamScheduler {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{StorageError, StorageResult};
    use crate::logging;
    use crate::models::{Cohort, WINDOW_MINUTES};
    use crate::storage::{ScheduleRow, SessionRecord, SqliteSessionStore};
    use crate::validation::ValidationErrorKind;
    use rand::Rng;
    use std::collections::HashMap;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    fn exam(id: &str, cohort: &str, size: u32, duration: u32) -> Exam {
        Exam::for_cohort(id, Cohort::new(cohort, size), duration)
    }

    fn seeded(seed: u64) -> ExamScheduler {
        ExamScheduler::new(SchedulerConfig::new().with_seed(seed))
    }

    /// Checks the four placement invariants.
    fn assert_invariants(request: &ScheduleRequest, gap: u32, outcome: &PlanOutcome) {
        let exams: HashMap<&str, &Exam> =
            request.exams.iter().map(|e| (e.id.as_str(), e)).collect();
        let rooms: HashMap<&str, &Room> =
            request.rooms.iter().map(|r| (r.id.as_str(), r)).collect();

        let mut cohort_slots = HashMap::new();
        let mut room_slots = HashMap::new();
        let mut seats: HashMap<&str, u64> = HashMap::new();

        for p in &outcome.placements {
            if let Some(other) = cohort_slots.insert((p.cohort_id.as_str(), p.slot), p.exam_id.as_str()) {
                assert_eq!(other, p.exam_id, "cohort double-booked in {:?}", p.slot);
            }
            if let Some(other) = room_slots.insert((p.room_id.as_str(), p.slot), p.exam_id.as_str()) {
                panic!("room {} shared by {other} and {} in {:?}", p.room_id, p.exam_id, p.slot);
            }
            *seats.entry(p.exam_id.as_str()).or_default() +=
                u64::from(rooms[p.room_id.as_str()].effective_capacity(gap));
        }

        for (exam_id, total) in seats {
            let exam = exams[exam_id];
            assert!(total >= u64::from(exam.cohort_size()), "{exam_id} under-seated");
            assert!(exam.duration_minutes <= WINDOW_MINUTES, "{exam_id} too long");
        }

        assert_eq!(
            outcome.placed_exam_count() + outcome.unplaced.len(),
            outcome.total_exams
        );
    }

    #[test]
    fn test_invariants_on_random_inputs() {
        logging::init_test();

        for seed in 0..20u64 {
            let mut input_rng = StdRng::seed_from_u64(seed);
            let gap = input_rng.random_range(0..3);

            let cohorts: Vec<Cohort> = (0..8)
                .map(|i| Cohort::new(format!("C{i}"), input_rng.random_range(5..150)))
                .collect();
            let exams: Vec<Exam> = (0..30)
                .map(|i| {
                    let cohort = cohorts[input_rng.random_range(0..cohorts.len())].clone();
                    let duration = [60, 90, 120, 150][input_rng.random_range(0..4)];
                    Exam::for_cohort(format!("E{i}"), cohort, duration)
                })
                .collect();
            let rooms: Vec<Room> = (0..6)
                .map(|i| Room::new(format!("R{i}"), input_rng.random_range(15..120)))
                .collect();

            let request = ScheduleRequest::new(exams, rooms, date(2), date(4));
            let scheduler =
                ExamScheduler::new(SchedulerConfig::new().with_seed(seed).with_seat_gap(gap));
            let outcome = scheduler.plan(&request).unwrap();

            assert_invariants(&request, gap, &outcome);
        }
    }

    #[test]
    fn test_split_exam_across_two_rooms() {
        let request = ScheduleRequest::new(
            vec![exam("E1", "C1", 50, 90)],
            vec![Room::new("R30", 30), Room::new("R40", 40)],
            date(2),
            date(2),
        );
        let outcome = seeded(1).plan(&request).unwrap();

        assert_eq!(outcome.placements.len(), 2);
        assert!(outcome.unplaced.is_empty());
        let seats: u32 = outcome
            .placements
            .iter()
            .map(|p| if p.room_id == "R30" { 30 } else { 40 })
            .sum();
        assert_eq!(seats - 50, 20);
        assert_eq!(outcome.placements[0].slot, outcome.placements[1].slot);
        assert_eq!(outcome.placements.iter().filter(|p| p.is_primary_room).count(), 1);
    }

    #[test]
    fn test_overlong_exam_leaves_no_rows() {
        let store = SqliteSessionStore::open_in_memory().unwrap();
        let request = ScheduleRequest::new(
            vec![exam("LONG", "C1", 10, 150)],
            vec![Room::new("R1", 500), Room::new("R2", 500)],
            date(2),
            date(6),
        )
        .with_session_name("long")
        .with_owner("owner-1");

        let summary = seeded(3).run(&request, &store).unwrap();

        assert_eq!(summary.total_exams, 1);
        assert_eq!(summary.placed_exams, 0);
        assert_eq!(summary.unplaced_exams, 1);
        let rows = store.session_schedule(&summary.session_id).unwrap();
        assert!(rows.iter().all(|r| r.exam_id != "LONG"));
        assert!(rows.is_empty());
    }

    #[test]
    fn test_same_cohort_gets_distinct_windows() {
        let request = ScheduleRequest::new(
            vec![exam("A", "C1", 40, 120), exam("B", "C1", 40, 90)],
            vec![Room::new("R1", 100), Room::new("R2", 100)],
            date(2),
            date(2),
        );

        for seed in 0..10 {
            let outcome = seeded(seed).plan(&request).unwrap();
            assert_eq!(outcome.placed_exam_count(), 2);
            let a = outcome.placements.iter().find(|p| p.exam_id == "A").unwrap();
            let b = outcome.placements.iter().find(|p| p.exam_id == "B").unwrap();
            assert_eq!(a.slot.date, b.slot.date);
            assert_ne!(a.slot.window, b.slot.window);
        }
    }

    #[test]
    fn test_cohort_exams_spread_over_days() {
        let request = ScheduleRequest::new(
            vec![
                exam("E1", "C1", 60, 90),
                exam("E2", "C1", 60, 90),
                exam("E3", "C1", 60, 90),
            ],
            vec![Room::new("R1", 200), Room::new("R2", 200), Room::new("R3", 200)],
            date(2),
            date(6),
        );

        for seed in 0..10 {
            let outcome = seeded(seed).plan(&request).unwrap();
            let days: HashSet<NaiveDate> = outcome.placements.iter().map(|p| p.date()).collect();
            assert_eq!(days.len(), 3, "seed {seed}");
        }
    }

    #[test]
    fn test_same_seed_same_schedule() {
        let exams: Vec<Exam> = (0..15)
            .map(|i| exam(&format!("E{i}"), &format!("C{}", i % 5), 30, 90))
            .collect();
        let rooms = vec![Room::new("R1", 40), Room::new("R2", 60), Room::new("R3", 35)];
        let request = ScheduleRequest::new(exams, rooms, date(2), date(5));

        let a = seeded(99).plan(&request).unwrap();
        let b = seeded(99).plan(&request).unwrap();
        assert_eq!(a.placements, b.placements);
        assert_eq!(a.unplaced, b.unplaced);
    }

    #[test]
    fn test_inverted_range_places_nothing() {
        let store = SqliteSessionStore::open_in_memory().unwrap();
        let request = ScheduleRequest::new(
            vec![exam("E1", "C1", 10, 60), exam("E2", "C2", 10, 60)],
            vec![Room::new("R1", 50)],
            date(6),
            date(2),
        );

        let summary = seeded(0).run(&request, &store).unwrap();
        assert_eq!(summary.placed_exams, 0);
        assert_eq!(summary.unplaced_exams, 2);
        assert!(summary.room_utilization.is_empty());
        assert_eq!(
            store.latest_session(None).unwrap().map(|s| s.id),
            Some(summary.session_id)
        );
    }

    #[test]
    fn test_no_rooms_reports_zero_utilization() {
        let request = ScheduleRequest::new(vec![exam("E1", "C1", 10, 60)], Vec::new(), date(2), date(2));
        let outcome = seeded(0).plan(&request).unwrap();
        assert_eq!(outcome.unplaced, vec!["E1".to_string()]);
        assert!(outcome.utilization.by_slot().values().all(|r| *r == 0.0));
    }

    #[test]
    fn test_run_persists_summary_counts() {
        let store = SqliteSessionStore::open_in_memory().unwrap();
        let request = ScheduleRequest::new(
            vec![
                exam("BIG", "C1", 90, 120),
                exam("MID", "C2", 40, 90),
                exam("LONG", "C3", 10, 180),
            ],
            vec![Room::new("R1", 50), Room::new("R2", 45), Room::new("R3", 20)],
            date(2),
            date(3),
        )
        .with_session_name("June finals")
        .with_owner("dept-1");

        let summary = seeded(5).run(&request, &store).unwrap();
        assert_eq!(summary.total_exams, 3);
        assert_eq!(summary.placed_exams, 2);
        assert_eq!(summary.unplaced_exams, 1);
        assert_eq!(summary.room_utilization.len(), 10);

        let session = store.latest_session(Some("dept-1")).unwrap().unwrap();
        assert_eq!(session.id, summary.session_id);
        assert_eq!(session.name, "June finals");
        assert_eq!(store.placed_exam_count(&session.id).unwrap(), 2);

        let rows = store.session_schedule(&session.id).unwrap();
        let big_rooms = rows.iter().filter(|r| r.exam_id == "BIG").count();
        assert_eq!(big_rooms, 2);
        let util_total: f64 = summary.room_utilization.values().sum();
        // Three occupied (room, slot) pairs over three rooms.
        assert!((util_total - rows.len() as f64 / 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_run_rows_carry_room_and_cohort() {
        let store = SqliteSessionStore::open_in_memory().unwrap();
        let cohort = Cohort::new("C1", 42).with_major("Chemistry").with_level("L3");
        let request = ScheduleRequest::new(
            vec![Exam::for_cohort("E1", cohort, 90)],
            vec![Room::new("R1", 60).with_name("Amphi A").with_location("Bldg 2")],
            date(2),
            date(2),
        );

        let summary = seeded(3).run(&request, &store).unwrap();
        let rows = store.session_schedule(&summary.session_id).unwrap();

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.room_name, "Amphi A");
        assert_eq!(row.room_location.as_deref(), Some("Bldg 2"));
        assert_eq!(row.cohort_id, "C1");
        assert_eq!(row.cohort_size, 42);
        assert_eq!(row.cohort_major, "Chemistry");
        assert_eq!(row.cohort_level, "L3");
        assert_eq!(row.end_time - row.start_time, chrono::Duration::minutes(120));
    }

    #[test]
    fn test_empty_cohort_is_scheduled() {
        let store = SqliteSessionStore::open_in_memory().unwrap();
        let request = ScheduleRequest::new(
            vec![exam("E0", "C0", 0, 60), exam("E1", "C1", 10, 60)],
            vec![Room::new("R1", 50)],
            date(2),
            date(2),
        );

        let summary = seeded(1).run(&request, &store).unwrap();
        assert_eq!(summary.placed_exams, 2);
        assert_eq!(summary.unplaced_exams, 0);
        assert_eq!(store.list_sessions(None).unwrap().len(), 1);

        let rows = store.session_schedule(&summary.session_id).unwrap();
        assert!(rows.iter().any(|r| r.exam_id == "E0" && r.cohort_size == 0));
    }

    #[test]
    fn test_summary_serializes_camel_case() {
        let summary = RunSummary {
            total_exams: 2,
            placed_exams: 1,
            unplaced_exams: 1,
            session_id: "s".into(),
            room_utilization: BTreeMap::from([("2025-06-02-08:00".to_string(), 0.5)]),
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["placedExams"], 1);
        assert_eq!(json["sessionId"], "s");
        assert_eq!(json["roomUtilization"]["2025-06-02-08:00"], 0.5);
    }

    struct FailingStore;

    impl SessionStore for FailingStore {
        fn save_session(&self, _draft: &SessionDraft) -> StorageResult<SessionRecord> {
            Err(StorageError::Lock("unavailable".into()))
        }

        fn list_sessions(&self, _owner_id: Option<&str>) -> StorageResult<Vec<SessionRecord>> {
            Ok(Vec::new())
        }

        fn session_schedule(&self, session_id: &str) -> StorageResult<Vec<ScheduleRow>> {
            Err(StorageError::NotFound {
                entity: "planning_session".into(),
                id: session_id.into(),
            })
        }
    }

    #[test]
    fn test_storage_failure_aborts_run() {
        let request = ScheduleRequest::new(
            vec![exam("E1", "C1", 10, 60)],
            vec![Room::new("R1", 50)],
            date(2),
            date(2),
        );
        let err = seeded(0).run(&request, &FailingStore).unwrap_err();
        assert!(matches!(err, ScheduleError::Storage(StorageError::Lock(_))));
    }

    #[test]
    fn test_invalid_input_rejected() {
        let request = ScheduleRequest::new(
            vec![exam("E1", "C1", 10, 60), exam("E1", "C2", 10, 60)],
            vec![Room::new("R1", 50)],
            date(2),
            date(2),
        );
        match seeded(0).plan(&request) {
            Err(ScheduleError::InvalidInput(errors)) => {
                assert!(errors.iter().any(|e| e.kind == ValidationErrorKind::DuplicateId));
            }
            other => panic!("expected invalid input, got {other:?}"),
        }
    }

    #[test]
    fn test_from_date_strings() {
        let request =
            ScheduleRequest::from_date_strings(Vec::new(), Vec::new(), "2025-06-02", "2025-06-06")
                .unwrap();
        assert_eq!(request.start_date, date(2));
        assert_eq!(request.end_date, date(6));

        let err = ScheduleRequest::from_date_strings(Vec::new(), Vec::new(), "06/02/2025", "2025-06-06")
            .unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidDate(ref s) if s == "06/02/2025"));
    }
}
