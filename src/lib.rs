//! Exam allocation engine.
//!
//! Assigns exams, each sat by one cohort, onto a grid of calendar days ×
//! five fixed 120-minute daily windows × rooms, then persists the result as
//! a planning session.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Exam`, `Cohort`, `Room`, `SlotGrid`,
//!   `SlotKey`, `Placement`
//! - **`dispatching`**: Rule engine ordering exams by scheduling difficulty
//! - **`scheduler`**: Evaluator, scorer, primary and repair passes, audit,
//!   and the `ExamScheduler` run orchestration
//! - **`storage`**: `SessionStore` and its SQLite implementation
//! - **`validation`**: Input integrity checks (duplicate IDs, cohort sizes)
//! - **`config`**: `SchedulerConfig` (serde)
//! - **`error`**: `ScheduleError`, `StorageError`
//! - **`logging`**: `tracing-subscriber` setup
//!
//! # Guarantees
//!
//! For every run:
//! - a cohort sits at most one exam per (day, window);
//! - a room hosts at most one exam per (day, window);
//! - every placed exam has enough effective seats across its rooms;
//! - an exam longer than a window is never placed.
//!
//! Infeasibility is not an error: such exams are reported as unplaced.

pub mod config;
pub mod dispatching;
pub mod error;
pub mod logging;
pub mod models;
pub mod scheduler;
pub mod storage;
pub mod validation;

pub use config::SchedulerConfig;
pub use error::{ScheduleError, StorageError};
pub use scheduler::{ExamScheduler, RunSummary, ScheduleRequest};
pub use storage::{SessionStore, SqliteSessionStore};
