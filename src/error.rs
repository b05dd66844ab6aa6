//! Error types.
//!
//! Constraint infeasibility is not an error: an exam that cannot be placed
//! is simply absent from the result. Errors cover malformed input and
//! storage failures, the latter aborting the whole run.

use thiserror::Error;

use crate::validation::ValidationError;

/// Errors raised by the persistence layer.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("connection lock poisoned: {0}")]
    Lock(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error("corrupt stored value: {0}")]
    Corrupt(String),
}

/// Errors raised by a scheduling run.
#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("invalid input: {} problem(s), first: {}", .0.len(), first_message(.0))]
    InvalidInput(Vec<ValidationError>),

    #[error("invalid date: {0}")]
    InvalidDate(String),

    #[error("failed to persist session: {0}")]
    Storage(#[from] StorageError),
}

fn first_message(errors: &[ValidationError]) -> &str {
    errors.first().map(|e| e.message.as_str()).unwrap_or("")
}

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Result alias for scheduling runs.
pub type ScheduleResult<T> = Result<T, ScheduleError>;
