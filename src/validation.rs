//! Input validation for allocation runs.
//!
//! Checks structural integrity of exams and rooms before scheduling.
//! Detects:
//! - Duplicate exam or room IDs
//! - One cohort ID carrying different head-counts across exams
//!
//! Over-long exams and oversized cohorts are *not* validation errors: they
//! are legitimate input that simply ends up unplaced. Empty cohorts are
//! scheduled like any other and only logged.

use crate::models::{Exam, Room};
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// The same cohort ID appears with different sizes.
    InconsistentCohort,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates the input data for an allocation run.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(exams: &[Exam], rooms: &[Room]) -> ValidationResult {
    let mut errors = Vec::new();

    let mut room_ids = HashSet::new();
    for r in rooms {
        if !room_ids.insert(r.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate room ID: {}", r.id),
            ));
        }
    }

    let mut exam_ids = HashSet::new();
    let mut cohort_sizes: HashMap<&str, u32> = HashMap::new();
    let mut reported_cohorts = HashSet::new();

    for exam in exams {
        if !exam_ids.insert(exam.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate exam ID: {}", exam.id),
            ));
        }

        let cohort = exam.cohort();
        match cohort_sizes.get(cohort.id.as_str()) {
            Some(&size) if size != cohort.size => {
                if reported_cohorts.insert(cohort.id.as_str()) {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::InconsistentCohort,
                        format!(
                            "Cohort '{}' has sizes {} and {} (exam '{}')",
                            cohort.id, size, cohort.size, exam.id
                        ),
                    ));
                }
            }
            Some(_) => {}
            None => {
                cohort_sizes.insert(&cohort.id, cohort.size);
                if cohort.size == 0 {
                    warn!(cohort = %cohort.id, exam = %exam.id, "cohort has no members");
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
