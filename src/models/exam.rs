//! Exam, subject, and cohort models.
//!
//! An exam is the unit being placed. It belongs to a subject, which in turn
//! belongs to a cohort: the group of people sitting the exam together. Only
//! the exam duration and the cohort's id and head-count drive allocation;
//! the remaining fields are carried through for reporting.

use serde::{Deserialize, Serialize};

/// A fixed-size group of people who can sit at most one exam per window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cohort {
    /// Unique cohort identifier.
    pub id: String,
    /// Head-count.
    pub size: u32,
    /// Programme label (reporting only).
    pub major: String,
    /// Year/level label (reporting only).
    pub level: String,
}

/// A subject taught to a single cohort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    /// Unique subject identifier.
    pub id: String,
    /// Human-readable title.
    pub title: String,
    /// Cohort taking this subject.
    pub cohort: Cohort,
}

/// An exam to be placed on the day × window × room grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exam {
    /// Unique exam identifier.
    pub id: String,
    /// Length of the sitting in minutes.
    pub duration_minutes: u32,
    /// Free-form event type (written, practical, resit, ...).
    pub exam_type: String,
    /// Subject (and through it, the cohort).
    pub subject: Subject,
}

impl Cohort {
    /// Creates a cohort with the given head-count.
    pub fn new(id: impl Into<String>, size: u32) -> Self {
        Self {
            id: id.into(),
            size,
            major: String::new(),
            level: String::new(),
        }
    }

    /// Sets the programme label.
    pub fn with_major(mut self, major: impl Into<String>) -> Self {
        self.major = major.into();
        self
    }

    /// Sets the level label.
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }
}

impl Subject {
    /// Creates a subject for a cohort.
    pub fn new(id: impl Into<String>, cohort: Cohort) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            cohort,
        }
    }

    /// Sets the subject title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

impl Exam {
    /// Creates an exam for a subject.
    pub fn new(id: impl Into<String>, subject: Subject, duration_minutes: u32) -> Self {
        Self {
            id: id.into(),
            duration_minutes,
            exam_type: String::new(),
            subject,
        }
    }

    /// Shorthand for an exam whose subject id mirrors the exam id.
    pub fn for_cohort(id: impl Into<String>, cohort: Cohort, duration_minutes: u32) -> Self {
        let id = id.into();
        let subject = Subject::new(format!("{id}-subject"), cohort);
        Self::new(id, subject, duration_minutes)
    }

    /// Sets the event type.
    pub fn with_type(mut self, exam_type: impl Into<String>) -> Self {
        self.exam_type = exam_type.into();
        self
    }

    /// The cohort sitting this exam.
    #[inline]
    pub fn cohort(&self) -> &Cohort {
        &self.subject.cohort
    }

    /// Cohort identifier.
    #[inline]
    pub fn cohort_id(&self) -> &str {
        &self.subject.cohort.id
    }

    /// Cohort head-count.
    #[inline]
    pub fn cohort_size(&self) -> u32 {
        self.subject.cohort.size
    }
}
