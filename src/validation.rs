//! Input validation for exam scheduling and seating.
//!
//! Checks structural integrity before any constraint search begins.
//! Detects:
//! - Inverted date windows
//! - Empty course sets, duplicate or blank course codes, semester 0
//! - Empty seating rosters and students listed twice for one date
//! - Duplicate venue IDs, empty seat grids, malformed joined-row groups
//!
//! All problems are collected; nothing stops at the first error.

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use crate::error::{EngineError, Result};
use crate::models::{Course, DateWindow, SeatCandidate, Venue};

/// Validation result.
pub type ValidationResult = std::result::Result<(), Vec<ValidationError>>;

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
    /// Window end lies before its start.
    InvertedWindow,
    /// No courses were selected.
    EmptyCourseSet,
    /// Two entities share the same ID.
    DuplicateId,
    /// A course has a blank code.
    EmptyCode,
    /// Semester numbers start at 1.
    InvalidSemester,
    /// No enrolled students to schedule, or none to seat.
    EmptyRoster,
    /// A student appears more than once for the same date.
    DuplicateStudent,
    /// A venue has no rows or no columns.
    InvalidVenueLayout,
    /// A joined-row group is malformed.
    InvalidJoinedRows,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Lifts a validation result into the engine error type.
pub(crate) fn ensure_valid(result: ValidationResult) -> Result<()> {
    result.map_err(EngineError::InputValidation)
}

/// Validates the date window.
pub fn validate_window(window: &DateWindow) -> ValidationResult {
    if window.is_inverted() {
        return Err(vec![ValidationError::new(
            ValidationErrorKind::InvertedWindow,
            format!("Window ends ({}) before it starts ({})", window.end, window.start),
        )]);
    }
    Ok(())
}

/// Validates a course selection.
///
/// Checks:
/// 1. At least one course
/// 2. No blank codes
/// 3. No duplicate codes
/// 4. Semester ≥ 1
pub fn validate_courses(courses: &[Course]) -> ValidationResult {
    let mut errors = Vec::new();

    if courses.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyCourseSet,
            "No courses selected",
        ));
    }

    let mut codes = HashSet::new();
    for course in courses {
        if course.code.trim().is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyCode,
                "Course with blank code",
            ));
        } else if !codes.insert(course.code.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate course code: {}", course.code),
            ));
        }

        if course.semester == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidSemester,
                format!("Course '{}' has semester 0", course.code),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates everything a generation run consumes.
pub fn validate_generation_input(courses: &[Course], window: &DateWindow) -> ValidationResult {
    let mut errors = Vec::new();
    if let Err(e) = validate_window(window) {
        errors.extend(e);
    }
    if let Err(e) = validate_courses(courses) {
        errors.extend(e);
    }
    if !courses.is_empty() && courses.iter().all(|c| c.students.is_empty()) {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyRoster,
            "No enrolled students in the selected courses",
        ));
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates a seating request.
///
/// Checks:
/// 1. At least one candidate
/// 2. Each student appears once
/// 3. No duplicate venue IDs
/// 4. Every venue has at least one row and one column
/// 5. Joined groups have ≥ 2 rows, reference existing rows, and do not overlap
pub fn validate_seating_input(candidates: &[SeatCandidate], venues: &[Venue]) -> ValidationResult {
    let mut errors = Vec::new();

    if candidates.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyRoster,
            "No students to seat",
        ));
    }

    let mut students = HashSet::new();
    for c in candidates {
        if !students.insert(c.student_id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateStudent,
                format!("Student '{}' is listed more than once", c.student_id),
            ));
        }
    }

    let mut venue_ids = HashSet::new();
    for venue in venues {
        if !venue_ids.insert(venue.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate venue ID: {}", venue.id),
            ));
        }

        if venue.rows == 0 || venue.columns == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidVenueLayout,
                format!(
                    "Venue '{}' has an empty grid ({}x{})",
                    venue.id, venue.rows, venue.columns
                ),
            ));
        }

        errors.extend(check_joined_rows(venue));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_joined_rows(venue: &Venue) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen = BTreeSet::new();

    for group in &venue.joined_rows {
        let distinct: BTreeSet<usize> = group.iter().copied().collect();
        if distinct.len() < 2 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidJoinedRows,
                format!("Venue '{}' has a joined group with fewer than two rows", venue.id),
            ));
        }
        for &row in &distinct {
            if row == 0 || row > venue.rows {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidJoinedRows,
                    format!("Venue '{}' joins missing row {}", venue.id, row),
                ));
            }
            if !seen.insert(row) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidJoinedRows,
                    format!("Venue '{}' row {} belongs to two joined groups", venue.id, row),
                ));
            }
        }
    }

    errors
}
