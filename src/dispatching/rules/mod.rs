//! Built-in ordering rules.
//!
//! # Categories
//!
//! - **Structural**: SEMESTER
//! - **Graph**: CONFLICTS
//! - **Size**: ENROLLMENT, GAP
//!
//! # Score Convention
//! All rules return lower scores for courses that should be placed first.

use super::{OrderingContext, OrderingRule, RuleScore};
use crate::models::Course;

/// Lower semesters first.
///
/// Keeps each semester's exams contiguous in the placement order, so the
/// first course visited per semester becomes its first paper.
#[derive(Debug, Clone, Copy)]
pub struct SemesterAscending;

impl OrderingRule for SemesterAscending {
    fn name(&self) -> &'static str {
        "SEMESTER"
    }

    fn evaluate(&self, course: &Course, _context: &OrderingContext) -> RuleScore {
        course.semester as f64
    }

    fn description(&self) -> &'static str {
        "Semester Ascending"
    }
}

/// Largest conflict degree first.
///
/// Courses sharing students with many others have the fewest feasible
/// dates; placing them early reduces backtracking.
///
/// # Reference
/// Carter et al. (1996), "largest degree" heuristic.
#[derive(Debug, Clone, Copy)]
pub struct MostConflicts;

impl OrderingRule for MostConflicts {
    fn name(&self) -> &'static str {
        "CONFLICTS"
    }

    fn evaluate(&self, course: &Course, context: &OrderingContext) -> RuleScore {
        -(context.degree(&course.code) as f64)
    }

    fn description(&self) -> &'static str {
        "Most Conflicts"
    }
}

/// Largest enrollment first.
#[derive(Debug, Clone, Copy)]
pub struct LargestEnrollment;

impl OrderingRule for LargestEnrollment {
    fn name(&self) -> &'static str {
        "ENROLLMENT"
    }

    fn evaluate(&self, course: &Course, _context: &OrderingContext) -> RuleScore {
        -(course.student_count() as f64)
    }

    fn description(&self) -> &'static str {
        "Largest Enrollment"
    }
}

/// Widest required gap first.
#[derive(Debug, Clone, Copy)]
pub struct TightestGap;

impl OrderingRule for TightestGap {
    fn name(&self) -> &'static str {
        "GAP"
    }

    fn evaluate(&self, course: &Course, _context: &OrderingContext) -> RuleScore {
        -(course.gap_days as f64)
    }

    fn description(&self) -> &'static str {
        "Widest Gap Requirement"
    }
}
