//! Seat allocation models.
//!
//! A `SeatPlan` is the planner's answer for one exam date: a grid per venue,
//! the flat list of assignments, and the students that did not fit.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A student waiting to be seated for a course's exam.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SeatCandidate {
    /// Student ID (enrollment number).
    pub student_id: String,
    /// Course the student sits.
    pub course_code: String,
}

impl SeatCandidate {
    /// Creates a candidate.
    pub fn new(student_id: impl Into<String>, course_code: impl Into<String>) -> Self {
        Self {
            student_id: student_id.into(),
            course_code: course_code.into(),
        }
    }
}

/// A seated student.
///
/// `(venue_id, row, column, date)` and `(student_id, date)` are unique
/// within a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatAssignment {
    pub student_id: String,
    pub date: NaiveDate,
    pub course_code: String,
    pub venue_id: String,
    /// 1-based row.
    pub row: usize,
    /// 1-based column.
    pub column: usize,
    /// Row letter + column number, e.g. "A1".
    pub label: String,
}

/// Occupant of a grid cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatCell {
    pub student_id: String,
    pub course_code: String,
}

/// Seat map of one venue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueGrid {
    /// Venue this grid describes.
    pub venue_id: String,
    /// Number of rows.
    pub rows: usize,
    /// Seats per row.
    pub columns: usize,
    /// `cells[row - 1][column - 1]`.
    pub cells: Vec<Vec<Option<SeatCell>>>,
}

impl VenueGrid {
    /// Creates an empty grid.
    pub fn empty(venue_id: impl Into<String>, rows: usize, columns: usize) -> Self {
        Self {
            venue_id: venue_id.into(),
            rows,
            columns,
            cells: vec![vec![None; columns]; rows],
        }
    }

    /// Occupant of a 1-based seat.
    pub fn cell(&self, row: usize, column: usize) -> Option<&SeatCell> {
        self.cells
            .get(row.checked_sub(1)?)?
            .get(column.checked_sub(1)?)?
            .as_ref()
    }

    /// Number of occupied seats.
    pub fn occupied(&self) -> usize {
        self.cells
            .iter()
            .map(|r| r.iter().filter(|c| c.is_some()).count())
            .sum()
    }
}

/// Seating result for one exam date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatPlan {
    /// Exam date.
    pub date: NaiveDate,
    /// One grid per venue used, in catalog order.
    pub grids: Vec<VenueGrid>,
    /// Every seated student, in fill order.
    pub assignments: Vec<SeatAssignment>,
    /// Students beyond total capacity, in fill order.
    pub unassigned: Vec<SeatCandidate>,
}

impl SeatPlan {
    /// Whether every requested student received a seat.
    pub fn is_complete(&self) -> bool {
        self.unassigned.is_empty()
    }

    /// Number of seated students.
    pub fn assigned_count(&self) -> usize {
        self.assignments.len()
    }

    /// Seat of a student.
    pub fn assignment_for(&self, student_id: &str) -> Option<&SeatAssignment> {
        self.assignments.iter().find(|a| a.student_id == student_id)
    }

    /// Grid of a venue.
    pub fn grid_for(&self, venue_id: &str) -> Option<&VenueGrid> {
        self.grids.iter().find(|g| g.venue_id == venue_id)
    }
}
