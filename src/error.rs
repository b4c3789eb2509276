//! Engine error types.
//!
//! Every public entry point returns [`Result`]. Input problems are reported
//! all at once before any search starts; infeasibility and rejected moves
//! carry enough detail for the caller to explain the outcome.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::scheduler::{ConstraintKind, Violation};
use crate::validation::ValidationError;

/// Engine result alias.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors raised by the scheduling and seating engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed or empty input, rejected before any search.
    #[error("input validation failed: {}", join_messages(.0))]
    InputValidation(Vec<ValidationError>),

    /// No complete schedule fits the window.
    #[error(transparent)]
    SchedulingInfeasible(#[from] Infeasibility),

    /// A manual move broke one or more constraints; the schedule is unchanged.
    #[error("move of {course} to {date} rejected: {}", join_messages(.violations))]
    ConstraintViolation {
        course: String,
        date: NaiveDate,
        violations: Vec<Violation>,
    },

    /// The referenced course is not part of the schedule or course set.
    #[error("unknown course: {0}")]
    UnknownCourse(String),

    /// Seating lifecycle step not allowed from the current state.
    #[error("cannot {action} seating for {date} while it is {state}")]
    InvalidSeatingTransition {
        date: NaiveDate,
        action: &'static str,
        state: &'static str,
    },

    /// Invalid engine configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Canonical serialization of the input failed.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Diagnostic for a failed generation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("course {course} cannot be placed: {constraint} blocked every candidate date")]
pub struct Infeasibility {
    /// Course that could not be placed.
    pub course: String,
    /// Constraint class that rejected the most candidate dates.
    pub constraint: ConstraintKind,
    /// Candidate dates rejected per constraint class.
    pub rejected: BTreeMap<ConstraintKind, usize>,
    /// Reassignments of earlier courses tried before giving up.
    pub backtracks: usize,
}

impl Infeasibility {
    /// Builds a diagnostic from a per-class rejection tally.
    ///
    /// An empty tally means there was no candidate date at all.
    pub fn from_tally(
        course: impl Into<String>,
        rejected: BTreeMap<ConstraintKind, usize>,
        backtracks: usize,
    ) -> Self {
        let constraint = rejected
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(kind, _)| *kind)
            .unwrap_or(ConstraintKind::NonWorkingDay);
        Self {
            course: course.into(),
            constraint,
            rejected,
            backtracks,
        }
    }
}

fn join_messages<T: std::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
