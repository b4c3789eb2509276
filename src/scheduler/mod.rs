//! Exam date scheduling and KPI evaluation.
//!
//! - [`MinimumWindowEstimator`] finds the fewest working days a course
//!   selection needs.
//! - [`ScheduleGenerator`] assigns every course one exam date with bounded
//!   backtracking.
//! - [`ScheduleMutator`] validates and applies single manual moves.
//! - [`audit_schedule`] re-checks any schedule, overrides included.
//! - [`ScheduleKpi`] summarizes schedule quality.
//!
//! All components share the placement checks in [`check_placement`].
//!
//! # References
//!
//! - Carter, Laporte & Lee (1996), "Examination timetabling: algorithmic
//!   strategies and applications"
//! - Held & Karp (1962), "A dynamic programming approach to sequencing
//!   problems"

mod checks;
mod estimator;
mod generator;
mod kpi;
mod mutator;
mod search;

pub use checks::{audit_schedule, check_placement, required_spacing, ConstraintKind, Violation};
pub use estimator::{CourseDiagnostic, MinimumWindowEstimator, WindowBound, WindowEstimate};
pub use generator::{ScheduleGenerator, ScheduleRequest};
pub use kpi::ScheduleKpi;
pub use mutator::ScheduleMutator;
