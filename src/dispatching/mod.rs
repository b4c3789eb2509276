//! Course ordering rules and rule engine.
//!
//! The generator places courses one at a time, so the order in which they
//! are visited decides both the first paper of each semester and how much
//! backtracking the search needs. Ordering is expressed as composable rules.
//!
//! # Usage
//!
//! ```
//! use exam_schedule::dispatching::{OrderingContext, RuleEngine, TieBreaker};
//! use exam_schedule::dispatching::rules;
//!
//! let engine = RuleEngine::new()
//!     .with_rule(rules::SemesterAscending)
//!     .with_tie_breaker(rules::MostConflicts)
//!     .with_final_tie_breaker(TieBreaker::ByCode);
//! ```
//!
//! # References
//!
//! - Carter, Laporte & Lee (1996), "Examination timetabling: algorithmic
//!   strategies and applications" (largest-degree-first ordering)

mod context;
mod engine;
pub mod rules;

pub use context::OrderingContext;
pub use engine::{EvaluationMode, RuleEngine, TieBreaker};

use crate::models::Course;
use std::fmt::Debug;

/// Score returned by an ordering rule.
///
/// Lower scores = placed earlier.
pub type RuleScore = f64;

/// A rule that scores how early a course should be placed.
///
/// # Score Convention
/// **Lower score = placed first.**
pub trait OrderingRule: Send + Sync + Debug {
    /// Rule name (e.g., "SEMESTER").
    fn name(&self) -> &'static str;

    /// Scores a course given the conflict context.
    fn evaluate(&self, course: &Course, context: &OrderingContext) -> RuleScore;

    /// Rule description.
    fn description(&self) -> &'static str {
        self.name()
    }
}
