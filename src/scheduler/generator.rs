//! Exam date generator.
//!
//! # Algorithm
//!
//! 1. Validate input; classify the window's days.
//! 2. Fail fast when the window is shorter than the analytic lower bound.
//! 3. Order courses by the rule engine (default: semester ascending, most
//!    conflicts, course code). The first course of each semester in this
//!    order is that semester's first paper.
//! 4. Place courses in order, each on the earliest working day passing the
//!    placement checks. A first paper may go ahead of an already placed
//!    conflicting course without its gap; behind one it needs the usual
//!    spacing.
//! 5. When a course has no valid day, move the previously placed course to
//!    its next valid day and continue (chronological backtracking), up to
//!    `max_backtracks` reassignments.
//!
//! [`MinimumWindowEstimator`] runs the same search, so a window of exactly
//! its minimum schedules and one working day fewer fails.
//!
//! Day distances are working-day index differences, which equal the
//! calendar's working-day distance for dates inside the window.
//!
//! # Complexity
//! O(n · d · k) per forward pass where n=courses, d=working days,
//! k=average conflict degree; backtracking is bounded by the budget.
//!
//! # Reference
//! Carter, Laporte & Lee (1996), "Examination timetabling: algorithmic
//! strategies and applications"

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::estimator::{MinimumWindowEstimator, WindowBound};
use super::search::{first_papers, placement_order, Search};
use super::ConstraintKind;
use crate::config::EngineConfig;
use crate::dispatching::RuleEngine;
use crate::error::{Infeasibility, Result};
use crate::models::{
    Calendar, ConflictGraph, Course, DateWindow, Holiday, Schedule, ScheduleEntry, TimeSlot,
};
use crate::validation::{ensure_valid, validate_generation_input};

/// Input container for a generation run.
#[derive(Debug, Clone)]
pub struct ScheduleRequest {
    /// Courses to schedule.
    pub courses: Vec<Course>,
    /// Exam window.
    pub window: DateWindow,
    /// Holiday calendar.
    pub calendar: Calendar,
}

impl ScheduleRequest {
    /// Creates a request with no holidays.
    pub fn new(courses: Vec<Course>, window: DateWindow) -> Self {
        Self {
            courses,
            window,
            calendar: Calendar::new(),
        }
    }

    /// Adds holidays.
    pub fn with_holidays(mut self, holidays: impl IntoIterator<Item = Holiday>) -> Self {
        self.calendar = self.calendar.with_holidays(holidays);
        self
    }

    /// Replaces the calendar.
    pub fn with_calendar(mut self, calendar: Calendar) -> Self {
        self.calendar = calendar;
        self
    }
}

/// Assigns one exam date to every course.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use exam_schedule::models::{Course, DateWindow};
/// use exam_schedule::scheduler::{ScheduleGenerator, ScheduleRequest};
///
/// let courses = vec![
///     Course::new("MA101", 1).with_students(["s1", "s2"]),
///     Course::new("PH101", 1).with_students(["s2"]),
/// ];
/// let window = DateWindow::new(
///     NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
/// );
/// let schedule = ScheduleGenerator::new()
///     .generate(&ScheduleRequest::new(courses, window))
///     .unwrap();
/// assert_eq!(schedule.entry_count(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScheduleGenerator {
    config: EngineConfig,
    rule_engine: RuleEngine,
}

impl ScheduleGenerator {
    /// Creates a generator with default caps and ordering.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the course ordering.
    pub fn with_rule_engine(mut self, engine: RuleEngine) -> Self {
        self.rule_engine = engine;
        self
    }

    /// Generates a complete schedule.
    ///
    /// # Errors
    /// - `InputValidation` for an inverted window or a malformed course set.
    /// - `SchedulingInfeasible` naming the course that could not be placed.
    #[instrument(skip_all, fields(courses = request.courses.len(), start = %request.window.start, end = %request.window.end))]
    pub fn generate(&self, request: &ScheduleRequest) -> Result<Schedule> {
        self.config.validate()?;
        ensure_valid(validate_generation_input(&request.courses, &request.window))?;

        let courses = &request.courses;
        let graph = ConflictGraph::build(courses);
        let working = request.calendar.working_days(&request.window);

        let order = placement_order(courses, &graph, &self.rule_engine);

        if working.is_empty() {
            let infeasible = Infeasibility::from_tally(order[0].code.clone(), BTreeMap::new(), 0);
            warn!(%infeasible, "no working days in window");
            return Err(infeasible.into());
        }

        let bounds = MinimumWindowEstimator::new()
            .with_config(self.config.clone())
            .analytic_bounds(courses, &graph);
        if working.len() < bounds.minimum {
            let infeasible = self.short_window(&order, &bounds.binding, working.len());
            warn!(
                %infeasible,
                working_days = working.len(),
                minimum = bounds.minimum,
                "window shorter than lower bound"
            );
            return Err(infeasible.into());
        }

        let days = Search::new(&order, &graph, &self.config, working.len())
            .run()
            .map_err(|infeasible| {
                warn!(%infeasible, "scheduling infeasible");
                infeasible
            })?;

        let mut schedule = Schedule::new(
            generation_id(request, &self.config)?,
            request.window,
            request.calendar.clone(),
        );
        for ((course, day), first) in order.iter().zip(days).zip(first_papers(&order)) {
            let date = working[day];
            schedule.entries.push(
                ScheduleEntry::new(course, date, TimeSlot::for_date(request.window.start, date))
                    .with_first_paper(first),
            );
        }
        schedule.sort_entries();

        info!(
            entries = schedule.entry_count(),
            exam_days = schedule.exam_dates().len(),
            "schedule generated"
        );
        Ok(schedule)
    }

    /// Diagnostic for a window below the analytic lower bound.
    fn short_window(&self, order: &[&Course], binding: &WindowBound, days: usize) -> Infeasibility {
        let last_of_semester = |semester: u32| {
            order
                .iter()
                .rev()
                .find(|c| c.semester == semester)
                .map(|c| c.code.clone())
        };

        let (course, kind) = match binding {
            WindowBound::SemesterExclusivity { semester } => {
                (last_of_semester(*semester), ConstraintKind::SemesterExclusivity)
            }
            WindowBound::GapChain { semester } => (last_of_semester(*semester), ConstraintKind::Gap),
            WindowBound::ConflictGraph { course } => (Some(course.clone()), ConstraintKind::Gap),
            WindowBound::DailyCap | WindowBound::Empty => {
                let first_unfit = (days * self.config.daily_cap).min(order.len() - 1);
                (Some(order[first_unfit].code.clone()), ConstraintKind::DailyCap)
            }
        };

        let mut tally = BTreeMap::new();
        tally.insert(kind, days);
        Infeasibility::from_tally(
            course.unwrap_or_else(|| order[order.len() - 1].code.clone()),
            tally,
            0,
        )
    }
}

/// Deterministic id: identical input and configuration give the same id.
fn generation_id(request: &ScheduleRequest, config: &EngineConfig) -> Result<Uuid> {
    #[derive(Serialize)]
    struct GenerationKey<'a> {
        courses: Vec<&'a Course>,
        window: &'a DateWindow,
        calendar: &'a Calendar,
        config: &'a EngineConfig,
    }

    let mut courses: Vec<&Course> = request.courses.iter().collect();
    courses.sort_by(|a, b| a.code.cmp(&b.code));
    let key = GenerationKey {
        courses,
        window: &request.window,
        calendar: &request.calendar,
        config,
    };
    let bytes = serde_json::to_vec(&key)?;
    Ok(Uuid::new_v5(&Uuid::NAMESPACE_OID, &bytes))
}
