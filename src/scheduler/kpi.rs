//! Schedule quality metrics (KPIs).
//!
//! Computes exam-timetable indicators from a schedule and its input
//! courses.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Exam days | Distinct dates holding at least one exam |
//! | Span | Working days from first to last exam, inclusive |
//! | Max / Avg load | Exams per exam day |
//! | Min conflict gap | Smallest working-day distance between conflicting courses |
//! | Window use | Exam days / working days in the window |
//!
//! # Reference
//! Carter, Laporte & Lee (1996), proximity cost and timetable length.

use crate::models::{ConflictGraph, Course, Schedule};

/// Schedule performance indicators.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleKpi {
    /// Distinct exam dates.
    pub exam_days_used: usize,
    /// Working days from first to last exam, inclusive (0 if empty).
    pub span_working_days: u32,
    /// Busiest date's exam count.
    pub max_exams_per_day: usize,
    /// Mean exams per exam date.
    pub avg_exams_per_day: f64,
    /// Smallest distance between two conflicting exams; `None` without conflicts.
    pub min_conflict_gap: Option<u32>,
    /// Fraction of the window's working days used (0.0..1.0).
    pub window_utilization: f64,
    /// Entries placed through an override.
    pub override_count: usize,
    /// Entries marked as their semester's first paper.
    pub first_paper_count: usize,
}

impl ScheduleKpi {
    /// Computes KPIs from a schedule and its input courses.
    ///
    /// # Arguments
    /// * `schedule` - The schedule to measure.
    /// * `courses` - The input courses (for the conflict relation).
    pub fn calculate(schedule: &Schedule, courses: &[Course]) -> Self {
        let per_date = schedule.exams_per_date();
        let exam_days_used = per_date.len();
        let max_exams_per_day = per_date.values().copied().max().unwrap_or(0);
        let avg_exams_per_day = if exam_days_used > 0 {
            schedule.entry_count() as f64 / exam_days_used as f64
        } else {
            0.0
        };

        let span_working_days = match (per_date.keys().next(), per_date.keys().next_back()) {
            (Some(&first), Some(&last)) => {
                schedule.calendar.working_days_between(first, last)
                    + u32::from(schedule.calendar.is_working_day(first))
            }
            _ => 0,
        };

        let graph = ConflictGraph::build(courses);
        let mut min_conflict_gap: Option<u32> = None;
        for (i, a) in schedule.entries.iter().enumerate() {
            for b in &schedule.entries[i + 1..] {
                if graph.conflicts(&a.course_code, &b.course_code) {
                    let gap = schedule.calendar.working_days_between(a.date, b.date);
                    min_conflict_gap = Some(min_conflict_gap.map_or(gap, |m| m.min(gap)));
                }
            }
        }

        let working = schedule.calendar.working_days(&schedule.window).len();
        let window_utilization = if working > 0 {
            exam_days_used as f64 / working as f64
        } else {
            0.0
        };

        Self {
            exam_days_used,
            span_working_days,
            max_exams_per_day,
            avg_exams_per_day,
            min_conflict_gap,
            window_utilization,
            override_count: schedule.override_count(),
            first_paper_count: schedule.entries.iter().filter(|e| e.is_first_paper).count(),
        }
    }
}
