//! Manual rescheduling.
//!
//! A move is a pure state transition: it takes a schedule and returns a new
//! schedule (accepted) or the list of broken constraints (rejected). The
//! input schedule is never modified.
//!
//! A first paper moved behind another exam of its semester hands the flag to
//! the earliest such exam (ties by course code) and is checked without it.

use chrono::NaiveDate;
use tracing::{info, instrument, warn};

use super::checks::{check_placement, Violation};
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::models::{ConflictGraph, Course, Schedule, ScheduleEntry, TimeSlot};

/// Validates and applies single-course moves.
#[derive(Debug, Clone)]
pub struct ScheduleMutator {
    graph: ConflictGraph,
    config: EngineConfig,
}

impl ScheduleMutator {
    /// Creates a mutator for the given course set.
    pub fn new(courses: &[Course]) -> Self {
        Self {
            graph: ConflictGraph::build(courses),
            config: EngineConfig::default(),
        }
    }

    /// Uses a prebuilt conflict graph.
    pub fn from_graph(graph: ConflictGraph) -> Self {
        Self {
            graph,
            config: EngineConfig::default(),
        }
    }

    /// Sets the configuration. Caps must match the generating run.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Lists the constraints a move would break, without applying it.
    pub fn check_move(
        &self,
        schedule: &Schedule,
        course_code: &str,
        target: NaiveDate,
    ) -> Result<Vec<Violation>> {
        let entry = schedule
            .entry_for(course_code)
            .ok_or_else(|| EngineError::UnknownCourse(course_code.to_string()))?;
        let mut moved = entry.clone();
        moved.is_first_paper &= successor(schedule, entry, target).is_none();
        Ok(check_placement(schedule, &self.graph, &self.config, &moved, target))
    }

    /// Moves one course to `target`.
    ///
    /// Without override, the move is re-checked against the full current
    /// schedule and rejected with every broken constraint. With override it
    /// is applied as-is and the entry is flagged `overridden`.
    ///
    /// # Errors
    /// - `UnknownCourse` if the course has no entry.
    /// - `ConstraintViolation` if the move is invalid and not overridden.
    #[instrument(skip(self, schedule), fields(revision = schedule.revision))]
    pub fn propose_move(
        &self,
        schedule: &Schedule,
        course_code: &str,
        target: NaiveDate,
        override_rules: bool,
    ) -> Result<Schedule> {
        let violations = self.check_move(schedule, course_code, target)?;

        if !violations.is_empty() && !override_rules {
            warn!(violations = violations.len(), "move rejected");
            return Err(EngineError::ConstraintViolation {
                course: course_code.to_string(),
                date: target,
                violations,
            });
        }

        let heir = schedule
            .entry_for(course_code)
            .and_then(|entry| successor(schedule, entry, target))
            .map(|e| e.course_code.clone());

        let mut next = schedule.clone();
        for entry in next.entries.iter_mut() {
            if entry.course_code == course_code {
                entry.date = target;
                entry.slot = TimeSlot::for_date(next.window.start, target);
                entry.overridden |= override_rules;
                if heir.is_some() {
                    entry.is_first_paper = false;
                }
            } else if heir.as_deref() == Some(entry.course_code.as_str()) {
                entry.is_first_paper = true;
            }
        }
        next.revision += 1;
        next.sort_entries();

        info!(
            bypassed = violations.len(),
            overridden = override_rules,
            revision = next.revision,
            "move applied"
        );
        Ok(next)
    }
}

/// Semester-mate taking over the first-paper flag when `entry` moves to
/// `target`, if any.
fn successor<'s>(
    schedule: &'s Schedule,
    entry: &ScheduleEntry,
    target: NaiveDate,
) -> Option<&'s ScheduleEntry> {
    if !entry.is_first_paper {
        return None;
    }
    schedule
        .entries
        .iter()
        .filter(|e| {
            e.semester == entry.semester && e.course_code != entry.course_code && e.date < target
        })
        .min_by(|a, b| a.date.cmp(&b.date).then_with(|| a.course_code.cmp(&b.course_code)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::{audit_schedule, ConstraintKind, ScheduleGenerator, ScheduleRequest};
    use crate::models::DateWindow;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn courses() -> Vec<Course> {
        vec![
            Course::new("A", 1).with_students(["s1", "s2"]),
            Course::new("B", 1).with_students(["s2", "s3"]),
            Course::new("C", 2).with_students(["s4"]),
        ]
    }

    fn generated() -> Schedule {
        let request = ScheduleRequest::new(courses(), DateWindow::new(d(1), d(10)));
        ScheduleGenerator::new().generate(&request).unwrap()
    }

    fn kinds(err: EngineError) -> Vec<ConstraintKind> {
        match err {
            EngineError::ConstraintViolation { violations, .. } => {
                violations.iter().map(|v| v.kind).collect()
            }
            other => panic!("expected ConstraintViolation, got {other:?}"),
        }
    }

    #[test]
    fn test_generated_layout() {
        let s = generated();
        assert_eq!(s.entry_for("A").map(|e| e.date), Some(d(1)));
        assert_eq!(s.entry_for("B").map(|e| e.date), Some(d(3)));
        assert_eq!(s.entry_for("C").map(|e| e.date), Some(d(1)));
    }

    #[test]
    fn test_valid_move_accepted() {
        let s = generated();
        let moved = ScheduleMutator::new(&courses())
            .propose_move(&s, "B", d(4), false)
            .unwrap();
        let b = moved.entry_for("B").unwrap();
        assert_eq!(b.date, d(4));
        assert_eq!(b.slot, TimeSlot::Afternoon);
        assert!(!b.overridden);
        assert_eq!(moved.revision, s.revision + 1);
        assert_eq!(moved.generation_id, s.generation_id);
        assert!(audit_schedule(&moved, &courses(), &EngineConfig::default()).is_empty());
    }

    #[test]
    fn test_gap_violation_rejected() {
        let s = generated();
        let before = s.clone();
        let err = ScheduleMutator::new(&courses())
            .propose_move(&s, "B", d(2), false)
            .unwrap_err();
        assert_eq!(kinds(err), vec![ConstraintKind::Gap]);
        assert_eq!(s, before);
    }

    #[test]
    fn test_same_date_reports_every_class() {
        let s = generated();
        let err = ScheduleMutator::new(&courses())
            .propose_move(&s, "B", d(1), false)
            .unwrap_err();
        assert_eq!(
            kinds(err),
            vec![ConstraintKind::SemesterExclusivity, ConstraintKind::Gap]
        );
    }

    #[test]
    fn test_daily_cap_violation() {
        let s = generated();
        let mutator = ScheduleMutator::new(&courses())
            .with_config(EngineConfig::default().with_daily_cap(2));
        let err = mutator.propose_move(&s, "B", d(1), false).unwrap_err();
        assert!(kinds(err).contains(&ConstraintKind::DailyCap));
    }

    #[test]
    fn test_non_working_and_outside_window() {
        let s = generated();
        let mutator = ScheduleMutator::new(&courses());
        // Saturday
        let err = mutator.propose_move(&s, "C", d(6), false).unwrap_err();
        assert_eq!(kinds(err), vec![ConstraintKind::NonWorkingDay]);
        let err = mutator.propose_move(&s, "C", d(20), false).unwrap_err();
        assert_eq!(kinds(err), vec![ConstraintKind::NonWorkingDay]);
    }

    #[test]
    fn test_first_paper_moves_closer() {
        let s = generated();
        assert!(s.entry_for("A").unwrap().is_first_paper);
        let moved = ScheduleMutator::new(&courses())
            .propose_move(&s, "A", d(2), false)
            .unwrap();
        assert_eq!(moved.entry_for("A").map(|e| e.date), Some(d(2)));
        assert!(moved.entry_for("A").unwrap().is_first_paper);
        assert!(!moved.entry_for("B").unwrap().is_first_paper);
    }

    #[test]
    fn test_first_paper_moved_behind_loses_flag() {
        let s = generated();
        let mutator = ScheduleMutator::new(&courses());

        // One day after B: A would no longer open the semester and needs its gap
        let err = mutator.propose_move(&s, "A", d(4), false).unwrap_err();
        assert_eq!(kinds(err), vec![ConstraintKind::Gap]);

        let moved = mutator.propose_move(&s, "A", d(8), false).unwrap();
        assert!(!moved.entry_for("A").unwrap().is_first_paper);
        assert!(moved.entry_for("B").unwrap().is_first_paper);
        assert!(moved.entry_for("C").unwrap().is_first_paper);
        assert!(audit_schedule(&moved, &courses(), &EngineConfig::default()).is_empty());
    }

    #[test]
    fn test_override_applies_and_flags() {
        let s = generated();
        let moved = ScheduleMutator::new(&courses())
            .propose_move(&s, "B", d(6), true)
            .unwrap();
        let b = moved.entry_for("B").unwrap();
        assert_eq!(b.date, d(6));
        assert!(b.overridden);
        assert_eq!(moved.override_count(), 1);
        let audit = audit_schedule(&moved, &courses(), &EngineConfig::default());
        assert!(audit.iter().any(|v| v.kind == ConstraintKind::NonWorkingDay));
    }

    #[test]
    fn test_unknown_course() {
        let s = generated();
        let err = ScheduleMutator::new(&courses())
            .propose_move(&s, "ZZ999", d(2), true)
            .unwrap_err();
        assert!(matches!(err, EngineError::UnknownCourse(code) if code == "ZZ999"));
    }

    #[test]
    fn test_move_is_deterministic() {
        let s = generated();
        let mutator = ScheduleMutator::new(&courses());
        let a = mutator.propose_move(&s, "C", d(2), false).unwrap();
        let b = mutator.propose_move(&s, "C", d(2), false).unwrap();
        assert_eq!(a, b);
        assert!(mutator.propose_move(&s, "B", d(2), false).is_err());
        assert!(mutator.propose_move(&s, "B", d(2), false).is_err());
    }

    #[test]
    fn test_entries_stay_sorted() {
        let s = generated();
        let moved = ScheduleMutator::new(&courses())
            .propose_move(&s, "A", d(2), false)
            .unwrap();
        let codes: Vec<&str> = moved.entries.iter().map(|e| e.course_code.as_str()).collect();
        assert_eq!(codes, vec!["C", "A", "B"]);
    }
}
