//! Placement constraints shared by the generator, the mutator, and the audit.
//!
//! A course may take a date iff:
//! 1. no other exam of its semester is already on that date (up to the
//!    per-semester cap),
//! 2. fewer than the daily cap of exams are on that date,
//! 3. every conflicting course is at least `max(1, gap of the later-dated
//!    course)` working days away. A semester's first paper dated *before* a
//!    conflicting course skips that spacing; dated after one, it needs the
//!    full gap. It may never share a date with a conflicting course.
//!
//! Checks are evaluated in that order; the generator stops at the first
//! failing class, the mutator collects all of them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::config::EngineConfig;
use crate::models::{ConflictGraph, Course, Schedule, ScheduleEntry};

/// Constraint classes, in check order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConstraintKind {
    /// Another exam of the same semester on the date.
    SemesterExclusivity,
    /// Daily exam cap reached.
    DailyCap,
    /// Conflicting courses too close together.
    Gap,
    /// Date is a weekend, a holiday, or outside the window.
    NonWorkingDay,
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConstraintKind::SemesterExclusivity => "semester exclusivity",
            ConstraintKind::DailyCap => "daily cap",
            ConstraintKind::Gap => "gap",
            ConstraintKind::NonWorkingDay => "non-working day",
        };
        f.write_str(s)
    }
}

/// A broken constraint for one course at one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Constraint class.
    pub kind: ConstraintKind,
    /// Course being checked.
    pub course_code: String,
    /// Date being checked.
    pub date: NaiveDate,
    /// Course on the other side of the clash, if any.
    pub other_course: Option<String>,
    /// Human-readable description.
    pub message: String,
}

impl Violation {
    /// Date is not a working day of the window.
    pub fn non_working_day(course: &str, date: NaiveDate) -> Self {
        Self {
            kind: ConstraintKind::NonWorkingDay,
            course_code: course.to_string(),
            date,
            other_course: None,
            message: format!("{course}: {date} is not a working day of the exam window"),
        }
    }

    /// Another exam of the same semester is on the date.
    pub fn semester_clash(course: &str, date: NaiveDate, semester: u32, other: &str) -> Self {
        Self {
            kind: ConstraintKind::SemesterExclusivity,
            course_code: course.to_string(),
            date,
            other_course: Some(other.to_string()),
            message: format!("{course}: semester {semester} already sits {other} on {date}"),
        }
    }

    /// The date is full.
    pub fn daily_cap(course: &str, date: NaiveDate, scheduled: usize, cap: usize) -> Self {
        Self {
            kind: ConstraintKind::DailyCap,
            course_code: course.to_string(),
            date,
            other_course: None,
            message: format!("{course}: {date} already holds {scheduled} of {cap} exams"),
        }
    }

    /// A conflicting exam is too close.
    pub fn gap(course: &str, date: NaiveDate, other: &str, required: u32, actual: u32) -> Self {
        Self {
            kind: ConstraintKind::Gap,
            course_code: course.to_string(),
            date,
            other_course: Some(other.to_string()),
            message: format!(
                "{course}: {other} shares students and is {actual} working day(s) away, {required} required"
            ),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Spacing a conflicting pair needs: the later-dated course's gap, at least
/// one day. Same-date pairs take the stricter of the two.
pub fn required_spacing(a_date: NaiveDate, a_gap: u32, b_date: NaiveDate, b_gap: u32) -> u32 {
    let gap = match a_date.cmp(&b_date) {
        std::cmp::Ordering::Greater => a_gap,
        std::cmp::Ordering::Less => b_gap,
        std::cmp::Ordering::Equal => a_gap.max(b_gap),
    };
    gap.max(1)
}

/// Checks moving `entry` to `date` against every other entry of `schedule`.
///
/// Returns all violations; empty means the move is valid. The moved entry's
/// own current placement is ignored. `entry.is_first_paper` must be the flag
/// the entry would hold at `date`.
pub fn check_placement(
    schedule: &Schedule,
    graph: &ConflictGraph,
    config: &EngineConfig,
    entry: &ScheduleEntry,
    date: NaiveDate,
) -> Vec<Violation> {
    let course = entry.course_code.as_str();
    let mut violations = Vec::new();

    if !schedule.window.contains(date) || !schedule.calendar.is_working_day(date) {
        violations.push(Violation::non_working_day(course, date));
    }

    let others_on_date: Vec<&ScheduleEntry> = schedule
        .entries
        .iter()
        .filter(|e| e.course_code != entry.course_code && e.date == date)
        .collect();

    let same_semester: Vec<&&ScheduleEntry> = others_on_date
        .iter()
        .filter(|e| e.semester == entry.semester)
        .collect();
    if same_semester.len() >= config.semester_daily_cap {
        if let Some(other) = same_semester.first() {
            violations.push(Violation::semester_clash(
                course,
                date,
                entry.semester,
                &other.course_code,
            ));
        }
    }

    if others_on_date.len() >= config.daily_cap {
        violations.push(Violation::daily_cap(
            course,
            date,
            others_on_date.len(),
            config.daily_cap,
        ));
    }

    for neighbor in graph.neighbors(course) {
        let Some(other) = schedule.entry_for(neighbor) else {
            continue;
        };
        let required = required_spacing(date, entry.gap_days, other.date, other.gap_days);
        let actual = schedule.calendar.working_days_between(date, other.date);
        let clash = other.date == date;
        let exempt = entry.is_first_paper && date < other.date;
        if clash || (!exempt && actual < required) {
            violations.push(Violation::gap(
                course,
                date,
                &other.course_code,
                required,
                if clash { 0 } else { actual },
            ));
        }
    }

    violations
}

/// Re-checks a whole schedule against its invariants.
///
/// Reports, for every entry: non-working or out-of-window dates, semester and
/// daily cap overflows, same-date clashes between conflicting courses, and
/// spacing shortfalls between conflicting courses unless the earlier-dated
/// one is a first paper. Overridden entries are audited like any other.
pub fn audit_schedule(
    schedule: &Schedule,
    courses: &[Course],
    config: &EngineConfig,
) -> Vec<Violation> {
    let graph = ConflictGraph::build(courses);
    let mut violations = Vec::new();

    let mut per_date: BTreeMap<NaiveDate, Vec<&ScheduleEntry>> = BTreeMap::new();
    for e in &schedule.entries {
        per_date.entry(e.date).or_default().push(e);
    }

    for e in &schedule.entries {
        if !schedule.window.contains(e.date) || !schedule.calendar.is_working_day(e.date) {
            violations.push(Violation::non_working_day(&e.course_code, e.date));
        }
    }

    for (date, entries) in &per_date {
        if entries.len() > config.daily_cap {
            for e in entries.iter().skip(config.daily_cap) {
                violations.push(Violation::daily_cap(
                    &e.course_code,
                    *date,
                    entries.len(),
                    config.daily_cap,
                ));
            }
        }

        let mut by_semester: BTreeMap<u32, Vec<&ScheduleEntry>> = BTreeMap::new();
        for e in entries {
            by_semester.entry(e.semester).or_default().push(e);
        }
        for (semester, group) in by_semester {
            if group.len() > config.semester_daily_cap {
                let first = group[0];
                for e in group.iter().skip(config.semester_daily_cap) {
                    violations.push(Violation::semester_clash(
                        &e.course_code,
                        *date,
                        semester,
                        &first.course_code,
                    ));
                }
            }
        }
    }

    for (i, a) in schedule.entries.iter().enumerate() {
        for b in &schedule.entries[i + 1..] {
            if !graph.conflicts(&a.course_code, &b.course_code) {
                continue;
            }
            let (earlier, later) = if a.date <= b.date { (a, b) } else { (b, a) };
            let required = required_spacing(a.date, a.gap_days, b.date, b.gap_days);
            let actual = schedule.calendar.working_days_between(a.date, b.date);
            let exempt = earlier.is_first_paper;
            if a.date == b.date || (!exempt && actual < required) {
                violations.push(Violation::gap(
                    &later.course_code,
                    later.date,
                    &earlier.course_code,
                    required,
                    actual,
                ));
            }
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Calendar, DateWindow, TimeSlot};
    use uuid::Uuid;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn courses() -> Vec<Course> {
        vec![
            Course::new("A", 1).with_students(["s1", "s2"]),
            Course::new("B", 1).with_students(["s2"]),
            Course::new("C", 2).with_students(["s9"]),
            Course::new("D", 3).with_students(["s8"]),
        ]
    }

    fn schedule(placements: &[(&Course, u32, bool)]) -> Schedule {
        let window = DateWindow::new(d(1), d(12));
        let mut s = Schedule::new(Uuid::nil(), window, Calendar::new());
        for (course, day, first) in placements {
            s.add_entry(
                ScheduleEntry::new(course, d(*day), TimeSlot::for_date(d(1), d(*day)))
                    .with_first_paper(*first),
            );
        }
        s
    }

    #[test]
    fn test_required_spacing_uses_later_course() {
        assert_eq!(required_spacing(d(1), 5, d(3), 2), 2);
        assert_eq!(required_spacing(d(3), 2, d(1), 5), 2);
        assert_eq!(required_spacing(d(3), 2, d(3), 4), 4);
        assert_eq!(required_spacing(d(1), 0, d(3), 0), 1);
    }

    #[test]
    fn test_check_placement_ok() {
        let cs = courses();
        let s = schedule(&[(&cs[0], 1, true), (&cs[1], 3, false)]);
        let g = ConflictGraph::build(&cs);
        let entry = s.entry_for("B").unwrap().clone();
        assert!(check_placement(&s, &g, &EngineConfig::default(), &entry, d(4)).is_empty());
    }

    #[test]
    fn test_check_placement_collects_all() {
        let cs = courses();
        let s = schedule(&[(&cs[0], 2, true), (&cs[1], 4, false)]);
        let g = ConflictGraph::build(&cs);
        let entry = s.entry_for("B").unwrap().clone();
        // 2024-01-02: same semester as A, and A shares a student → clash
        let v = check_placement(&s, &g, &EngineConfig::default(), &entry, d(2));
        let kinds: Vec<ConstraintKind> = v.iter().map(|v| v.kind).collect();
        assert!(kinds.contains(&ConstraintKind::SemesterExclusivity));
        assert!(kinds.contains(&ConstraintKind::Gap));
    }

    #[test]
    fn test_check_placement_weekend_and_outside() {
        let cs = courses();
        let s = schedule(&[(&cs[2], 1, true)]);
        let g = ConflictGraph::build(&cs);
        let entry = s.entry_for("C").unwrap().clone();
        let cfg = EngineConfig::default();
        // 2024-01-06 is a Saturday
        assert_eq!(
            check_placement(&s, &g, &cfg, &entry, d(6))[0].kind,
            ConstraintKind::NonWorkingDay
        );
        assert_eq!(
            check_placement(&s, &g, &cfg, &entry, d(15))[0].kind,
            ConstraintKind::NonWorkingDay
        );
    }

    #[test]
    fn test_check_placement_daily_cap() {
        let cs = courses();
        let s = schedule(&[(&cs[0], 1, true), (&cs[2], 1, true), (&cs[3], 3, true)]);
        let g = ConflictGraph::build(&cs);
        let cfg = EngineConfig::default().with_daily_cap(2);
        let entry = s.entry_for("D").unwrap().clone();
        let v = check_placement(&s, &g, &cfg, &entry, d(1));
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].kind, ConstraintKind::DailyCap);
    }

    #[test]
    fn test_first_paper_skips_spacing_only_ahead() {
        let cs = courses();
        let s = schedule(&[(&cs[1], 3, false), (&cs[0], 8, true)]);
        let g = ConflictGraph::build(&cs);
        let entry = s.entry_for("A").unwrap().clone();
        let cfg = EngineConfig::default().with_semester_daily_cap(2);
        // One working day ahead of B: fine for a first paper
        assert!(check_placement(&s, &g, &cfg, &entry, d(2)).is_empty());
        // One working day behind B: B's side needs A's full gap
        let v = check_placement(&s, &g, &cfg, &entry, d(4));
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].kind, ConstraintKind::Gap);
        assert!(check_placement(&s, &g, &cfg, &entry, d(5)).is_empty());
        // Same date as B: still a clash
        let v = check_placement(&s, &g, &cfg, &entry, d(3));
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].kind, ConstraintKind::Gap);
    }

    #[test]
    fn test_audit_clean_schedule() {
        let cs = courses();
        let s = schedule(&[(&cs[0], 1, true), (&cs[1], 3, false), (&cs[2], 1, true)]);
        assert!(audit_schedule(&s, &cs, &EngineConfig::default()).is_empty());
    }

    #[test]
    fn test_audit_finds_problems() {
        let cs = vec![
            Course::new("A", 1).with_students(["s1"]),
            Course::new("B", 1).with_students(["s1"]),
            Course::new("C", 1).with_students(["s1"]),
        ];
        // B and C are neither first paper and only one day apart; A/B share a date
        let s = schedule(&[(&cs[0], 2, true), (&cs[1], 2, false), (&cs[2], 3, false)]);
        let v = audit_schedule(&s, &cs, &EngineConfig::default());
        let count = |k: ConstraintKind| v.iter().filter(|x| x.kind == k).count();
        assert_eq!(count(ConstraintKind::SemesterExclusivity), 1);
        // A-B same date, B-C too close; A-C exempt (A is the earlier first paper)
        assert_eq!(count(ConstraintKind::Gap), 2);
    }

    #[test]
    fn test_audit_flags_later_first_paper() {
        let cs = vec![
            Course::new("A", 1).with_students(["s1"]),
            Course::new("B", 2).with_students(["s1"]),
        ];
        // B opens semester 2 one day after A: too close
        let s = schedule(&[(&cs[0], 1, false), (&cs[1], 2, true)]);
        let v = audit_schedule(&s, &cs, &EngineConfig::default());
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].kind, ConstraintKind::Gap);
        assert_eq!(v[0].course_code, "B");

        // Only B opens a semester and it comes first: exempt
        let s = schedule(&[(&cs[1], 1, true), (&cs[0], 2, false)]);
        assert!(audit_schedule(&s, &cs, &EngineConfig::default()).is_empty());
    }
}
