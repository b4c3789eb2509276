//! Exam schedule (solution) model.
//!
//! A schedule is an identifiable value: it carries the generation id of the
//! run that produced it, a revision counter bumped by every accepted manual
//! move, and the window and calendar it was generated against. Callers own
//! its lifetime; the latest generation replaces any prior one.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

use super::{Calendar, Course, DateWindow, ProgramType, SeatCandidate};

/// Exam session within a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TimeSlot {
    /// Forenoon session.
    Morning,
    /// Afternoon session.
    Afternoon,
}

impl TimeSlot {
    /// Slot for a date: alternates by parity of the day offset from the
    /// window start (day 0 is a morning).
    pub fn for_date(window_start: NaiveDate, date: NaiveDate) -> Self {
        if (date - window_start).num_days().rem_euclid(2) == 0 {
            TimeSlot::Morning
        } else {
            TimeSlot::Afternoon
        }
    }
}

/// One course's exam placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// Scheduled course.
    pub course_code: String,
    /// Exam date.
    pub date: NaiveDate,
    /// Session.
    pub slot: TimeSlot,
    /// Semester of the course (denormalized).
    pub semester: u32,
    /// Program of the course (denormalized).
    pub program: ProgramType,
    /// Gap the course demands (denormalized).
    pub gap_days: u32,
    /// First exam scheduled for its semester.
    pub is_first_paper: bool,
    /// Placed through an override move, bypassing validation.
    pub overridden: bool,
}

impl ScheduleEntry {
    /// Creates an entry for a course.
    pub fn new(course: &Course, date: NaiveDate, slot: TimeSlot) -> Self {
        Self {
            course_code: course.code.clone(),
            date,
            slot,
            semester: course.semester,
            program: course.program.clone(),
            gap_days: course.gap_days,
            is_first_paper: false,
            overridden: false,
        }
    }

    /// Marks the entry as its semester's first paper.
    pub fn with_first_paper(mut self, first: bool) -> Self {
        self.is_first_paper = first;
        self
    }
}

/// A complete exam schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    /// Identifies the generation run.
    pub generation_id: Uuid,
    /// Incremented by every accepted move.
    pub revision: u32,
    /// Window the schedule was generated for.
    pub window: DateWindow,
    /// Calendar used to classify days.
    pub calendar: Calendar,
    /// Exactly one entry per course, ordered by (date, semester, code).
    pub entries: Vec<ScheduleEntry>,
}

impl Schedule {
    /// Creates an empty schedule.
    pub fn new(generation_id: Uuid, window: DateWindow, calendar: Calendar) -> Self {
        Self {
            generation_id,
            revision: 0,
            window,
            calendar,
            entries: Vec::new(),
        }
    }

    /// Adds an entry, keeping entries ordered.
    pub fn add_entry(&mut self, entry: ScheduleEntry) {
        self.entries.push(entry);
        self.sort_entries();
    }

    pub(crate) fn sort_entries(&mut self) {
        self.entries.sort_by(|a, b| {
            (a.date, a.semester, &a.course_code).cmp(&(b.date, b.semester, &b.course_code))
        });
    }

    /// Finds the entry of a course.
    pub fn entry_for(&self, course_code: &str) -> Option<&ScheduleEntry> {
        self.entries.iter().find(|e| e.course_code == course_code)
    }

    /// Entries on a date.
    pub fn entries_on(&self, date: NaiveDate) -> Vec<&ScheduleEntry> {
        self.entries.iter().filter(|e| e.date == date).collect()
    }

    /// Distinct exam dates, ascending.
    pub fn exam_dates(&self) -> BTreeSet<NaiveDate> {
        self.entries.iter().map(|e| e.date).collect()
    }

    /// Exams per date.
    pub fn exams_per_date(&self) -> BTreeMap<NaiveDate, usize> {
        let mut counts = BTreeMap::new();
        for e in &self.entries {
            *counts.entry(e.date).or_insert(0) += 1;
        }
        counts
    }

    /// Number of entries.
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Number of entries placed by override.
    pub fn override_count(&self) -> usize {
        self.entries.iter().filter(|e| e.overridden).count()
    }

    /// Seating input for one date: every enrolled student of every course
    /// examined that day, paired with the course.
    ///
    /// Courses missing from `courses` contribute nothing.
    pub fn roster_for(&self, date: NaiveDate, courses: &[Course]) -> Vec<SeatCandidate> {
        let by_code: BTreeMap<&str, &Course> =
            courses.iter().map(|c| (c.code.as_str(), c)).collect();

        self.entries_on(date)
            .into_iter()
            .filter_map(|e| by_code.get(e.course_code.as_str()))
            .flat_map(|c| {
                c.students
                    .iter()
                    .map(move |s| SeatCandidate::new(s.clone(), c.code.clone()))
            })
            .collect()
    }
}
