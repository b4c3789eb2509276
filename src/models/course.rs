//! Course model.
//!
//! A course is the unit being scheduled: it receives exactly one exam date.
//! Its enrollment roster drives the conflict graph and the seat planner.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Default minimum spacing (working days) before the next exam of a
/// conflicting course.
pub const DEFAULT_GAP_DAYS: u32 = 2;

/// Program a course belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProgramType {
    /// Bachelor-level program.
    #[default]
    Undergraduate,
    /// Master/doctoral program.
    Postgraduate,
    /// Diploma or certificate program.
    Diploma,
    /// Institution-specific program.
    Custom(String),
}

/// A course with its enrollment roster.
///
/// Immutable for the duration of one generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    /// Unique course code (e.g., "CS201").
    pub code: String,
    /// Human-readable title.
    pub name: String,
    /// Semester number (1..N).
    pub semester: u32,
    /// Program type.
    pub program: ProgramType,
    /// Minimum working days required after the previous exam of any course
    /// sharing students with this one.
    pub gap_days: u32,
    /// Enrolled student IDs (enrollment numbers).
    pub students: BTreeSet<String>,
}

impl Course {
    /// Creates a course with the default gap and no students.
    pub fn new(code: impl Into<String>, semester: u32) -> Self {
        Self {
            code: code.into(),
            name: String::new(),
            semester,
            program: ProgramType::default(),
            gap_days: DEFAULT_GAP_DAYS,
            students: BTreeSet::new(),
        }
    }

    /// Sets the title.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the program type.
    pub fn with_program(mut self, program: ProgramType) -> Self {
        self.program = program;
        self
    }

    /// Sets the required gap.
    pub fn with_gap_days(mut self, gap_days: u32) -> Self {
        self.gap_days = gap_days;
        self
    }

    /// Enrolls one student.
    pub fn with_student(mut self, student_id: impl Into<String>) -> Self {
        self.students.insert(student_id.into());
        self
    }

    /// Enrolls several students.
    pub fn with_students<I, S>(mut self, students: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.students.extend(students.into_iter().map(Into::into));
        self
    }

    /// Number of enrolled students.
    #[inline]
    pub fn student_count(&self) -> usize {
        self.students.len()
    }

    /// Whether at least one student is enrolled in both courses.
    pub fn shares_students(&self, other: &Course) -> bool {
        let (small, large) = if self.students.len() <= other.students.len() {
            (&self.students, &other.students)
        } else {
            (&other.students, &self.students)
        };
        small.iter().any(|s| large.contains(s))
    }

    /// Spacing this course demands when it is the later exam of a
    /// conflicting pair. Never less than one day: students cannot sit two
    /// exams on the same date.
    #[inline]
    pub fn required_spacing(&self) -> u32 {
        self.gap_days.max(1)
    }
}
