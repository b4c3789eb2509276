//! Seat allocation for one exam date.
//!
//! # Algorithm
//!
//! 1. Keep venues serving the requested department (plus shared venues),
//!    in catalog order.
//! 2. Order students by course code, then student ID, so each cohort takes
//!    a contiguous seat range. IDs compare digit runs by value, so `s2`
//!    sits before `s10`.
//! 3. Walk each venue's fill order (row-major, joined rows as one unit,
//!    truncated to capacity) and seat students one by one.
//! 4. Whoever is left once every venue is full goes to `unassigned`.
//!
//! The result depends only on the request; there is no randomness and no
//! clock.

use chrono::NaiveDate;
use std::cmp::Ordering;
use tracing::{debug, info, instrument, warn};

use crate::error::Result;
use crate::models::{
    seat_label, Course, SeatAssignment, SeatCandidate, SeatCell, SeatPlan, Schedule, Venue,
    VenueGrid,
};
use crate::validation::{ensure_valid, validate_seating_input};

/// Input for one date's seating.
#[derive(Debug, Clone)]
pub struct SeatingRequest {
    /// Exam date.
    pub date: NaiveDate,
    /// Students sitting an exam that day.
    pub candidates: Vec<SeatCandidate>,
    /// Venue catalog, in fill order.
    pub venues: Vec<Venue>,
    /// Restrict to venues of this department (shared venues always qualify).
    pub department: Option<String>,
}

impl SeatingRequest {
    /// Creates a request over the full catalog.
    pub fn new(date: NaiveDate, candidates: Vec<SeatCandidate>, venues: Vec<Venue>) -> Self {
        Self {
            date,
            candidates,
            venues,
            department: None,
        }
    }

    /// Builds a request from a schedule's roster for `date`.
    pub fn from_schedule(
        schedule: &Schedule,
        courses: &[Course],
        date: NaiveDate,
        venues: Vec<Venue>,
    ) -> Self {
        Self::new(date, schedule.roster_for(date, courses), venues)
    }

    /// Restricts the catalog to a department.
    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }
}

/// Assigns students to venue seats.
#[derive(Debug, Clone, Default)]
pub struct SeatPlanner;

impl SeatPlanner {
    /// Creates a planner.
    pub fn new() -> Self {
        Self
    }

    /// Seats every candidate that fits.
    ///
    /// Running out of seats is not an error: the overflow is listed in
    /// [`SeatPlan::unassigned`].
    ///
    /// # Errors
    /// `InputValidation` for an empty roster, duplicate students, duplicate
    /// venue IDs, empty grids, or malformed joined rows.
    #[instrument(skip_all, fields(date = %request.date, candidates = request.candidates.len()))]
    pub fn plan(&self, request: &SeatingRequest) -> Result<SeatPlan> {
        ensure_valid(validate_seating_input(&request.candidates, &request.venues))?;

        let mut queue: Vec<&SeatCandidate> = request.candidates.iter().collect();
        queue.sort_by(|a, b| {
            a.course_code
                .cmp(&b.course_code)
                .then_with(|| natural_cmp(&a.student_id, &b.student_id))
        });
        let mut queue = queue.into_iter().peekable();

        let venues = request.venues.iter().filter(|v| {
            request
                .department
                .as_deref()
                .map_or(true, |dept| v.serves(dept))
        });

        let mut grids = Vec::new();
        let mut assignments = Vec::new();

        for venue in venues {
            if queue.peek().is_none() {
                break;
            }
            let mut grid = VenueGrid::empty(venue.id.clone(), venue.rows, venue.columns);
            for (row, column) in venue.fill_order() {
                let Some(candidate) = queue.next() else {
                    break;
                };
                grid.cells[row - 1][column - 1] = Some(SeatCell {
                    student_id: candidate.student_id.clone(),
                    course_code: candidate.course_code.clone(),
                });
                assignments.push(SeatAssignment {
                    student_id: candidate.student_id.clone(),
                    date: request.date,
                    course_code: candidate.course_code.clone(),
                    venue_id: venue.id.clone(),
                    row,
                    column,
                    label: seat_label(row, column),
                });
            }
            debug!(venue = %venue.id, seated = grid.occupied(), "venue filled");
            grids.push(grid);
        }

        let unassigned: Vec<SeatCandidate> = queue.cloned().collect();
        if !unassigned.is_empty() {
            warn!(
                unassigned = unassigned.len(),
                "capacity exceeded; students left without a seat"
            );
        }
        info!(
            assigned = assignments.len(),
            venues = grids.len(),
            "seat plan generated"
        );

        Ok(SeatPlan {
            date: request.date,
            grids,
            assignments,
            unassigned,
        })
    }
}

/// Compares IDs with digit runs taken as numbers; ties fall back to plain
/// string order.
fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut x = a.as_bytes();
    let mut y = b.as_bytes();
    while let (Some(&cx), Some(&cy)) = (x.first(), y.first()) {
        let ord = if cx.is_ascii_digit() && cy.is_ascii_digit() {
            let (nx, rx) = split_digits(x);
            let (ny, ry) = split_digits(y);
            x = rx;
            y = ry;
            let nx = trim_zeros(nx);
            let ny = trim_zeros(ny);
            nx.len().cmp(&ny.len()).then_with(|| nx.cmp(ny))
        } else {
            x = &x[1..];
            y = &y[1..];
            cx.cmp(&cy)
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    x.len().cmp(&y.len()).then_with(|| a.cmp(b))
}

fn split_digits(s: &[u8]) -> (&[u8], &[u8]) {
    let end = s.iter().position(|c| !c.is_ascii_digit()).unwrap_or(s.len());
    s.split_at(end)
}

fn trim_zeros(s: &[u8]) -> &[u8] {
    let start = s.iter().position(|&c| c != b'0').unwrap_or(s.len());
    &s[start..]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::collections::HashSet;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 3).unwrap()
    }

    fn cohort(course: &str, students: &[&str]) -> Vec<SeatCandidate> {
        students
            .iter()
            .map(|s| SeatCandidate::new(*s, course))
            .collect()
    }

    fn labels(plan: &SeatPlan) -> Vec<(&str, &str)> {
        plan.assignments
            .iter()
            .map(|a| (a.student_id.as_str(), a.label.as_str()))
            .collect()
    }

    #[test]
    fn test_three_students_small_hall() {
        crate::logging::init_test();
        let request = SeatingRequest::new(
            day(),
            cohort("CS101", &["s3", "s1", "s2"]),
            vec![Venue::new("H1", 2, 2)],
        );
        let plan = SeatPlanner::new().plan(&request).unwrap();
        assert_eq!(labels(&plan), vec![("s1", "A1"), ("s2", "A2"), ("s3", "B1")]);
        assert!(plan.unassigned.is_empty());
        assert!(plan.is_complete());
        let grid = plan.grid_for("H1").unwrap();
        assert_eq!(grid.occupied(), 3);
        assert!(grid.cell(2, 2).is_none());
    }

    #[test]
    fn test_cohorts_contiguous_by_course() {
        let mut candidates = cohort("MA201", &["a1", "a2"]);
        candidates.extend(cohort("CS101", &["z9", "b1"]));
        let request = SeatingRequest::new(day(), candidates, vec![Venue::new("H1", 2, 3)]);
        let plan = SeatPlanner::new().plan(&request).unwrap();
        assert_eq!(
            labels(&plan),
            vec![("b1", "A1"), ("z9", "A2"), ("a1", "A3"), ("a2", "B1")]
        );
    }

    #[test]
    fn test_student_ids_in_natural_order() {
        let request = SeatingRequest::new(
            day(),
            cohort("CS101", &["s10", "s2", "s1", "s02a"]),
            vec![Venue::new("H1", 1, 4)],
        );
        let plan = SeatPlanner::new().plan(&request).unwrap();
        assert_eq!(
            labels(&plan),
            vec![("s1", "A1"), ("s2", "A2"), ("s02a", "A3"), ("s10", "A4")]
        );
    }

    #[test]
    fn test_natural_cmp() {
        assert_eq!(natural_cmp("s2", "s10"), Ordering::Less);
        assert_eq!(natural_cmp("s10", "s9"), Ordering::Greater);
        assert_eq!(natural_cmp("a10", "b2"), Ordering::Less);
        assert_eq!(natural_cmp("s02", "s2"), Ordering::Less);
        assert_eq!(natural_cmp("s2", "s2"), Ordering::Equal);
        assert_eq!(natural_cmp("s2", "s2b"), Ordering::Less);
    }

    #[test]
    fn test_joined_rows_fill_as_one_unit() {
        // Rows 1 and 3 form one bench, filled before row 2.
        let venue = Venue::new("H1", 3, 2).with_joined_rows([1, 3]);
        let request = SeatingRequest::new(
            day(),
            cohort("CS101", &["s1", "s2", "s3", "s4", "s5"]),
            vec![venue],
        );
        let plan = SeatPlanner::new().plan(&request).unwrap();
        assert_eq!(
            labels(&plan),
            vec![("s1", "A1"), ("s2", "A2"), ("s3", "C1"), ("s4", "C2"), ("s5", "B1")]
        );
    }

    #[test]
    fn test_overflow_into_next_venue() {
        let venues = vec![
            Venue::new("H1", 2, 2).with_capacity(3),
            Venue::new("H2", 1, 5),
        ];
        let request =
            SeatingRequest::new(day(), cohort("CS101", &["s1", "s2", "s3", "s4"]), venues);
        let plan = SeatPlanner::new().plan(&request).unwrap();
        let s4 = plan.assignment_for("s4").unwrap();
        assert_eq!(s4.venue_id, "H2");
        assert_eq!(s4.label, "A1");
        assert_eq!(plan.grid_for("H1").unwrap().occupied(), 3);
        assert_eq!(plan.grids.len(), 2);
    }

    #[test]
    fn test_unused_venue_has_no_grid() {
        let venues = vec![Venue::new("H1", 2, 2), Venue::new("H2", 2, 2)];
        let request = SeatingRequest::new(day(), cohort("CS101", &["s1"]), venues);
        let plan = SeatPlanner::new().plan(&request).unwrap();
        assert_eq!(plan.grids.len(), 1);
        assert!(plan.grid_for("H2").is_none());
    }

    #[test]
    fn test_capacity_exceeded_lists_unassigned() {
        let request = SeatingRequest::new(
            day(),
            cohort("CS101", &["s1", "s2", "s3", "s4", "s5"]),
            vec![Venue::new("H1", 1, 2)],
        );
        let plan = SeatPlanner::new().plan(&request).unwrap();
        assert_eq!(plan.assigned_count(), 2);
        assert!(!plan.is_complete());
        let left: Vec<&str> = plan.unassigned.iter().map(|c| c.student_id.as_str()).collect();
        assert_eq!(left, vec!["s3", "s4", "s5"]);
    }

    #[test]
    fn test_no_venues_leaves_everyone_unassigned() {
        let request = SeatingRequest::new(day(), cohort("CS101", &["s1", "s2"]), vec![]);
        let plan = SeatPlanner::new().plan(&request).unwrap();
        assert!(plan.assignments.is_empty());
        assert_eq!(plan.unassigned.len(), 2);
    }

    #[test]
    fn test_department_filter() {
        let venues = vec![
            Venue::new("EE-1", 5, 5).with_department("EE"),
            Venue::new("CS-1", 1, 1).with_department("CS"),
            Venue::new("SHARED", 1, 5),
        ];
        let request = SeatingRequest::new(day(), cohort("CS101", &["s1", "s2"]), venues)
            .with_department("CS");
        let plan = SeatPlanner::new().plan(&request).unwrap();
        assert_eq!(plan.assignment_for("s1").unwrap().venue_id, "CS-1");
        assert_eq!(plan.assignment_for("s2").unwrap().venue_id, "SHARED");
        assert!(plan.grid_for("EE-1").is_none());
    }

    #[test]
    fn test_invalid_request() {
        let empty = SeatingRequest::new(day(), vec![], vec![Venue::new("H1", 1, 1)]);
        assert!(matches!(
            SeatPlanner::new().plan(&empty),
            Err(EngineError::InputValidation(_))
        ));

        let mut dup = cohort("CS101", &["s1"]);
        dup.extend(cohort("MA201", &["s1"]));
        let request = SeatingRequest::new(day(), dup, vec![Venue::new("H1", 2, 2)]);
        assert!(matches!(
            SeatPlanner::new().plan(&request),
            Err(EngineError::InputValidation(_))
        ));

        let bad_join = SeatingRequest::new(
            day(),
            cohort("CS101", &["s1"]),
            vec![Venue::new("H1", 2, 2).with_joined_rows([1, 4])],
        );
        assert!(SeatPlanner::new().plan(&bad_join).is_err());
    }

    #[test]
    fn test_deterministic() {
        let venues = vec![Venue::new("H1", 3, 3).with_joined_rows([2, 3])];
        let mut candidates = cohort("B", &["x", "y"]);
        candidates.extend(cohort("A", &["q", "p"]));
        let a = SeatPlanner::new()
            .plan(&SeatingRequest::new(day(), candidates.clone(), venues.clone()))
            .unwrap();
        candidates.reverse();
        let b = SeatPlanner::new()
            .plan(&SeatingRequest::new(day(), candidates, venues))
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_seats_generated_schedule_day() {
        use crate::models::DateWindow;
        use crate::scheduler::{ScheduleGenerator, ScheduleRequest};

        let courses = vec![
            Course::new("A", 1).with_students(["s1", "s2"]),
            Course::new("B", 1).with_students(["s2", "s3"]),
            Course::new("C", 2).with_students(["s4"]),
        ];
        let first = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let window = DateWindow::new(first, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        let schedule = ScheduleGenerator::new()
            .generate(&ScheduleRequest::new(courses.clone(), window))
            .unwrap();

        let request =
            SeatingRequest::from_schedule(&schedule, &courses, first, vec![Venue::new("H1", 1, 5)]);
        let plan = SeatPlanner::new().plan(&request).unwrap();
        assert_eq!(labels(&plan), vec![("s1", "A1"), ("s2", "A2"), ("s4", "A3")]);
        assert!(plan.assignments.iter().all(|a| a.date == first));
    }

    #[test]
    fn test_plan_serializes() {
        let request = SeatingRequest::new(
            day(),
            cohort("CS101", &["s1", "s2", "s3"]),
            vec![Venue::new("H1", 1, 2)],
        );
        let plan = SeatPlanner::new().plan(&request).unwrap();
        let json = serde_json::to_string(&plan).unwrap();
        let back: SeatPlan = serde_json::from_str(&json).unwrap();
        assert_eq!(back, plan);
    }

    #[test]
    fn test_random_plans_satisfy_invariants() {
        for seed in 0..30u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let students = rng.random_range(1..=60usize);
            let candidates: Vec<SeatCandidate> = (0..students)
                .map(|i| {
                    SeatCandidate::new(
                        format!("s{i:03}"),
                        format!("C{}", rng.random_range(0..4u32)),
                    )
                })
                .collect();
            let venues: Vec<Venue> = (0..rng.random_range(1..=3usize))
                .map(|v| {
                    let rows = rng.random_range(1..=5usize);
                    let cols = rng.random_range(1..=5usize);
                    let mut venue = Venue::new(format!("H{v}"), rows, cols)
                        .with_capacity(rng.random_range(1..=rows * cols));
                    if rows >= 3 {
                        venue = venue.with_joined_rows([1, rows]);
                    }
                    venue
                })
                .collect();

            let plan = SeatPlanner::new()
                .plan(&SeatingRequest::new(day(), candidates, venues.clone()))
                .unwrap();

            assert_eq!(plan.assigned_count() + plan.unassigned.len(), students, "seed {seed}");
            let mut seats = HashSet::new();
            let mut seated = HashSet::new();
            for a in &plan.assignments {
                assert!(seats.insert((a.venue_id.clone(), a.row, a.column)), "seed {seed}");
                assert!(seated.insert(a.student_id.clone()), "seed {seed}");
            }
            for venue in &venues {
                let used = plan
                    .assignments
                    .iter()
                    .filter(|a| a.venue_id == venue.id)
                    .count();
                assert!(used <= venue.effective_capacity(), "seed {seed}");
            }
        }
    }
}
