//! Backtracking date search shared by the generator and the estimator.
//!
//! Days are abstract working-day indices `0..day_count`; the distance
//! between two indices is their difference. The generator maps indices
//! onto the window's working dates, the estimator only asks whether some
//! `day_count` admits a complete placement.
//!
//! # First papers
//! The first course of each semester in placement order is its first paper.
//! While it is being placed it may sit *before* an already-placed
//! conflicting course without honoring that course's gap. Sitting after one,
//! it needs the full spacing like any other course.

use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use super::ConstraintKind;
use crate::config::EngineConfig;
use crate::dispatching::{OrderingContext, RuleEngine};
use crate::error::Infeasibility;
use crate::models::{ConflictGraph, Course};

/// Courses in placement order.
pub(crate) fn placement_order<'a>(
    courses: &'a [Course],
    graph: &ConflictGraph,
    engine: &RuleEngine,
) -> Vec<&'a Course> {
    let context = OrderingContext::from_graph(graph);
    engine
        .sort_indices(courses, &context)
        .into_iter()
        .map(|i| &courses[i])
        .collect()
}

/// First-paper flag per position of a placement order.
pub(crate) fn first_papers(order: &[&Course]) -> Vec<bool> {
    let mut seen = Vec::new();
    order
        .iter()
        .map(|c| {
            let first = !seen.contains(&c.semester);
            if first {
                seen.push(c.semester);
            }
            first
        })
        .collect()
}

/// Chronological backtracking over working-day indices.
pub(crate) struct Search<'a> {
    courses: &'a [&'a Course],
    config: &'a EngineConfig,
    /// Conflicting positions per position.
    neighbors: Vec<Vec<usize>>,
    first_paper: Vec<bool>,
    day_count: usize,
    placed: Vec<Option<usize>>,
    day_load: Vec<usize>,
    semester_load: HashMap<(u32, usize), usize>,
}

impl<'a> Search<'a> {
    pub(crate) fn new(
        courses: &'a [&'a Course],
        graph: &ConflictGraph,
        config: &'a EngineConfig,
        day_count: usize,
    ) -> Self {
        let position: HashMap<&str, usize> = courses
            .iter()
            .enumerate()
            .map(|(i, c)| (c.code.as_str(), i))
            .collect();
        let neighbors = courses
            .iter()
            .map(|c| {
                graph
                    .neighbors(&c.code)
                    .filter_map(|n| position.get(n).copied())
                    .collect()
            })
            .collect();

        Self {
            courses,
            config,
            neighbors,
            first_paper: first_papers(courses),
            day_count,
            placed: vec![None; courses.len()],
            day_load: vec![0; day_count],
            semester_load: HashMap::new(),
        }
    }

    /// First failing constraint class for `pos` on `day`, if any.
    fn check(&self, pos: usize, day: usize) -> Option<ConstraintKind> {
        let course = self.courses[pos];
        let semester_count = self
            .semester_load
            .get(&(course.semester, day))
            .copied()
            .unwrap_or(0);
        if semester_count >= self.config.semester_daily_cap {
            return Some(ConstraintKind::SemesterExclusivity);
        }
        if self.day_load[day] >= self.config.daily_cap {
            return Some(ConstraintKind::DailyCap);
        }
        for &other in &self.neighbors[pos] {
            let Some(other_day) = self.placed[other] else {
                continue;
            };
            if other_day == day {
                return Some(ConstraintKind::Gap);
            }
            if self.first_paper[pos] && day < other_day {
                continue;
            }
            let required = if day > other_day {
                course.required_spacing()
            } else {
                self.courses[other].required_spacing()
            } as usize;
            if day.abs_diff(other_day) < required {
                return Some(ConstraintKind::Gap);
            }
        }
        None
    }

    fn place(&mut self, pos: usize, day: usize) {
        self.placed[pos] = Some(day);
        self.day_load[day] += 1;
        *self
            .semester_load
            .entry((self.courses[pos].semester, day))
            .or_insert(0) += 1;
    }

    fn unplace(&mut self, pos: usize) {
        if let Some(day) = self.placed[pos].take() {
            self.day_load[day] -= 1;
            if let Some(n) = self
                .semester_load
                .get_mut(&(self.courses[pos].semester, day))
            {
                *n -= 1;
            }
        }
    }

    /// Runs the search; returns the day index of every position.
    pub(crate) fn run(mut self) -> Result<Vec<usize>, Infeasibility> {
        let n = self.courses.len();
        let mut next_day = vec![0usize; n];
        let mut backtracks = 0usize;
        let mut deepest: Option<(usize, BTreeMap<ConstraintKind, usize>)> = None;
        let mut pos = 0usize;

        while pos < n {
            self.unplace(pos);

            let start = next_day[pos];
            let mut tally: BTreeMap<ConstraintKind, usize> = BTreeMap::new();
            let mut found = None;
            for day in start..self.day_count {
                match self.check(pos, day) {
                    None => {
                        found = Some(day);
                        break;
                    }
                    Some(kind) => *tally.entry(kind).or_insert(0) += 1,
                }
            }

            match found {
                Some(day) => {
                    self.place(pos, day);
                    next_day[pos] = day + 1;
                    pos += 1;
                    if pos < n {
                        next_day[pos] = 0;
                    }
                }
                None => {
                    if start == 0 && deepest.as_ref().map_or(true, |(p, _)| pos > *p) {
                        deepest = Some((pos, tally));
                    }
                    if pos == 0 || backtracks >= self.config.max_backtracks {
                        break;
                    }
                    backtracks += 1;
                    next_day[pos] = 0;
                    pos -= 1;
                }
            }
        }

        if pos == n {
            debug!(days = self.day_count, backtracks, "search complete");
            return Ok(self.placed.into_iter().flatten().collect());
        }

        let (fail_pos, tally) = deepest.unwrap_or((pos, BTreeMap::new()));
        debug!(days = self.day_count, backtracks, "search exhausted");
        Err(Infeasibility::from_tally(
            self.courses[fail_pos].code.clone(),
            tally,
            backtracks,
        ))
    }
}
