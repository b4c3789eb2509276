//! Minimum exam-window estimation.
//!
//! Finds the fewest working days a course selection needs, and names the
//! constraint that binds so callers can explain why a window is short.
//!
//! # Algorithm
//!
//! 1. Compute three analytic lower bounds:
//!
//!    | Bound | Value |
//!    |-------|-------|
//!    | Daily cap | ⌈courses / daily cap⌉ |
//!    | Semester exclusivity | max over semesters of ⌈courses in semester / semester cap⌉ |
//!    | Gap chain | max over semesters of the shortest span of any exam order |
//!
//! 2. Starting from the largest bound, run the generator's placement search
//!    on that many working days, then one more, until it succeeds. The first
//!    success is the minimum: a window of exactly that many working days
//!    schedules, one fewer does not.
//!
//! The search terminates: with every course `max spacing` days after the
//! previous one the forward pass never has to backtrack.
//!
//! # Gap chain
//! With one exam per semester per day, a semester's exams occupy distinct
//! days. Ordered by date, each exam sits at least one working day after its
//! predecessor, or its own gap if the two share students. The minimum span
//! over all orders is a shortest Hamiltonian path (Held–Karp DP) for
//! semesters up to `exact_chain_limit` courses; larger semesters fall back
//! to the sum of each course's cheapest incoming step, less the largest.
//! Only adjacent exams are charged, so the chain never overshoots.
//!
//! When the search needs more days than every analytic bound, the binding
//! constraint is reported as [`WindowBound::ConflictGraph`], naming the
//! course the search could not place one day short of the minimum.
//!
//! # Reference
//! Held & Karp (1962), "A dynamic programming approach to sequencing problems"

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, instrument};

use super::search::{placement_order, Search};
use crate::config::EngineConfig;
use crate::dispatching::RuleEngine;
use crate::models::{ConflictGraph, Course};

/// The bound that determines the estimate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowBound {
    /// No courses.
    Empty,
    /// Total exams over the daily cap.
    DailyCap,
    /// Exams of one semester over the per-semester cap.
    SemesterExclusivity { semester: u32 },
    /// Required spacing between conflicting exams of one semester.
    GapChain { semester: u32 },
    /// Spacing across the conflict graph; `course` is the one left unplaced
    /// with a single day fewer.
    ConflictGraph { course: String },
}

/// Per-course input to the estimate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseDiagnostic {
    pub course_code: String,
    pub semester: u32,
    pub student_count: usize,
    pub gap_days: u32,
    /// Number of courses sharing at least one student.
    pub conflict_degree: usize,
}

/// Result of an estimate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowEstimate {
    /// Fewest working days the generator can schedule in.
    pub minimum_working_days: usize,
    /// Constraint that produced `minimum_working_days`.
    pub binding: WindowBound,
    /// Largest analytic bound.
    pub analytic_minimum: usize,
    /// Bound that produced `analytic_minimum`.
    pub analytic_binding: WindowBound,
    /// ⌈courses / daily cap⌉.
    pub daily_cap_bound: usize,
    /// Largest per-semester exclusivity bound.
    pub semester_bound: usize,
    /// Largest per-semester chain span (0 when the semester cap exceeds 1).
    pub chain_bound: usize,
    /// Exam order achieving the chain bound of the binding semester.
    pub longest_chain: Vec<String>,
    /// One entry per course, in input order.
    pub diagnostics: Vec<CourseDiagnostic>,
}

impl WindowEstimate {
    /// Whether a window with this many working days reaches the minimum.
    pub fn fits(&self, working_days: usize) -> bool {
        working_days >= self.minimum_working_days
    }
}

/// Analytic lower bounds, computed without searching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AnalyticBounds {
    pub minimum: usize,
    pub binding: WindowBound,
    pub daily_cap_bound: usize,
    pub semester_bound: usize,
    pub chain_bound: usize,
    pub longest_chain: Vec<String>,
}

/// Finds the minimum working days a course selection needs.
#[derive(Debug, Clone, Default)]
pub struct MinimumWindowEstimator {
    config: EngineConfig,
    rule_engine: RuleEngine,
}

impl MinimumWindowEstimator {
    /// Creates an estimator with default caps and ordering.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the course ordering; must match the generator's to predict it.
    pub fn with_rule_engine(mut self, engine: RuleEngine) -> Self {
        self.rule_engine = engine;
        self
    }

    /// Estimates the minimum window.
    #[instrument(skip_all, fields(courses = courses.len()))]
    pub fn estimate(&self, courses: &[Course]) -> WindowEstimate {
        let graph = ConflictGraph::build(courses);
        self.estimate_with_graph(courses, &graph)
    }

    /// Estimates using a prebuilt conflict graph.
    pub fn estimate_with_graph(&self, courses: &[Course], graph: &ConflictGraph) -> WindowEstimate {
        let diagnostics: Vec<CourseDiagnostic> = courses
            .iter()
            .map(|c| CourseDiagnostic {
                course_code: c.code.clone(),
                semester: c.semester,
                student_count: c.student_count(),
                gap_days: c.gap_days,
                conflict_degree: graph.degree(&c.code),
            })
            .collect();

        let analytic = self.analytic_bounds(courses, graph);
        let (minimum_working_days, binding) = if courses.is_empty() {
            (0, WindowBound::Empty)
        } else {
            self.search_minimum(courses, graph, &analytic)
        };

        debug!(
            minimum_working_days,
            analytic_minimum = analytic.minimum,
            ?binding,
            "window estimated"
        );

        WindowEstimate {
            minimum_working_days,
            binding,
            analytic_minimum: analytic.minimum,
            analytic_binding: analytic.binding,
            daily_cap_bound: analytic.daily_cap_bound,
            semester_bound: analytic.semester_bound,
            chain_bound: analytic.chain_bound,
            longest_chain: analytic.longest_chain,
            diagnostics,
        }
    }

    /// Daily-cap, semester and gap-chain bounds.
    pub(crate) fn analytic_bounds(&self, courses: &[Course], graph: &ConflictGraph) -> AnalyticBounds {
        if courses.is_empty() {
            return AnalyticBounds {
                minimum: 0,
                binding: WindowBound::Empty,
                daily_cap_bound: 0,
                semester_bound: 0,
                chain_bound: 0,
                longest_chain: Vec::new(),
            };
        }

        let daily_cap_bound = div_ceil(courses.len(), self.config.daily_cap);

        let mut by_semester: BTreeMap<u32, Vec<&Course>> = BTreeMap::new();
        for c in courses {
            by_semester.entry(c.semester).or_default().push(c);
        }

        let mut semester_bound = 0;
        let mut semester_at = 0;
        for (&semester, group) in &by_semester {
            let bound = div_ceil(group.len(), self.config.semester_daily_cap);
            if bound > semester_bound {
                semester_bound = bound;
                semester_at = semester;
            }
        }

        let mut chain_bound = 0;
        let mut chain_at = 0;
        let mut longest_chain = Vec::new();
        if self.config.semester_daily_cap == 1 {
            for (&semester, group) in &by_semester {
                let (span, order) = self.chain_span(group, graph);
                if span > chain_bound {
                    chain_bound = span;
                    chain_at = semester;
                    longest_chain = order;
                }
            }
        }

        let binding = if chain_bound > semester_bound.max(daily_cap_bound) {
            WindowBound::GapChain { semester: chain_at }
        } else if semester_bound >= daily_cap_bound {
            WindowBound::SemesterExclusivity {
                semester: semester_at,
            }
        } else {
            WindowBound::DailyCap
        };

        AnalyticBounds {
            minimum: daily_cap_bound.max(semester_bound).max(chain_bound),
            binding,
            daily_cap_bound,
            semester_bound,
            chain_bound,
            longest_chain,
        }
    }

    /// Smallest day count the placement search succeeds on.
    fn search_minimum(
        &self,
        courses: &[Course],
        graph: &ConflictGraph,
        analytic: &AnalyticBounds,
    ) -> (usize, WindowBound) {
        let order = placement_order(courses, graph, &self.rule_engine);
        let widest = courses
            .iter()
            .map(|c| c.required_spacing() as usize)
            .max()
            .unwrap_or(1);
        let upper = ((courses.len() - 1) * widest + 1).max(analytic.minimum);

        let mut unplaced: Option<String> = None;
        let mut minimum = upper;
        for days in analytic.minimum..=upper {
            match Search::new(&order, graph, &self.config, days).run() {
                Ok(_) => {
                    minimum = days;
                    break;
                }
                Err(infeasible) => unplaced = Some(infeasible.course),
            }
        }

        let binding = match unplaced {
            Some(course) => WindowBound::ConflictGraph { course },
            None => analytic.binding.clone(),
        };
        (minimum, binding)
    }

    /// Shortest span (in working days, inclusive) of any exam order of one
    /// semester, and an order achieving it.
    fn chain_span(&self, group: &[&Course], graph: &ConflictGraph) -> (usize, Vec<String>) {
        let n = group.len();
        if n == 0 {
            return (0, Vec::new());
        }

        // step[p][q]: days between p and a directly following q
        let step: Vec<Vec<usize>> = (0..n)
            .map(|p| {
                (0..n)
                    .map(|q| {
                        if graph.conflicts(&group[p].code, &group[q].code) {
                            group[q].required_spacing() as usize
                        } else {
                            1
                        }
                    })
                    .collect()
            })
            .collect();

        if n <= self.config.exact_chain_limit {
            held_karp(group, &step)
        } else {
            relaxed_span(group, &step)
        }
    }
}

/// Exact minimum-cost Hamiltonian path over `step`.
fn held_karp(group: &[&Course], step: &[Vec<usize>]) -> (usize, Vec<String>) {
    let n = group.len();
    let full = (1usize << n) - 1;
    let mut cost = vec![vec![usize::MAX; n]; 1 << n];
    let mut parent = vec![vec![usize::MAX; n]; 1 << n];

    for i in 0..n {
        cost[1 << i][i] = 0;
    }

    for mask in 1..=full {
        for last in 0..n {
            let current = cost[mask][last];
            if current == usize::MAX || mask & (1 << last) == 0 {
                continue;
            }
            for next in 0..n {
                if mask & (1 << next) != 0 {
                    continue;
                }
                let next_mask = mask | (1 << next);
                let candidate = current + step[last][next];
                if candidate < cost[next_mask][next] {
                    cost[next_mask][next] = candidate;
                    parent[next_mask][next] = last;
                }
            }
        }
    }

    let mut best_last = 0;
    for last in 1..n {
        if cost[full][last] < cost[full][best_last] {
            best_last = last;
        }
    }

    let mut order = Vec::with_capacity(n);
    let mut mask = full;
    let mut node = best_last;
    loop {
        order.push(group[node].code.clone());
        let prev = parent[mask][node];
        mask &= !(1 << node);
        if prev == usize::MAX {
            break;
        }
        node = prev;
    }
    order.reverse();

    (cost[full][best_last] + 1, order)
}

/// Lower bound for large semesters: every course but the first arrives via
/// its cheapest incoming step.
fn relaxed_span(group: &[&Course], step: &[Vec<usize>]) -> (usize, Vec<String>) {
    let n = group.len();
    let mut incoming: Vec<(usize, usize)> = (0..n)
        .map(|q| {
            let cheapest = (0..n)
                .filter(|&p| p != q)
                .map(|p| step[p][q])
                .min()
                .unwrap_or(0);
            (cheapest, q)
        })
        .collect();
    incoming.sort_by(|a, b| b.0.cmp(&a.0).then(group[a.1].code.cmp(&group[b.1].code)));

    let total: usize = incoming.iter().map(|(c, _)| c).sum();
    let largest = incoming.first().map(|(c, _)| *c).unwrap_or(0);
    let order = incoming
        .iter()
        .map(|(_, q)| group[*q].code.clone())
        .collect();

    (total - largest + 1, order)
}

fn div_ceil(a: usize, b: usize) -> usize {
    if b == 0 {
        a
    } else {
        (a + b - 1) / b
    }
}
