//! Course conflict graph.
//!
//! Two courses conflict iff at least one student is enrolled in both.
//! The graph is built once per run from enrollment rosters and consulted by
//! the estimator, the generator, the mutator, and the audit.
//!
//! # Construction
//! Students are bucketed to the courses they take; each bucket contributes a
//! clique: O(Σ k²) over per-student course counts k.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::Course;

/// Undirected conflict graph keyed by course code.
///
/// Every course of the input appears as a key, including isolated ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictGraph {
    adjacency: BTreeMap<String, BTreeSet<String>>,
}

impl ConflictGraph {
    /// Builds the graph from shared-student membership.
    pub fn build(courses: &[Course]) -> Self {
        let mut adjacency: BTreeMap<String, BTreeSet<String>> = courses
            .iter()
            .map(|c| (c.code.clone(), BTreeSet::new()))
            .collect();

        let mut by_student: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for course in courses {
            for student in &course.students {
                by_student
                    .entry(student.as_str())
                    .or_default()
                    .push(course.code.as_str());
            }
        }

        for codes in by_student.values() {
            for (i, a) in codes.iter().enumerate() {
                for b in &codes[i + 1..] {
                    if a == b {
                        continue;
                    }
                    if let Some(set) = adjacency.get_mut(*a) {
                        set.insert((*b).to_string());
                    }
                    if let Some(set) = adjacency.get_mut(*b) {
                        set.insert((*a).to_string());
                    }
                }
            }
        }

        Self { adjacency }
    }

    /// Courses sharing at least one student with `code`.
    pub fn neighbors(&self, code: &str) -> impl Iterator<Item = &str> {
        self.adjacency
            .get(code)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    /// Whether two courses conflict.
    pub fn conflicts(&self, a: &str, b: &str) -> bool {
        self.adjacency
            .get(a)
            .map(|set| set.contains(b))
            .unwrap_or(false)
    }

    /// Number of conflicting courses.
    pub fn degree(&self, code: &str) -> usize {
        self.adjacency.get(code).map(BTreeSet::len).unwrap_or(0)
    }

    /// Degree of every course.
    pub fn degrees(&self) -> BTreeMap<String, usize> {
        self.adjacency
            .iter()
            .map(|(code, set)| (code.clone(), set.len()))
            .collect()
    }

    /// Whether the course is known to the graph.
    pub fn contains(&self, code: &str) -> bool {
        self.adjacency.contains_key(code)
    }

    /// Number of courses (nodes).
    pub fn course_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of conflicting pairs (edges).
    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(BTreeSet::len).sum::<usize>() / 2
    }
}
