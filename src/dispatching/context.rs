//! Context passed to ordering rules.

use std::collections::BTreeMap;

use crate::models::ConflictGraph;

/// Graph-derived facts that ordering rules may consult.
#[derive(Debug, Clone, Default)]
pub struct OrderingContext {
    /// Number of conflicting courses per course code.
    pub conflict_degree: BTreeMap<String, usize>,
}

impl OrderingContext {
    /// Builds the context from a conflict graph.
    pub fn from_graph(graph: &ConflictGraph) -> Self {
        Self {
            conflict_degree: graph.degrees(),
        }
    }

    /// Sets the degree of a course.
    pub fn with_degree(mut self, course_code: impl Into<String>, degree: usize) -> Self {
        self.conflict_degree.insert(course_code.into(), degree);
        self
    }

    /// Degree of a course (0 if unknown).
    pub fn degree(&self, course_code: &str) -> usize {
        self.conflict_degree.get(course_code).copied().unwrap_or(0)
    }
}
