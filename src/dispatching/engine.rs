//! Rule engine for multi-criteria course ordering.
//!
//! Composes multiple ordering rules with configurable evaluation modes
//! and tie-breaking strategies.

use std::cmp::Ordering;
use std::sync::Arc;

use super::{rules, OrderingContext, OrderingRule, RuleScore};
use crate::models::Course;

/// How multiple rules are combined.
#[derive(Debug, Clone, Default)]
pub enum EvaluationMode {
    /// Apply rules in sequence; use next rule only on ties.
    #[default]
    Sequential,
    /// Compute weighted sum of all rule scores.
    Weighted,
}

/// How ties are broken after all rules are exhausted.
#[derive(Debug, Clone, Default)]
pub enum TieBreaker {
    /// Keep input order (stable sort).
    #[default]
    InputOrder,
    /// Deterministic by course code (lexicographic).
    ByCode,
}

#[derive(Clone)]
struct WeightedRule {
    rule: Arc<dyn OrderingRule>,
    weight: f64,
}

/// A composable rule engine for course ordering.
///
/// # Example
/// ```
/// use exam_schedule::dispatching::{OrderingContext, RuleEngine};
/// use exam_schedule::models::Course;
///
/// let courses = vec![Course::new("B", 2), Course::new("A", 1)];
/// let order = RuleEngine::exam_default().sort_indices(&courses, &OrderingContext::default());
/// assert_eq!(order, vec![1, 0]);
/// ```
#[derive(Clone)]
pub struct RuleEngine {
    rules: Vec<WeightedRule>,
    mode: EvaluationMode,
    tie_breaker: TieBreaker,
    epsilon: f64,
}

impl RuleEngine {
    /// Creates an empty rule engine.
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            mode: EvaluationMode::Sequential,
            tie_breaker: TieBreaker::InputOrder,
            epsilon: 1e-9,
        }
    }

    /// Semester ascending, then most conflicts, then course code.
    pub fn exam_default() -> Self {
        Self::new()
            .with_rule(rules::SemesterAscending)
            .with_tie_breaker(rules::MostConflicts)
            .with_final_tie_breaker(TieBreaker::ByCode)
    }

    /// Adds a primary rule (weight 1.0).
    pub fn with_rule<R: OrderingRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(WeightedRule {
            rule: Arc::new(rule),
            weight: 1.0,
        });
        self
    }

    /// Adds a weighted rule.
    pub fn with_weighted_rule<R: OrderingRule + 'static>(mut self, rule: R, weight: f64) -> Self {
        self.rules.push(WeightedRule {
            rule: Arc::new(rule),
            weight,
        });
        self
    }

    /// Adds a tie-breaking rule (weight 0.0, used only in Sequential mode).
    pub fn with_tie_breaker<R: OrderingRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(WeightedRule {
            rule: Arc::new(rule),
            weight: 0.0,
        });
        self
    }

    /// Sets the evaluation mode.
    pub fn with_mode(mut self, mode: EvaluationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the final tie-breaking strategy.
    pub fn with_final_tie_breaker(mut self, tie_breaker: TieBreaker) -> Self {
        self.tie_breaker = tie_breaker;
        self
    }

    /// Sorts courses into placement order.
    ///
    /// Returns indices into the original slice. The sort is stable.
    pub fn sort_indices(&self, courses: &[Course], context: &OrderingContext) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..courses.len()).collect();

        match &self.mode {
            EvaluationMode::Sequential => {
                indices.sort_by(|&a, &b| self.compare_sequential(&courses[a], &courses[b], context));
            }
            EvaluationMode::Weighted => {
                let scores: Vec<f64> = courses
                    .iter()
                    .map(|c| self.weighted_score(c, context))
                    .collect();
                indices.sort_by(|&a, &b| {
                    scores[a]
                        .partial_cmp(&scores[b])
                        .unwrap_or(Ordering::Equal)
                        .then_with(|| self.final_tie(&courses[a], &courses[b]))
                });
            }
        }

        indices
    }

    /// Evaluates a single course and returns the weighted score of each rule.
    pub fn evaluate(&self, course: &Course, context: &OrderingContext) -> Vec<RuleScore> {
        self.rules
            .iter()
            .map(|wr| wr.rule.evaluate(course, context) * wr.weight)
            .collect()
    }

    fn compare_sequential(&self, a: &Course, b: &Course, context: &OrderingContext) -> Ordering {
        for wr in &self.rules {
            let score_a = wr.rule.evaluate(a, context);
            let score_b = wr.rule.evaluate(b, context);

            if (score_a - score_b).abs() > self.epsilon {
                return score_a.partial_cmp(&score_b).unwrap_or(Ordering::Equal);
            }
        }

        self.final_tie(a, b)
    }

    fn final_tie(&self, a: &Course, b: &Course) -> Ordering {
        match &self.tie_breaker {
            TieBreaker::InputOrder => Ordering::Equal,
            TieBreaker::ByCode => a.code.cmp(&b.code),
        }
    }

    fn weighted_score(&self, course: &Course, context: &OrderingContext) -> f64 {
        self.rules
            .iter()
            .map(|wr| wr.rule.evaluate(course, context) * wr.weight)
            .sum()
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::exam_default()
    }
}

impl std::fmt::Debug for RuleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleEngine")
            .field(
                "rules",
                &self
                    .rules
                    .iter()
                    .map(|r| format!("{}(w={})", r.rule.name(), r.weight))
                    .collect::<Vec<_>>(),
            )
            .field("mode", &self.mode)
            .field("tie_breaker", &self.tie_breaker)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatching::rules;

    fn codes(courses: &[Course], order: &[usize]) -> Vec<String> {
        order.iter().map(|&i| courses[i].code.clone()).collect()
    }

    #[test]
    fn test_exam_default_ordering() {
        let courses = vec![
            Course::new("B2", 2),
            Course::new("A1", 1),
            Course::new("C1", 1),
            Course::new("D1", 1),
        ];
        let ctx = OrderingContext::default()
            .with_degree("C1", 3)
            .with_degree("A1", 1)
            .with_degree("D1", 1);
        let order = RuleEngine::exam_default().sort_indices(&courses, &ctx);
        // Semester 1 first; C1 has most conflicts; A1/D1 tie → by code
        assert_eq!(codes(&courses, &order), vec!["C1", "A1", "D1", "B2"]);
    }

    #[test]
    fn test_input_order_is_stable() {
        let courses = vec![Course::new("Z", 1), Course::new("A", 1)];
        let engine = RuleEngine::new().with_rule(rules::SemesterAscending);
        let order = engine.sort_indices(&courses, &OrderingContext::default());
        assert_eq!(order, vec![0, 1]);
    }

    #[test]
    fn test_weighted_mode() {
        let courses = vec![
            Course::new("A", 1).with_gap_days(1),
            Course::new("B", 2).with_gap_days(5),
        ];
        let engine = RuleEngine::new()
            .with_mode(EvaluationMode::Weighted)
            .with_weighted_rule(rules::SemesterAscending, 1.0)
            .with_weighted_rule(rules::TightestGap, 1.0);
        // A: 1 - 1 = 0, B: 2 - 5 = -3 → B first
        let order = engine.sort_indices(&courses, &OrderingContext::default());
        assert_eq!(codes(&courses, &order), vec!["B", "A"]);
    }

    #[test]
    fn test_evaluate_scores() {
        let course = Course::new("A", 3).with_students(["s1", "s2"]);
        let engine = RuleEngine::new()
            .with_rule(rules::SemesterAscending)
            .with_tie_breaker(rules::LargestEnrollment);
        let scores = engine.evaluate(&course, &OrderingContext::default());
        assert_eq!(scores.len(), 2);
        assert!((scores[0] - 3.0).abs() < 1e-10);
        assert!(scores[1].abs() < 1e-10); // tie-breaker weight 0
    }

    #[test]
    fn test_empty_courses() {
        let order = RuleEngine::default().sort_indices(&[], &OrderingContext::default());
        assert!(order.is_empty());
    }

    #[test]
    fn test_debug_lists_rules() {
        let dbg = format!("{:?}", RuleEngine::exam_default());
        assert!(dbg.contains("SEMESTER"));
        assert!(dbg.contains("CONFLICTS"));
    }
}
