//! Lexicographic rule engine.
//!
//! Ranks orders by a primary rule; later rules only decide ties left by
//! earlier ones. A final tie-breaker makes the ranking total.
//!
//! # Reference
//! Haupt (1989), "A Survey of Priority Rule-Based Scheduling"

use std::cmp::Ordering;
use std::sync::Arc;

use super::{DispatchingRule, SchedulingContext};
use crate::models::Order;

/// How ties are broken after all rules are exhausted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TieBreaker {
    /// Keep input order (stable sort).
    #[default]
    InputOrder,
    /// Deterministic by order ID (lexicographic).
    ById,
}

/// A composable rule engine for order ranking.
///
/// # Example
/// ```
/// use u_cnc_schedule::dispatching::{RuleEngine, TieBreaker};
/// use u_cnc_schedule::dispatching::rules;
///
/// let engine = RuleEngine::new()
///     .with_rule(rules::Edd)
///     .with_tie_breaker(rules::Spt)
///     .with_final_tie_breaker(TieBreaker::ById);
/// assert_eq!(engine.rule_names(), vec!["EDD", "SPT"]);
/// ```
#[derive(Clone, Default)]
pub struct RuleEngine {
    rules: Vec<Arc<dyn DispatchingRule>>,
    tie_breaker: TieBreaker,
}

impl RuleEngine {
    /// Creates an empty rule engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the primary rule, or appends one if a rule is already set.
    pub fn with_rule<R: DispatchingRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    /// Appends a rule consulted only when all earlier rules tie.
    pub fn with_tie_breaker<R: DispatchingRule + 'static>(self, rule: R) -> Self {
        self.with_rule(rule)
    }

    /// Sets the final tie-breaking strategy.
    pub fn with_final_tie_breaker(mut self, tie_breaker: TieBreaker) -> Self {
        self.tie_breaker = tie_breaker;
        self
    }

    /// Rule names in evaluation order.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Ranks orders, highest priority first.
    ///
    /// Returns indices into the original order slice.
    pub fn sort_indices(&self, orders: &[Order], context: &SchedulingContext) -> Vec<usize> {
        // One score row per order, evaluated once
        let scores: Vec<Vec<f64>> = orders
            .iter()
            .map(|o| self.rules.iter().map(|r| r.evaluate(o, context)).collect())
            .collect();

        let mut indices: Vec<usize> = (0..orders.len()).collect();
        indices.sort_by(|&a, &b| {
            scores[a]
                .iter()
                .zip(&scores[b])
                .map(|(sa, sb)| sa.total_cmp(sb))
                .find(|ord| ord.is_ne())
                .unwrap_or_else(|| self.final_tie(&orders[a], &orders[b]))
        });
        indices
    }

    fn final_tie(&self, a: &Order, b: &Order) -> Ordering {
        match self.tie_breaker {
            TieBreaker::InputOrder => Ordering::Equal,
            TieBreaker::ById => a.id.cmp(&b.id),
        }
    }
}

impl std::fmt::Debug for RuleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleEngine")
            .field("rules", &self.rule_names())
            .field("tie_breaker", &self.tie_breaker)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatching::rules;
    use crate::models::{Operation, OperationCode};

    fn make_order(id: &str, duration_ms: i64, due: Option<i64>) -> Order {
        let mut order = Order::new(id, 1)
            .with_operation(Operation::new(OperationCode::OP1).with_duration(duration_ms));
        order.due_date_ms = due;
        order
    }

    fn ids<'a>(orders: &'a [Order], indices: &[usize]) -> Vec<&'a str> {
        indices.iter().map(|&i| orders[i].id.as_str()).collect()
    }

    #[test]
    fn test_spt_ordering() {
        let orders = vec![
            make_order("long", 5000, None),
            make_order("short", 1000, None),
            make_order("medium", 3000, None),
        ];
        let ctx = SchedulingContext::at_time(0);
        let engine = RuleEngine::new().with_rule(rules::Spt);

        let indices = engine.sort_indices(&orders, &ctx);
        assert_eq!(ids(&orders, &indices), vec!["short", "medium", "long"]);
    }

    #[test]
    fn test_edd_ordering() {
        let orders = vec![
            make_order("late", 1000, Some(50_000)),
            make_order("early", 1000, Some(10_000)),
            make_order("no_deadline", 1000, None),
        ];
        let ctx = SchedulingContext::at_time(0);
        let engine = RuleEngine::new().with_rule(rules::Edd);

        let indices = engine.sort_indices(&orders, &ctx);
        assert_eq!(ids(&orders, &indices), vec!["early", "late", "no_deadline"]);
    }

    #[test]
    fn test_sequential_with_tie_breaker() {
        let orders = vec![
            make_order("B", 2000, Some(10_000)),
            make_order("A", 1000, Some(10_000)),
            make_order("C", 500, Some(20_000)),
        ];
        let ctx = SchedulingContext::at_time(0);
        let engine = RuleEngine::new()
            .with_rule(rules::Edd)
            .with_tie_breaker(rules::Spt);

        // EDD ties between A and B, SPT puts A first; C is shortest but due later
        let indices = engine.sort_indices(&orders, &ctx);
        assert_eq!(ids(&orders, &indices), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_final_tie_breakers() {
        let orders = vec![make_order("B", 1000, None), make_order("A", 1000, None)];
        let ctx = SchedulingContext::at_time(0);

        let stable = RuleEngine::new().with_rule(rules::Spt);
        assert_eq!(ids(&orders, &stable.sort_indices(&orders, &ctx)), vec!["B", "A"]);

        let by_id = stable.with_final_tie_breaker(TieBreaker::ById);
        assert_eq!(ids(&orders, &by_id.sort_indices(&orders, &ctx)), vec!["A", "B"]);
    }

    /// Scores orders by quantity on a sub-nanosecond scale.
    #[derive(Debug)]
    struct TinyQuantity;

    impl DispatchingRule for TinyQuantity {
        fn name(&self) -> &'static str {
            "TINY"
        }

        fn evaluate(&self, order: &Order, _context: &SchedulingContext) -> f64 {
            f64::from(order.quantity) * 4e-10
        }
    }

    #[test]
    fn test_close_scores_still_order() {
        let orders: Vec<Order> = [("c", 1), ("a", 3), ("b", 2)]
            .into_iter()
            .map(|(id, quantity)| {
                Order::new(id, quantity)
                    .with_operation(Operation::new(OperationCode::OP1).with_duration(1000))
            })
            .collect();
        let ctx = SchedulingContext::at_time(0);
        let engine = RuleEngine::new()
            .with_rule(TinyQuantity)
            .with_final_tie_breaker(TieBreaker::ById);

        // Neighbouring scores differ by less than 1e-9 yet never tie
        let indices = engine.sort_indices(&orders, &ctx);
        assert_eq!(ids(&orders, &indices), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_empty_orders() {
        let ctx = SchedulingContext::at_time(0);
        let engine = RuleEngine::new().with_rule(rules::Spt);
        assert!(engine.sort_indices(&[], &ctx).is_empty());
    }

    #[test]
    fn test_debug_lists_rules() {
        let engine = RuleEngine::new()
            .with_rule(rules::Lqf)
            .with_tie_breaker(rules::Edd);
        let text = format!("{engine:?}");
        assert!(text.contains("LQF"));
        assert!(text.contains("EDD"));
    }
}
