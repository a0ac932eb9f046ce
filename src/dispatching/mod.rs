//! Dispatching rules and rule engine for population seeding.
//!
//! Rules rank whole orders; the ranked order list is expanded into a task
//! permutation that seeds the initial population with good starting
//! material.
//!
//! # Usage
//!
//! ```
//! use u_cnc_schedule::dispatching::{RuleEngine, SchedulingContext};
//! use u_cnc_schedule::dispatching::rules;
//!
//! let engine = RuleEngine::new()
//!     .with_rule(rules::Edd)
//!     .with_tie_breaker(rules::Spt);
//!
//! let context = SchedulingContext::at_time(0);
//! let ranked = engine.sort_indices(&[], &context);
//! assert!(ranked.is_empty());
//! ```
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 4
//! - Haupt (1989), "A Survey of Priority Rule-Based Scheduling"

mod context;
mod engine;
pub mod rules;

pub use context::SchedulingContext;
pub use engine::{RuleEngine, TieBreaker};

use crate::models::{Order, SeedingRule};
use std::fmt::Debug;

/// Score returned by a dispatching rule.
///
/// Lower scores = higher priority (dispatched first).
pub type RuleScore = f64;

/// A dispatching rule that evaluates order priority.
///
/// # Score Convention
/// **Lower score = higher priority.** Rules should return smaller values
/// for orders that should be produced first.
pub trait DispatchingRule: Send + Sync + Debug {
    /// Rule name (e.g., "SPT", "EDD").
    fn name(&self) -> &'static str;

    /// Evaluates the priority of an order given the current context.
    ///
    /// Returns a score where lower = higher priority.
    fn evaluate(&self, order: &Order, context: &SchedulingContext) -> RuleScore;
}

/// Rule engine implementing a seeding rule.
///
/// Every engine ends with the deterministic ID tie-breaker, so the seeded
/// permutation only depends on the input.
pub fn engine_for(rule: SeedingRule) -> RuleEngine {
    let engine = match rule {
        SeedingRule::EarliestDueDate => RuleEngine::new()
            .with_rule(rules::Edd)
            .with_tie_breaker(rules::Priority)
            .with_tie_breaker(rules::Spt),
        SeedingRule::ShortestProcessingTime => RuleEngine::new()
            .with_rule(rules::Spt)
            .with_tie_breaker(rules::Edd),
        SeedingRule::LargestQuantityFirst => RuleEngine::new()
            .with_rule(rules::Lqf)
            .with_tie_breaker(rules::Edd),
        SeedingRule::ToolGrouping => RuleEngine::new()
            .with_rule(rules::ToolGrouping)
            .with_tie_breaker(rules::Edd),
    };
    engine.with_final_tie_breaker(TieBreaker::ById)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Operation, OperationCode};

    fn order(id: &str, quantity: u32, piece_ms: i64, due: Option<i64>, tool: &str) -> Order {
        let mut o = Order::new(id, quantity).with_operation(
            Operation::new(OperationCode::OP1)
                .with_piece_duration(piece_ms)
                .with_tool(tool),
        );
        o.due_date_ms = due;
        o
    }

    fn sample_orders() -> Vec<Order> {
        vec![
            order("A", 5, 100, Some(9_000), "T1"),
            order("B", 1, 300, Some(2_000), "T2"),
            order("C", 2, 100, None, "T1"),
        ]
    }

    fn ranked(rule: SeedingRule, orders: &[Order]) -> Vec<&str> {
        let ctx = SchedulingContext::at_time(0).with_tool_groups(orders);
        engine_for(rule)
            .sort_indices(orders, &ctx)
            .into_iter()
            .map(|i| orders[i].id.as_str())
            .collect()
    }

    #[test]
    fn test_edd_seeding() {
        assert_eq!(ranked(SeedingRule::EarliestDueDate, &sample_orders()), vec!["B", "A", "C"]);
    }

    #[test]
    fn test_spt_seeding() {
        // Totals: A = 500, B = 300, C = 200
        assert_eq!(
            ranked(SeedingRule::ShortestProcessingTime, &sample_orders()),
            vec!["C", "B", "A"]
        );
    }

    #[test]
    fn test_lqf_seeding() {
        assert_eq!(
            ranked(SeedingRule::LargestQuantityFirst, &sample_orders()),
            vec!["A", "C", "B"]
        );
    }

    #[test]
    fn test_tool_grouping_keeps_shared_tools_adjacent() {
        let orders = sample_orders();
        let ids = ranked(SeedingRule::ToolGrouping, &orders);
        let a = ids.iter().position(|&id| id == "A").unwrap();
        let c = ids.iter().position(|&id| id == "C").unwrap();
        assert_eq!(a.abs_diff(c), 1);
    }
}
