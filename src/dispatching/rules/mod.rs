//! Built-in dispatching rules.
//!
//! # Categories
//!
//! - **Time-based**: SPT
//! - **Due-date**: EDD
//! - **Volume**: LQF
//! - **Tooling**: TOOL_GROUPING
//! - **Priority**: PRIORITY
//!
//! # Score Convention
//! All rules return lower scores for higher priority orders.
//!
//! # References
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 4
//! - Haupt (1989), "A Survey of Priority Rule-Based Scheduling"

use super::{DispatchingRule, RuleScore, SchedulingContext};
use crate::models::Order;

// ======================== Time-based rules ========================

/// Shortest Processing Time.
///
/// Prioritizes orders with shorter total processing time.
/// Minimizes average flow time and WIP (Work-In-Process).
///
/// # Reference
/// Smith (1956), optimal for minimizing mean flow time on single machine.
#[derive(Debug, Clone, Copy)]
pub struct Spt;

impl DispatchingRule for Spt {
    fn name(&self) -> &'static str {
        "SPT"
    }

    fn evaluate(&self, order: &Order, _context: &SchedulingContext) -> RuleScore {
        order.total_duration_ms() as f64
    }
}

// ======================== Due-date rules ========================

/// Earliest Due Date.
///
/// Scores the time left until the due date. Orders without a due date
/// are assigned lowest priority.
///
/// # Reference
/// Jackson (1955), optimal for minimizing maximum lateness on single machine.
#[derive(Debug, Clone, Copy)]
pub struct Edd;

impl DispatchingRule for Edd {
    fn name(&self) -> &'static str {
        "EDD"
    }

    fn evaluate(&self, order: &Order, context: &SchedulingContext) -> RuleScore {
        order
            .due_date_ms
            .map(|d| (d - context.current_time_ms) as f64)
            .unwrap_or(f64::MAX)
    }
}

// ======================== Volume / tooling rules ========================

/// Largest Quantity First.
///
/// Large series first: they dominate throughput and fill blocks well.
#[derive(Debug, Clone, Copy)]
pub struct Lqf;

impl DispatchingRule for Lqf {
    fn name(&self) -> &'static str {
        "LQF"
    }

    fn evaluate(&self, order: &Order, _context: &SchedulingContext) -> RuleScore {
        -f64::from(order.quantity)
    }
}

/// Tool grouping.
///
/// Ranks orders by the tool group recorded in
/// `context.tool_groups`, so orders sharing a fixture and tool set are
/// dispatched back to back and land in the same block. Ungrouped orders
/// come last.
#[derive(Debug, Clone, Copy)]
pub struct ToolGrouping;

impl DispatchingRule for ToolGrouping {
    fn name(&self) -> &'static str {
        "TOOL_GROUPING"
    }

    fn evaluate(&self, order: &Order, context: &SchedulingContext) -> RuleScore {
        context
            .tool_groups
            .get(&order.id)
            .map(|&rank| rank as f64)
            .unwrap_or(f64::MAX)
    }
}

// ======================== Priority rule ========================

/// Order priority.
///
/// Higher `priority` values are dispatched first.
#[derive(Debug, Clone, Copy)]
pub struct Priority;

impl DispatchingRule for Priority {
    fn name(&self) -> &'static str {
        "PRIORITY"
    }

    fn evaluate(&self, order: &Order, _context: &SchedulingContext) -> RuleScore {
        -f64::from(order.priority)
    }
}
