//! Scheduling context for dispatching rule evaluation.

use std::collections::{BTreeMap, HashMap};

use crate::models::Order;

/// Runtime scheduling state passed to dispatching rules.
///
/// All times are in milliseconds on the scenario's absolute epoch.
#[derive(Debug, Clone, Default)]
pub struct SchedulingContext {
    /// Current time (ms); the horizon start when seeding.
    pub current_time_ms: i64,
    /// Tool-group rank per order (order_id → rank).
    pub tool_groups: HashMap<String, usize>,
}

impl SchedulingContext {
    /// Creates a context at the given time.
    pub fn at_time(current_time_ms: i64) -> Self {
        Self {
            current_time_ms,
            ..Default::default()
        }
    }

    /// Ranks orders into tool groups.
    ///
    /// Orders with the same fixture and tool signature share a group.
    /// Groups are ranked by (fixture, signature) so that similar tool sets
    /// get neighbouring ranks.
    pub fn with_tool_groups(mut self, orders: &[Order]) -> Self {
        let mut groups: BTreeMap<(Option<&str>, Vec<&str>), Vec<&str>> = BTreeMap::new();
        for order in orders {
            groups
                .entry((order.fixture.as_deref(), order.tool_signature()))
                .or_default()
                .push(order.id.as_str());
        }
        for (rank, members) in groups.into_values().enumerate() {
            for id in members {
                self.tool_groups.insert(id.to_string(), rank);
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Operation, OperationCode};

    fn order(id: &str, fixture: Option<&str>, tools: &[&str]) -> Order {
        let mut o = Order::new(id, 1).with_operation(
            Operation::new(OperationCode::OP1)
                .with_duration(10)
                .with_tools(tools.iter().copied()),
        );
        o.fixture = fixture.map(str::to_string);
        o
    }

    #[test]
    fn test_tool_groups() {
        let orders = vec![
            order("A", None, &["T2", "T1"]),
            order("B", None, &["T1", "T2"]),
            order("C", Some("PAL"), &["T1", "T2"]),
            order("D", None, &["T9"]),
        ];
        let ctx = SchedulingContext::at_time(0).with_tool_groups(&orders);
        assert_eq!(ctx.tool_groups["A"], ctx.tool_groups["B"]);
        assert_ne!(ctx.tool_groups["A"], ctx.tool_groups["C"]);
        assert_ne!(ctx.tool_groups["A"], ctx.tool_groups["D"]);
        // No fixture sorts before any fixture
        assert!(ctx.tool_groups["D"] < ctx.tool_groups["C"]);
    }
}
