//! Atomic task model.
//!
//! A task is one (order, piece, operation) triple: the unit the scheduler
//! places in time. Tasks are produced by the decomposer and never persisted
//! on their own; the composite [`TaskKey`] addresses them.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::OperationCode;

/// Dense tool index into the decomposer's tool table.
pub type ToolId = u32;

/// Dense fixture index into the decomposer's fixture table.
pub type FixtureId = u32;

/// Structured task identifier: (order id, piece index, operation code).
///
/// Rendered as `"<order>-P<n> <OPk>"` with a 1-based piece number,
/// e.g. `OF-00185-P42 OP1`. The string form is for reporting only.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaskKey {
    /// Parent order ID.
    pub order_id: String,
    /// Piece index in `[0, quantity)`.
    pub piece: u32,
    /// Operation code.
    pub operation: OperationCode,
}

impl TaskKey {
    /// Creates a task key.
    pub fn new(order_id: impl Into<String>, piece: u32, operation: OperationCode) -> Self {
        Self {
            order_id: order_id.into(),
            piece,
            operation,
        }
    }
}

impl fmt::Display for TaskKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-P{} {}", self.order_id, self.piece + 1, self.operation)
    }
}

/// An atomic schedulable task.
#[derive(Debug, Clone)]
pub struct Task {
    /// Composite key.
    pub key: TaskKey,
    /// Index of the parent order in the decomposer's order list.
    pub order_index: usize,
    /// Position of the operation in the order's routing (0-based).
    pub operation_index: usize,
    /// Processing time of this piece operation, loading and table rotation included (ms).
    pub duration_ms: i64,
    /// Sorted, deduplicated tool IDs.
    pub tools: Vec<ToolId>,
    /// Fixture lock, if the order declares one.
    pub fixture: Option<FixtureId>,
    /// Task index of the same piece's previous operation.
    pub predecessor: Option<usize>,
}

impl Task {
    /// Number of distinct tools this task needs.
    #[inline]
    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }

    /// Whether this is the last operation of its piece.
    pub fn is_last_operation(&self, operation_count: usize) -> bool {
        self.operation_index + 1 == operation_count
    }
}
