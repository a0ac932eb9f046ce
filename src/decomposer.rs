//! Task decomposition.
//!
//! Expands every order into its atomic (order, piece, operation) tasks.
//! The resulting [`TaskSet`] is the read-only problem instance shared by
//! every individual of a run: encodings index into `tasks`, blocks carry
//! tool IDs from its tool table.
//!
//! # Ordering
//!
//! Tasks are laid out by order ID ascending, then piece index ascending,
//! then operation as declared. The tasks of one order therefore occupy a
//! contiguous index range, and the tasks of one piece are adjacent.

use std::collections::HashMap;
use std::ops::Range;

use crate::error::ScheduleError;
use crate::models::{FixtureId, Machine, Order, Task, TaskKey, ToolId};
use crate::validation::validate_orders;

/// Decomposed problem instance.
#[derive(Debug, Clone)]
pub struct TaskSet {
    tasks: Vec<Task>,
    orders: Vec<Order>,
    order_tasks: Vec<Range<usize>>,
    tool_names: Vec<String>,
    fixture_names: Vec<String>,
}

/// Validates the orders and expands them into tasks.
///
/// # Errors
/// [`ScheduleError::InvalidOrderData`] when any order is malformed or
/// needs more tools than every machine holds.
pub fn decompose(orders: &[Order], machines: &[Machine]) -> Result<TaskSet, ScheduleError> {
    validate_orders(orders, machines).map_err(ScheduleError::InvalidOrderData)?;

    let mut sorted: Vec<Order> = orders.to_vec();
    sorted.sort_by(|a, b| a.id.cmp(&b.id));

    let mut tools = Interner::default();
    let mut fixtures = Interner::default();
    let mut tasks = Vec::with_capacity(sorted.iter().map(Order::task_count).sum());
    let mut order_tasks = Vec::with_capacity(sorted.len());

    for (order_index, order) in sorted.iter().enumerate() {
        let first = tasks.len();
        let fixture = order.fixture.as_deref().map(|f| fixtures.intern(f));

        // Tool IDs and durations are identical for every piece of the order
        let routing: Vec<(Vec<ToolId>, i64)> = order
            .operations
            .iter()
            .map(|op| {
                let mut ids: Vec<ToolId> = op.tools.iter().map(|t| tools.intern(t)).collect();
                ids.sort_unstable();
                ids.dedup();
                (ids, op.unit_duration_ms(order.quantity) + order.load_ms + order.rotation_ms)
            })
            .collect();

        for piece in 0..order.quantity {
            for (operation_index, (op, (tool_ids, duration_ms))) in
                order.operations.iter().zip(&routing).enumerate()
            {
                let index = tasks.len();
                let predecessor = (operation_index > 0).then(|| index - 1);
                tasks.push(Task {
                    key: TaskKey::new(order.id.clone(), piece, op.code),
                    order_index,
                    operation_index,
                    duration_ms: *duration_ms,
                    tools: tool_ids.clone(),
                    fixture,
                    predecessor,
                });
            }
        }

        order_tasks.push(first..tasks.len());
    }

    Ok(TaskSet {
        tasks,
        orders: sorted,
        order_tasks,
        tool_names: tools.names,
        fixture_names: fixtures.names,
    })
}

impl TaskSet {
    /// All tasks in decomposition order.
    #[inline]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Task by index.
    #[inline]
    pub fn task(&self, index: usize) -> &Task {
        &self.tasks[index]
    }

    /// Number of tasks.
    #[inline]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether there are no tasks.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Orders sorted by ID.
    #[inline]
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// Order owning a task.
    #[inline]
    pub fn order_of(&self, task: &Task) -> &Order {
        &self.orders[task.order_index]
    }

    /// Task index range of an order.
    pub fn order_task_range(&self, order_index: usize) -> Range<usize> {
        self.order_tasks[order_index].clone()
    }

    /// Position of an order by ID.
    pub fn order_index(&self, order_id: &str) -> Option<usize> {
        self.orders
            .binary_search_by(|o| o.id.as_str().cmp(order_id))
            .ok()
    }

    /// Total number of pieces across all orders.
    pub fn piece_count(&self) -> usize {
        self.orders.iter().map(|o| o.quantity as usize).sum()
    }

    /// Sum of task durations (ms), setups excluded.
    pub fn total_work_ms(&self) -> i64 {
        self.tasks.iter().map(|t| t.duration_ms).sum()
    }

    /// Tool name for a tool ID.
    pub fn tool_name(&self, id: ToolId) -> Option<&str> {
        self.tool_names.get(id as usize).map(String::as_str)
    }

    /// Number of distinct tools across all orders.
    pub fn tool_count(&self) -> usize {
        self.tool_names.len()
    }

    /// Fixture name for a fixture ID.
    pub fn fixture_name(&self, id: FixtureId) -> Option<&str> {
        self.fixture_names.get(id as usize).map(String::as_str)
    }
}

/// Dense string interner; IDs follow first appearance.
#[derive(Default)]
struct Interner {
    ids: HashMap<String, u32>,
    names: Vec<String>,
}

impl Interner {
    fn intern(&mut self, name: &str) -> u32 {
        if let Some(&id) = self.ids.get(name) {
            return id;
        }
        let id = self.names.len() as u32;
        self.ids.insert(name.to_string(), id);
        self.names.push(name.to_string());
        id
    }
}
