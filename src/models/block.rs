//! Production block model.
//!
//! A block is a run of tasks executed consecutively on one machine behind a
//! single setup. The union of distinct tools of its tasks never exceeds the
//! machine's magazine capacity.

use serde::{Deserialize, Serialize};

use super::task::{FixtureId, ToolId};
use super::TaskKey;

/// Block identifier: position of the block in discovery order (0-based).
pub type BlockId = usize;

/// A block produced by the block builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Block ID (discovery order).
    pub id: BlockId,
    /// Index of the owning machine.
    pub machine: usize,
    /// Task indices in execution order.
    pub tasks: Vec<usize>,
    /// Sorted union of distinct tools required by the tasks.
    pub tools: Vec<ToolId>,
    /// Fixture locked by the block, if any task declared one.
    pub fixture: Option<FixtureId>,
}

impl Block {
    /// Creates an empty block on a machine.
    pub fn new(id: BlockId, machine: usize) -> Self {
        Self {
            id,
            machine,
            tasks: Vec::new(),
            tools: Vec::new(),
            fixture: None,
        }
    }

    /// Number of distinct tools loaded for this block.
    #[inline]
    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }

    /// Whether the block holds no task.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Number of tools in `tools` not yet loaded for this block.
    pub fn missing_tools(&self, tools: &[ToolId]) -> usize {
        tools
            .iter()
            .filter(|t| self.tools.binary_search(t).is_err())
            .count()
    }

    /// Appends a task and merges its tools into the block's set.
    pub fn push(&mut self, task: usize, tools: &[ToolId], fixture: Option<FixtureId>) {
        self.tasks.push(task);
        for &tool in tools {
            if let Err(pos) = self.tools.binary_search(&tool) {
                self.tools.insert(pos, tool);
            }
        }
        if self.fixture.is_none() {
            self.fixture = fixture;
        }
    }
}

/// Reporting view of a block with its machine and time window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockSummary {
    /// Block ID.
    pub id: BlockId,
    /// Assigned machine ID.
    pub machine_id: String,
    /// Tasks in execution order.
    pub tasks: Vec<TaskKey>,
    /// Distinct tools loaded for the block.
    pub distinct_tools: usize,
    /// Magazine capacity of the assigned machine.
    pub tool_capacity: u32,
    /// Setup duration charged at the block start (ms).
    pub setup_ms: i64,
    /// Setup start (absolute ms).
    pub start_ms: i64,
    /// End of the last task (absolute ms).
    pub end_ms: i64,
}

impl BlockSummary {
    /// Magazine fill ratio (0.0..=1.0).
    pub fn tool_utilization(&self) -> f64 {
        if self.tool_capacity == 0 {
            return 0.0;
        }
        self.distinct_tools as f64 / f64::from(self.tool_capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_merges_tools() {
        let mut block = Block::new(0, 1);
        assert!(block.is_empty());

        block.push(4, &[3, 1], None);
        block.push(5, &[1, 2], Some(7));
        block.push(6, &[9], Some(8));

        assert_eq!(block.tasks, vec![4, 5, 6]);
        assert_eq!(block.tools, vec![1, 2, 3, 9]);
        assert_eq!(block.tool_count(), 4);
        // First fixture wins
        assert_eq!(block.fixture, Some(7));
    }

    #[test]
    fn test_missing_tools() {
        let mut block = Block::new(0, 0);
        block.push(0, &[1, 2, 3], None);
        assert_eq!(block.missing_tools(&[2, 3]), 0);
        assert_eq!(block.missing_tools(&[3, 4, 5]), 2);
    }

    #[test]
    fn test_tool_utilization() {
        let summary = BlockSummary {
            id: 0,
            machine_id: "M1".into(),
            tasks: Vec::new(),
            distinct_tools: 9,
            tool_capacity: 12,
            setup_ms: 1_800_000,
            start_ms: 0,
            end_ms: 1_800_000,
        };
        assert!((summary.tool_utilization() - 0.75).abs() < 1e-10);
    }
}
