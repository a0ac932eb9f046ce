//! Greedy block builder.
//!
//! Single deterministic pass over a task permutation. Tasks are appended to
//! the open block while the union of distinct tools stays within the
//! block machine's magazine and no fixture conflict arises; otherwise the
//! block closes and a new one opens on the machine picked by the
//! [`MachineAssigner`].
//!
//! The builder does not bin-pack: quality across blocks comes from the
//! genetic search varying the permutation.

use super::assigner::MachineAssigner;
use crate::decomposer::TaskSet;
use crate::models::{Block, Machine, Task};

/// Block builder over one problem instance.
#[derive(Debug, Clone, Copy)]
pub struct BlockBuilder<'a> {
    tasks: &'a TaskSet,
    machines: &'a [Machine],
    setup_ms: &'a [i64],
}

impl<'a> BlockBuilder<'a> {
    /// Creates a builder.
    pub fn new(tasks: &'a TaskSet, machines: &'a [Machine], setup_ms: &'a [i64]) -> Self {
        Self {
            tasks,
            machines,
            setup_ms,
        }
    }

    /// Partitions a permutation into machine-bound blocks.
    ///
    /// Blocks are returned in discovery order; block IDs equal their index.
    pub fn build(&self, genes: &[u32]) -> Vec<Block> {
        let mut assigner = MachineAssigner::new(self.machines, self.setup_ms);
        let mut blocks: Vec<Block> = Vec::new();
        let mut current: Option<Block> = None;

        for &gene in genes {
            let index = gene as usize;
            let task = self.tasks.task(index);

            let fits = current
                .as_ref()
                .is_some_and(|block| self.accepts(block, task));

            if !fits {
                if let Some(closed) = current.take() {
                    blocks.push(closed);
                }
                let machine = assigner.open_block(task.tool_count());
                current = Some(Block::new(blocks.len(), machine));
            }

            if let Some(block) = current.as_mut() {
                block.push(index, &task.tools, task.fixture);
                assigner.add_work(block.machine, task.duration_ms);
            }
        }

        if let Some(last) = current {
            blocks.push(last);
        }
        blocks
    }

    /// Whether a task can join a block without a new setup.
    pub fn accepts(&self, block: &Block, task: &Task) -> bool {
        if let (Some(locked), Some(fixture)) = (block.fixture, task.fixture) {
            if locked != fixture {
                return false;
            }
        }
        let capacity = &self.machines[block.machine];
        capacity.can_hold(block.tool_count() + block.missing_tools(&task.tools))
    }
}
