//! Permutation decoding: blocks, machines, timeline, fitness.
//!
//! A [`Decoder`] turns a task permutation into a scored timeline through
//! three deterministic stages:
//!
//! 1. [`BlockBuilder`]: greedy partition into tool-capacity-bounded blocks
//! 2. [`MachineAssigner`]: least-loaded machine chosen when a block opens
//! 3. [`Simulation`] / [`Evaluation`]: linear layout and objective scoring
//!
//! Decoding reads only shared, immutable inputs, so any number of
//! individuals can be decoded concurrently.

mod assigner;
mod builder;
mod evaluator;

pub use assigner::MachineAssigner;
pub use builder::BlockBuilder;
pub use evaluator::{Evaluation, Simulation};

pub(crate) use evaluator::variance;

use crate::decomposer::TaskSet;
use crate::models::{Block, Machine, Scenario};

/// Decoding pipeline bound to one problem instance.
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    tasks: &'a TaskSet,
    machines: &'a [Machine],
    scenario: &'a Scenario,
    setup_ms: Vec<i64>,
}

impl<'a> Decoder<'a> {
    /// Creates a decoder. Machine setups fall back to the scenario default.
    pub fn new(tasks: &'a TaskSet, machines: &'a [Machine], scenario: &'a Scenario) -> Self {
        let setup_ms = machines
            .iter()
            .map(|m| m.setup_or(scenario.setup_duration_ms))
            .collect();
        Self {
            tasks,
            machines,
            scenario,
            setup_ms,
        }
    }

    /// Problem instance.
    #[inline]
    pub fn tasks(&self) -> &'a TaskSet {
        self.tasks
    }

    /// Machines, indexed as in blocks.
    #[inline]
    pub fn machines(&self) -> &'a [Machine] {
        self.machines
    }

    /// Run configuration.
    #[inline]
    pub fn scenario(&self) -> &'a Scenario {
        self.scenario
    }

    /// Effective per-block setup of each machine (ms).
    #[inline]
    pub fn setup_ms(&self) -> &[i64] {
        &self.setup_ms
    }

    /// Partitions a permutation into machine-bound blocks.
    pub fn build_blocks(&self, genes: &[u32]) -> Vec<Block> {
        BlockBuilder::new(self.tasks, self.machines, &self.setup_ms).build(genes)
    }

    /// Builds blocks and lays them out in time.
    pub fn simulate(&self, genes: &[u32]) -> Simulation {
        Simulation::run(self.tasks, &self.setup_ms, self.build_blocks(genes))
    }

    /// Raw measures of a permutation's timeline.
    pub fn evaluate(&self, genes: &[u32]) -> Evaluation {
        Evaluation::measure(&self.simulate(genes), self.tasks, self.scenario)
    }

    /// Scalar fitness of a permutation (lower is better).
    pub fn fitness(&self, genes: &[u32]) -> f64 {
        self.evaluate(genes).fitness(self.scenario)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decomposer::decompose;
    use crate::ga::TaskChromosome;
    use crate::models::{Operation, OperationCode, Order};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn orders() -> Vec<Order> {
        (0..4)
            .map(|i| {
                Order::new(format!("OF-{i}"), 3)
                    .with_operation(
                        Operation::new(OperationCode::OP1)
                            .with_piece_duration(600)
                            .with_tools((0..4).map(|t| format!("T{i}{t}"))),
                    )
                    .with_operation(
                        Operation::new(OperationCode::OP2)
                            .with_piece_duration(300)
                            .with_tools((4..7).map(|t| format!("T{i}{t}"))),
                    )
            })
            .collect()
    }

    #[test]
    fn test_capacity_invariant_on_random_permutations() {
        let machines = vec![Machine::new("M1", 8), Machine::new("M2", 12)];
        let set = decompose(&orders(), &machines).unwrap();
        let scenario = Scenario::default();
        let decoder = Decoder::new(&set, &machines, &scenario);
        let mut rng = SmallRng::seed_from_u64(42);

        for _ in 0..100 {
            let ind = TaskChromosome::random(set.len(), &mut rng);
            let blocks = decoder.build_blocks(ind.genes());
            let mut covered: Vec<usize> = blocks.iter().flat_map(|b| b.tasks.clone()).collect();
            covered.sort_unstable();
            assert_eq!(covered, (0..set.len()).collect::<Vec<_>>());
            for block in &blocks {
                assert!(machines[block.machine].can_hold(block.tool_count()));
            }
        }
    }

    #[test]
    fn test_no_overlap_per_machine() {
        let machines = vec![Machine::new("M1", 12), Machine::new("M2", 12)];
        let set = decompose(&orders(), &machines).unwrap();
        let scenario = Scenario::default();
        let decoder = Decoder::new(&set, &machines, &scenario);
        let mut rng = SmallRng::seed_from_u64(42);

        for _ in 0..50 {
            let ind = TaskChromosome::random(set.len(), &mut rng);
            let sim = decoder.simulate(ind.genes());
            for m in 0..machines.len() {
                let mut windows: Vec<(i64, i64)> = sim
                    .blocks
                    .iter()
                    .filter(|b| b.machine == m)
                    .flat_map(|b| b.tasks.iter().map(|&t| (sim.task_start[t], sim.task_end[t])))
                    .collect();
                windows.sort_unstable();
                for pair in windows.windows(2) {
                    assert!(pair[0].1 <= pair[1].0);
                }
            }
        }
    }

    #[test]
    fn test_machine_setup_override() {
        let machines = vec![Machine::new("M1", 12).with_setup(500)];
        let set = decompose(&orders()[..1], &machines).unwrap();
        let scenario = Scenario::default();
        let decoder = Decoder::new(&set, &machines, &scenario);
        assert_eq!(decoder.setup_ms(), &[500]);

        let eval = decoder.evaluate(TaskChromosome::identity(set.len()).genes());
        assert_eq!(eval.setup_count, 1);
        assert_eq!(eval.makespan_ms, 500 + 3 * 900);
    }

    #[test]
    fn test_fitness_is_pure() {
        let machines = vec![Machine::new("M1", 12), Machine::new("M2", 12)];
        let set = decompose(&orders(), &machines).unwrap();
        let scenario = Scenario::default();
        let decoder = Decoder::new(&set, &machines, &scenario);
        let mut rng = SmallRng::seed_from_u64(42);
        let ind = TaskChromosome::random(set.len(), &mut rng);
        assert_eq!(decoder.fitness(ind.genes()), decoder.fitness(ind.genes()));
    }
}
