//! Block scheduling GA problem definition.
//!
//! Implements `u_metaheur::ga::GaProblem` for CNC block scheduling:
//! permutations are decoded through the block builder, machine assigner
//! and evaluator.

use log::debug;
use rand::Rng;
use u_metaheur::ga::GaProblem;

use super::chromosome::TaskChromosome;
use super::operators::GeneticOperators;
use crate::decoder::Decoder;
use crate::dispatching::{self, SchedulingContext};
use crate::models::SeedingRule;

/// GA problem for block-based CNC scheduling.
///
/// # Example
/// ```no_run
/// use u_cnc_schedule::decoder::Decoder;
/// use u_cnc_schedule::decomposer::decompose;
/// use u_cnc_schedule::ga::{BlockSchedulingProblem, CancellationToken, Evolution, EvolutionConfig};
/// use u_cnc_schedule::models::{Machine, Scenario};
///
/// let orders = vec![/* ... */];
/// let machines = vec![Machine::new("M1", 12)];
/// let scenario = Scenario::default();
/// let tasks = decompose(&orders, &machines).unwrap();
/// let decoder = Decoder::new(&tasks, &machines, &scenario);
/// let problem = BlockSchedulingProblem::new(decoder);
/// let seeds = vec![problem.seeded().clone()];
/// let config = EvolutionConfig::from_scenario(&scenario);
/// let result = Evolution::run_seeded(&problem, &config, seeds, &CancellationToken::new());
/// ```
pub struct BlockSchedulingProblem<'a> {
    decoder: Decoder<'a>,
    operators: GeneticOperators,
    seeded: TaskChromosome,
    group_of: Vec<usize>,
}

impl<'a> BlockSchedulingProblem<'a> {
    /// Creates the problem; operators and seeding rule come from the scenario.
    pub fn new(decoder: Decoder<'a>) -> Self {
        let scenario = decoder.scenario();
        let operators = GeneticOperators::new(scenario.crossover, scenario.mutation);
        let seeded = seeded_individual(&decoder, scenario.effective_seeding_rule());
        let group_of = decoder
            .tasks()
            .tasks()
            .iter()
            .map(|t| t.order_index)
            .collect();

        Self {
            decoder,
            operators,
            seeded,
            group_of,
        }
    }

    /// Decoder used for evaluation.
    pub fn decoder(&self) -> &Decoder<'a> {
        &self.decoder
    }

    /// Rule-seeded chromosome placed first in the initial population.
    pub fn seeded(&self) -> &TaskChromosome {
        &self.seeded
    }
}

/// Builds the permutation implied by a seeding rule.
pub fn seeded_individual(decoder: &Decoder<'_>, rule: SeedingRule) -> TaskChromosome {
    let tasks = decoder.tasks();
    let context = SchedulingContext::at_time(decoder.scenario().horizon_start_ms)
        .with_tool_groups(tasks.orders());
    let engine = dispatching::engine_for(rule);
    debug!("seeding with {rule:?}: {engine:?}");
    let order_sequence = engine.sort_indices(tasks.orders(), &context);
    TaskChromosome::from_order_sequence(tasks, &order_sequence)
}

impl GaProblem for BlockSchedulingProblem<'_> {
    type Individual = TaskChromosome;

    fn create_individual<R: Rng>(&self, rng: &mut R) -> TaskChromosome {
        TaskChromosome::random(self.decoder.tasks().len(), rng)
    }

    fn evaluate(&self, individual: &TaskChromosome) -> f64 {
        self.decoder.fitness(individual.genes())
    }

    fn crossover<R: Rng>(
        &self,
        parent1: &TaskChromosome,
        parent2: &TaskChromosome,
        rng: &mut R,
    ) -> Vec<TaskChromosome> {
        let (c1, c2) = self
            .operators
            .crossover(parent1, parent2, &self.group_of, rng);
        vec![c1, c2]
    }

    fn mutate<R: Rng>(&self, individual: &mut TaskChromosome, rng: &mut R) {
        self.operators.mutate(individual, rng);
    }
}
