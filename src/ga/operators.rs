//! Configurable genetic operators for block scheduling.
//!
//! Provides runtime-selectable crossover and mutation strategies
//! via [`GeneticOperators`], plus tournament selection.
//!
//! # Usage
//!
//! ```
//! use u_cnc_schedule::ga::operators::{GeneticOperators, CrossoverType, MutationType};
//!
//! let ops = GeneticOperators::default();
//! assert_eq!(ops.crossover_type, CrossoverType::Ox);
//! assert_eq!(ops.mutation_type, MutationType::Swap);
//! ```

use rand::Rng;
use serde::{Deserialize, Serialize};
use u_metaheur::ga::Individual;

use super::chromosome::{
    TaskChromosome, insert_mutation, invert_mutation, ox_crossover, pox_crossover, swap_mutation,
};

/// Crossover strategy for permutation chromosomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossoverType {
    /// Two-point Order Crossover (Davis, 1985).
    #[default]
    Ox,
    /// Precedence Operation Crossover at order granularity (Bierwirth et al., 1996).
    Pox,
}

/// Mutation strategy for permutation chromosomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationType {
    /// Swap two random positions.
    #[default]
    Swap,
    /// Remove and reinsert at a random position.
    Insert,
    /// Reverse a random segment.
    Invert,
}

/// Runtime-selectable genetic operators.
///
/// Wraps crossover and mutation strategy selection so that the scenario
/// can switch operators without changing the problem definition.
///
/// # Example
///
/// ```
/// use u_cnc_schedule::ga::operators::{GeneticOperators, CrossoverType, MutationType};
///
/// let ops = GeneticOperators {
///     crossover_type: CrossoverType::Pox,
///     mutation_type: MutationType::Invert,
/// };
/// ```
#[derive(Debug, Clone, Default)]
pub struct GeneticOperators {
    /// Crossover strategy.
    pub crossover_type: CrossoverType,
    /// Mutation strategy.
    pub mutation_type: MutationType,
}

impl GeneticOperators {
    /// Creates operators with the given strategies.
    pub fn new(crossover_type: CrossoverType, mutation_type: MutationType) -> Self {
        Self {
            crossover_type,
            mutation_type,
        }
    }

    /// Performs crossover using the configured strategy.
    ///
    /// `group_of` maps each gene to its order index (used by POX).
    pub fn crossover<R: Rng>(
        &self,
        p1: &TaskChromosome,
        p2: &TaskChromosome,
        group_of: &[usize],
        rng: &mut R,
    ) -> (TaskChromosome, TaskChromosome) {
        match self.crossover_type {
            CrossoverType::Ox => ox_crossover(p1, p2, rng),
            CrossoverType::Pox => pox_crossover(p1, p2, group_of, rng),
        }
    }

    /// Performs mutation using the configured strategy.
    pub fn mutate<R: Rng>(&self, individual: &mut TaskChromosome, rng: &mut R) {
        match self.mutation_type {
            MutationType::Swap => swap_mutation(individual, rng),
            MutationType::Insert => insert_mutation(individual, rng),
            MutationType::Invert => invert_mutation(individual, rng),
        }
    }
}

/// Tournament selection.
///
/// Samples `size` distinct individuals uniformly and returns the index of
/// the one with the lowest fitness. Unscored individuals never win against
/// scored ones.
pub fn tournament_select<I, R>(population: &[I], size: usize, rng: &mut R) -> usize
where
    I: Individual<Fitness = f64>,
    R: Rng,
{
    let len = population.len();
    let size = size.clamp(1, len.max(1));
    if len <= 1 {
        return 0;
    }

    let score = |i: usize| population[i].fitness();
    rand::seq::index::sample(rng, len, size)
        .into_iter()
        .min_by(|&a, &b| score(a).total_cmp(&score(b)).then(a.cmp(&b)))
        .unwrap_or(0)
}
