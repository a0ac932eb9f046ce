//! Permutation chromosome for block scheduling.
//!
//! # Encoding
//!
//! An individual is a permutation of task indices `0..n`. Its position in
//! the permutation is the order in which the block builder consumes the
//! task. Precedence is not encoded; the evaluator penalises orderings
//! that put a piece's later operation ahead of its earlier one in time.
//!
//! Crossover and mutation operators are closed over permutations: every
//! child they produce is again a permutation of the same task set.
//!
//! # Reference
//! Davis (1985), "Applying adaptive algorithms to epistatic domains" (OX)

use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;
use u_metaheur::ga::Individual;

use crate::decomposer::TaskSet;

/// A candidate solution: task permutation plus cached fitness.
///
/// Lower fitness = better schedule (minimization convention). An unscored
/// chromosome carries `f64::INFINITY`.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskChromosome {
    genes: Vec<u32>,
    fitness: f64,
}

impl Individual for TaskChromosome {
    type Fitness = f64;

    fn fitness(&self) -> f64 {
        self.fitness
    }

    fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }
}

impl TaskChromosome {
    /// Creates an unscored chromosome from raw genes.
    pub fn new(genes: Vec<u32>) -> Self {
        Self {
            genes,
            fitness: f64::INFINITY,
        }
    }

    /// Identity permutation `0..n`.
    pub fn identity(n: usize) -> Self {
        Self::new((0..n as u32).collect())
    }

    /// Uniformly shuffled permutation of `0..n`.
    pub fn random<R: Rng>(n: usize, rng: &mut R) -> Self {
        let mut genes: Vec<u32> = (0..n as u32).collect();
        genes.shuffle(rng);
        Self::new(genes)
    }

    /// Permutation listing the tasks of each order in the given order
    /// sequence, pieces in sequence within each order.
    pub fn from_order_sequence(tasks: &TaskSet, order_sequence: &[usize]) -> Self {
        let genes = order_sequence
            .iter()
            .flat_map(|&o| tasks.order_task_range(o))
            .map(|t| t as u32)
            .collect();
        Self::new(genes)
    }

    /// Task indices in consumption order.
    #[inline]
    pub fn genes(&self) -> &[u32] {
        &self.genes
    }

    /// Mutable genes. Clears the cached fitness.
    pub fn genes_mut(&mut self) -> &mut Vec<u32> {
        self.fitness = f64::INFINITY;
        &mut self.genes
    }

    /// Number of genes.
    #[inline]
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    /// Whether the individual has no genes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Whether a fitness is cached.
    #[inline]
    pub fn is_scored(&self) -> bool {
        self.fitness.is_finite()
    }

    /// Whether the genes are a permutation of `0..n`.
    pub fn is_permutation(&self, n: usize) -> bool {
        if self.genes.len() != n {
            return false;
        }
        let mut seen = vec![false; n];
        for &g in &self.genes {
            match seen.get_mut(g as usize) {
                Some(slot) if !*slot => *slot = true,
                _ => return false,
            }
        }
        true
    }
}

// ======================== Crossover operators ========================

/// Performs OX (Order Crossover) with two random cut points.
///
/// Each child keeps the segment between the cuts from one parent and
/// fills the remaining slots, starting after the second cut, with the
/// other parent's genes in their relative order.
pub fn ox_crossover<R: Rng>(
    p1: &TaskChromosome,
    p2: &TaskChromosome,
    rng: &mut R,
) -> (TaskChromosome, TaskChromosome) {
    let len = p1.len();
    if len < 2 {
        return (TaskChromosome::new(p1.genes.clone()), TaskChromosome::new(p2.genes.clone()));
    }

    let mut i = rng.random_range(0..len);
    let mut j = rng.random_range(0..len);
    if i > j {
        std::mem::swap(&mut i, &mut j);
    }

    (
        TaskChromosome::new(ox_build_child(&p1.genes, &p2.genes, i, j)),
        TaskChromosome::new(ox_build_child(&p2.genes, &p1.genes, i, j)),
    )
}

fn ox_build_child(template: &[u32], donor: &[u32], i: usize, j: usize) -> Vec<u32> {
    let len = template.len();
    let mut child = vec![0u32; len];
    let mut taken = vec![false; len];

    for k in i..=j {
        child[k] = template[k];
        taken[template[k] as usize] = true;
    }

    let mut slot = (j + 1) % len;
    for step in 0..len {
        let gene = donor[(j + 1 + step) % len];
        if taken[gene as usize] {
            continue;
        }
        child[slot] = gene;
        taken[gene as usize] = true;
        slot = (slot + 1) % len;
    }
    child
}

/// Performs POX (Precedence Operation Crossover) at order granularity.
///
/// Selects a random subset of orders; their tasks keep their positions
/// from parent 1, remaining slots are filled from parent 2 in order.
/// `group_of` maps a gene to its order index.
///
/// # Reference
/// Bierwirth et al. (1996)
pub fn pox_crossover<R: Rng>(
    p1: &TaskChromosome,
    p2: &TaskChromosome,
    group_of: &[usize],
    rng: &mut R,
) -> (TaskChromosome, TaskChromosome) {
    let group_count = group_of.iter().max().map_or(0, |&g| g + 1);
    if group_count < 2 {
        return (TaskChromosome::new(p1.genes.clone()), TaskChromosome::new(p2.genes.clone()));
    }

    let set_size = rng.random_range(1..group_count);
    let selected: HashSet<usize> =
        rand::seq::index::sample(rng, group_count, set_size).into_iter().collect();

    (
        TaskChromosome::new(pox_build_child(&p1.genes, &p2.genes, group_of, &selected)),
        TaskChromosome::new(pox_build_child(&p2.genes, &p1.genes, group_of, &selected)),
    )
}

fn pox_build_child(
    template: &[u32],
    donor: &[u32],
    group_of: &[usize],
    selected: &HashSet<usize>,
) -> Vec<u32> {
    let is_selected = |g: u32| selected.contains(&group_of[g as usize]);
    let mut donor_iter = donor.iter().copied().filter(|&g| !is_selected(g));

    template
        .iter()
        .map(|&gene| {
            if is_selected(gene) {
                gene
            } else {
                // Both parents hold the same unselected genes, so the donor never runs dry
                donor_iter.next().unwrap_or(gene)
            }
        })
        .collect()
}

// ======================== Mutation operators ========================

/// Swap mutation: exchanges two distinct random positions.
pub fn swap_mutation<R: Rng>(individual: &mut TaskChromosome, rng: &mut R) {
    let len = individual.len();
    if len < 2 {
        return;
    }
    let i = rng.random_range(0..len);
    let mut j = rng.random_range(0..len - 1);
    if j >= i {
        j += 1;
    }
    individual.genes_mut().swap(i, j);
}

/// Insert mutation: removes a gene and reinserts it at a random position.
pub fn insert_mutation<R: Rng>(individual: &mut TaskChromosome, rng: &mut R) {
    let len = individual.len();
    if len < 2 {
        return;
    }
    let from = rng.random_range(0..len);
    let to = rng.random_range(0..len);
    let genes = individual.genes_mut();
    let gene = genes.remove(from);
    genes.insert(to, gene);
}

/// Invert mutation: reverses a random segment.
pub fn invert_mutation<R: Rng>(individual: &mut TaskChromosome, rng: &mut R) {
    let len = individual.len();
    if len < 2 {
        return;
    }
    let mut i = rng.random_range(0..len);
    let mut j = rng.random_range(0..len);
    if i > j {
        std::mem::swap(&mut i, &mut j);
    }
    individual.genes_mut()[i..=j].reverse();
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    // Three orders of 4, 3 and 5 genes
    fn groups() -> Vec<usize> {
        vec![0, 0, 0, 0, 1, 1, 1, 2, 2, 2, 2, 2]
    }

    #[test]
    fn test_random_individual() {
        let mut rng = SmallRng::seed_from_u64(42);
        let ind = TaskChromosome::random(12, &mut rng);
        assert_eq!(ind.len(), 12);
        assert!(ind.is_permutation(12));
        assert!(!ind.is_scored());
    }

    #[test]
    fn test_is_permutation_rejects_duplicates() {
        assert!(TaskChromosome::identity(3).is_permutation(3));
        assert!(!TaskChromosome::new(vec![0, 0, 2]).is_permutation(3));
        assert!(!TaskChromosome::new(vec![0, 1, 3]).is_permutation(3));
        assert!(!TaskChromosome::new(vec![0, 1]).is_permutation(3));
    }

    #[test]
    fn test_genes_mut_clears_fitness() {
        let mut ind = TaskChromosome::identity(4);
        ind.set_fitness(10.0);
        assert_eq!(ind.fitness(), 10.0);
        assert!(ind.is_scored());
        ind.genes_mut().swap(0, 1);
        assert!(!ind.is_scored());
    }

    #[test]
    fn test_ox_keeps_permutation() {
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..200 {
            let p1 = TaskChromosome::random(12, &mut rng);
            let p2 = TaskChromosome::random(12, &mut rng);
            let (c1, c2) = ox_crossover(&p1, &p2, &mut rng);
            assert!(c1.is_permutation(12));
            assert!(c2.is_permutation(12));
            assert!(!c1.is_scored());
        }
    }

    #[test]
    fn test_ox_preserves_segment() {
        let p1 = TaskChromosome::new(vec![0, 1, 2, 3, 4, 5, 6, 7]);
        let p2 = TaskChromosome::new(vec![7, 6, 5, 4, 3, 2, 1, 0]);
        let child = ox_build_child(&p1.genes, &p2.genes, 2, 4);
        assert_eq!(&child[2..=4], &[2, 3, 4]);
        // Remaining slots from p2 order after the cut: 1, 0, 7, 6, 5
        assert_eq!(child, vec![6, 5, 2, 3, 4, 1, 0, 7]);
    }

    #[test]
    fn test_pox_keeps_permutation() {
        let mut rng = SmallRng::seed_from_u64(42);
        let groups = groups();
        for _ in 0..200 {
            let p1 = TaskChromosome::random(12, &mut rng);
            let p2 = TaskChromosome::random(12, &mut rng);
            let (c1, c2) = pox_crossover(&p1, &p2, &groups, &mut rng);
            assert!(c1.is_permutation(12));
            assert!(c2.is_permutation(12));
        }
    }

    #[test]
    fn test_pox_single_group_copies_parents() {
        let mut rng = SmallRng::seed_from_u64(42);
        let p1 = TaskChromosome::random(4, &mut rng);
        let p2 = TaskChromosome::random(4, &mut rng);
        let (c1, c2) = pox_crossover(&p1, &p2, &[0, 0, 0, 0], &mut rng);
        assert_eq!(c1.genes(), p1.genes());
        assert_eq!(c2.genes(), p2.genes());
    }

    #[test]
    fn test_swap_mutation_changes_two_positions() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut ind = TaskChromosome::identity(10);
        swap_mutation(&mut ind, &mut rng);
        let moved = ind
            .genes()
            .iter()
            .enumerate()
            .filter(|&(i, &g)| i as u32 != g)
            .count();
        assert_eq!(moved, 2);
        assert!(ind.is_permutation(10));
    }

    #[test]
    fn test_mutations_keep_permutation() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut ind = TaskChromosome::random(12, &mut rng);
        for _ in 0..100 {
            swap_mutation(&mut ind, &mut rng);
            insert_mutation(&mut ind, &mut rng);
            invert_mutation(&mut ind, &mut rng);
        }
        assert!(ind.is_permutation(12));
    }

    #[test]
    fn test_mutation_on_tiny_individuals() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut one = TaskChromosome::identity(1);
        swap_mutation(&mut one, &mut rng);
        insert_mutation(&mut one, &mut rng);
        invert_mutation(&mut one, &mut rng);
        assert_eq!(one.genes(), &[0]);

        let empty = TaskChromosome::identity(0);
        let (c1, _) = ox_crossover(&empty, &empty, &mut rng);
        assert!(c1.is_empty());
    }
}
