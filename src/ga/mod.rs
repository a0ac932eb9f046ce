//! GA-based block scheduling optimization.
//!
//! A generational GA over task permutations built on `u_metaheur::ga`.
//! [`BlockSchedulingProblem`] implements its `GaProblem` trait against the
//! block decoder, and [`Evolution`] drives any such problem with stall
//! detection, seeding and cooperative cancellation.
//!
//! # Encoding
//!
//! A chromosome is a permutation of task indices. The decoder consumes it
//! left to right, so the permutation alone fixes blocks, machine choice
//! and timing.
//!
//! # Submodules
//!
//! - [`operators`]: Runtime-selectable crossover and mutation strategies
//!
//! # Reference
//! - Goldberg (1989), "Genetic Algorithms in Search, Optimization and Machine Learning"
//! - Bierwirth (1995), "A generalized permutation approach to JSSP"

mod chromosome;
pub mod operators;
mod problem;
mod runner;

pub use chromosome::{
    TaskChromosome, insert_mutation, invert_mutation, ox_crossover, pox_crossover, swap_mutation,
};
pub use problem::{BlockSchedulingProblem, seeded_individual};
pub use runner::{
    CancellationToken, Evolution, EvolutionConfig, EvolutionResult, GenerationStats, RunContext,
    RunState,
};
