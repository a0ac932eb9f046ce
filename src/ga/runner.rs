//! Cancellable evolution loop.
//!
//! Drives any `u_metaheur::ga::GaProblem` through generations with
//! elitism, tournament selection, crossover and mutation. On top of the
//! plain generational loop it stops on a stalled best fitness, honours a
//! [`CancellationToken`] between generations and accepts seed individuals
//! for the initial population.
//!
//! # Lifecycle
//!
//! `Initialized → Evolving → Converged | Exhausted | Cancelled`
//!
//! Every terminal state is a success: the result always carries the best
//! individual found so far.
//!
//! # Concurrency
//!
//! Unscored individuals are evaluated on the rayon pool when
//! [`EvolutionConfig::parallel`] is set. The parallel iterator's join is the
//! generation barrier; selection for the next generation only starts once
//! every individual is scored. All randomness is drawn on the driving
//! thread, so a fixed seed reproduces the run regardless of threading.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::debug;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use u_metaheur::ga::{GaProblem, Individual};

use super::operators::tournament_select;
use crate::models::Scenario;

/// Evolution loop settings.
#[derive(Debug, Clone, PartialEq)]
pub struct EvolutionConfig {
    /// Individuals per generation.
    pub population_size: usize,
    /// Generations evaluated, the initial population included.
    pub max_generations: usize,
    /// Probability of recombining a selected parent pair.
    pub crossover_rate: f64,
    /// Probability of mutating each child.
    pub mutation_rate: f64,
    /// Best individuals copied unchanged into the next generation.
    pub elite_count: usize,
    /// Tournament size.
    pub tournament_size: usize,
    /// Stop after this many generations without improvement.
    pub stall_generations: Option<usize>,
    /// PRNG seed; `None` draws from OS entropy.
    pub seed: Option<u64>,
    /// Evaluate on the rayon thread pool.
    pub parallel: bool,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            max_generations: 200,
            crossover_rate: 0.8,
            mutation_rate: 0.2,
            elite_count: 2,
            tournament_size: 3,
            stall_generations: None,
            seed: None,
            parallel: true,
        }
    }
}

impl EvolutionConfig {
    /// Loop settings of a scenario.
    pub fn from_scenario(scenario: &Scenario) -> Self {
        Self {
            population_size: scenario.population_size,
            max_generations: scenario.generations,
            crossover_rate: scenario.crossover_rate,
            mutation_rate: scenario.mutation_rate,
            elite_count: scenario.elite_count,
            tournament_size: scenario.tournament_size,
            stall_generations: scenario.stall_generations,
            seed: scenario.seed,
            parallel: scenario.parallel,
        }
    }

    /// Sets the population size.
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size;
        self
    }

    /// Sets the generation budget.
    pub fn with_max_generations(mut self, generations: usize) -> Self {
        self.max_generations = generations;
        self
    }

    /// Sets the crossover rate.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate;
        self
    }

    /// Sets the mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    /// Sets the elite count.
    pub fn with_elite_count(mut self, count: usize) -> Self {
        self.elite_count = count;
        self
    }

    /// Sets the stall patience.
    pub fn with_stall_generations(mut self, generations: usize) -> Self {
        self.stall_generations = Some(generations);
        self
    }

    /// Fixes the PRNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enables or disables parallel evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Evolution loop state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// Population created, nothing evaluated yet.
    Initialized,
    /// Generations in progress.
    Evolving,
    /// Best fitness stalled for the configured patience.
    Converged,
    /// Generation budget spent.
    Exhausted,
    /// Stopped by a cancellation request.
    Cancelled,
}

impl RunState {
    /// Whether the loop has stopped.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Converged | Self::Exhausted | Self::Cancelled)
    }
}

/// Convergence record of one generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Generation number (0 = initial population).
    pub generation: usize,
    /// Best fitness found so far.
    pub best_fitness: f64,
    /// Mean fitness of this generation's population.
    pub mean_fitness: f64,
}

/// Cooperative cancellation handle.
///
/// Clones share the same flag. The loop checks it once per generation
/// boundary, never mid-evaluation.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates an untriggered token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Per-run mutable state, owned by one [`Evolution::run_seeded`] call.
#[derive(Debug, Clone)]
pub struct RunContext<I> {
    /// Current population; sorted best-first after each evaluation.
    pub population: Vec<I>,
    /// Generations evaluated so far.
    pub generation: usize,
    /// Best/mean fitness per evaluated generation.
    pub history: Vec<GenerationStats>,
    /// Loop state.
    pub state: RunState,
    /// Best individual found so far.
    pub best: Option<I>,
    /// Consecutive generations without improvement.
    pub stall: usize,
}

impl<I> RunContext<I>
where
    I: Individual<Fitness = f64> + Clone,
{
    /// Wraps an initial population.
    pub fn new(population: Vec<I>) -> Self {
        Self {
            population,
            generation: 0,
            history: Vec::new(),
            state: RunState::Initialized,
            best: None,
            stall: 0,
        }
    }

    /// Best fitness found so far.
    pub fn best_fitness(&self) -> f64 {
        self.best.as_ref().map_or(f64::INFINITY, |b| b.fitness())
    }

    /// Sorts the scored population and records the generation.
    fn record_generation(&mut self) {
        self.population.sort_by(|a, b| a.fitness().total_cmp(&b.fitness()));

        if let Some(leader) = self.population.first() {
            if leader.fitness() < self.best_fitness() {
                self.best = Some(leader.clone());
                self.stall = 0;
            } else {
                self.stall += 1;
            }
        }

        let mean_fitness = if self.population.is_empty() {
            f64::INFINITY
        } else {
            self.population.iter().map(|i| i.fitness()).sum::<f64>() / self.population.len() as f64
        };

        self.history.push(GenerationStats {
            generation: self.generation,
            best_fitness: self.best_fitness(),
            mean_fitness,
        });
        self.generation += 1;
    }
}

/// Outcome of one evolution run.
#[derive(Debug, Clone)]
pub struct EvolutionResult<I> {
    /// Best individual found.
    pub best: I,
    /// Its fitness.
    pub best_fitness: f64,
    /// Best/mean fitness per generation.
    pub history: Vec<GenerationStats>,
    /// Generations evaluated.
    pub generations: usize,
    /// Terminal state.
    pub state: RunState,
}

/// Generational GA driver with stall detection and cancellation.
pub struct Evolution;

impl Evolution {
    /// Runs the evolution loop from a random initial population.
    ///
    /// Returns `None` only for an empty population.
    pub fn run<P>(
        problem: &P,
        config: &EvolutionConfig,
        cancel: &CancellationToken,
    ) -> Option<EvolutionResult<P::Individual>>
    where
        P: GaProblem + Sync,
        P::Individual: Individual<Fitness = f64> + Clone + Send,
    {
        Self::run_seeded(problem, config, Vec::new(), cancel)
    }

    /// Runs the evolution loop with `seeds` placed first in the initial
    /// population.
    ///
    /// Seeds beyond the population size are dropped; the remaining slots
    /// are filled with random individuals. Returns `None` only for an
    /// empty population.
    pub fn run_seeded<P>(
        problem: &P,
        config: &EvolutionConfig,
        seeds: Vec<P::Individual>,
        cancel: &CancellationToken,
    ) -> Option<EvolutionResult<P::Individual>>
    where
        P: GaProblem + Sync,
        P::Individual: Individual<Fitness = f64> + Clone + Send,
    {
        let mut rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };

        let mut population = seeds;
        population.truncate(config.population_size);
        while population.len() < config.population_size {
            population.push(problem.create_individual(&mut rng));
        }

        let mut ctx = RunContext::new(population);
        if ctx.population.is_empty() {
            return None;
        }
        ctx.state = RunState::Evolving;

        loop {
            evaluate_unscored(problem, &mut ctx.population, config.parallel);
            ctx.record_generation();

            if let Some(stats) = ctx.history.last() {
                debug!(
                    "generation {}: best {:.3}, mean {:.3}",
                    stats.generation, stats.best_fitness, stats.mean_fitness
                );
            }

            if let Some(state) = Self::terminal_state(&ctx, config, cancel) {
                ctx.state = state;
                break;
            }

            ctx.population = Self::breed(problem, config, &ctx.population, &mut rng);
        }

        let best_fitness = ctx.best_fitness();
        let best = ctx.best?;
        Some(EvolutionResult {
            best,
            best_fitness,
            history: ctx.history,
            generations: ctx.generation,
            state: ctx.state,
        })
    }

    fn terminal_state<I>(
        ctx: &RunContext<I>,
        config: &EvolutionConfig,
        cancel: &CancellationToken,
    ) -> Option<RunState> {
        if ctx.generation >= config.max_generations {
            return Some(RunState::Exhausted);
        }
        if config.stall_generations.is_some_and(|patience| ctx.stall >= patience) {
            return Some(RunState::Converged);
        }
        if cancel.is_cancelled() {
            return Some(RunState::Cancelled);
        }
        None
    }

    /// Builds the next generation from a sorted, scored population.
    fn breed<P, R>(
        problem: &P,
        config: &EvolutionConfig,
        population: &[P::Individual],
        rng: &mut R,
    ) -> Vec<P::Individual>
    where
        P: GaProblem,
        P::Individual: Individual<Fitness = f64> + Clone,
        R: Rng,
    {
        let size = config.population_size;
        let elites = config.elite_count.min(population.len()).min(size);
        let mut next: Vec<P::Individual> = population[..elites].to_vec();

        while next.len() < size {
            let p1 = &population[tournament_select(population, config.tournament_size, rng)];
            let p2 = &population[tournament_select(population, config.tournament_size, rng)];

            let children = if rng.random_bool(config.crossover_rate) {
                problem.crossover(p1, p2, rng)
            } else {
                vec![p1.clone(), p2.clone()]
            };

            for mut child in children {
                if next.len() >= size {
                    break;
                }
                if rng.random_bool(config.mutation_rate) {
                    problem.mutate(&mut child, rng);
                }
                next.push(child);
            }
        }

        next
    }
}

fn evaluate_unscored<P>(problem: &P, population: &mut [P::Individual], parallel: bool)
where
    P: GaProblem + Sync,
    P::Individual: Individual<Fitness = f64> + Send,
{
    let score = |individual: &mut P::Individual| {
        let fitness = problem.evaluate(individual);
        individual.set_fitness(fitness);
    };

    if parallel {
        population
            .par_iter_mut()
            .filter(|i| !i.fitness().is_finite())
            .for_each(score);
    } else {
        population
            .iter_mut()
            .filter(|i| !i.fitness().is_finite())
            .for_each(score);
    }
}
