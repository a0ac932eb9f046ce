//! Scenario (run configuration) model.
//!
//! A scenario is owned by the invoking application and passed into the
//! engine as an immutable value. Every knob beyond the objective and the
//! GA budget has a serde default, so a minimal JSON scenario is
//! `{"objective": "minimize_makespan"}`.

use serde::{Deserialize, Serialize};

use crate::ga::operators::{CrossoverType, MutationType};

/// One week (ms); default horizon length.
const DEFAULT_HORIZON_MS: i64 = 7 * 24 * 60 * 60 * 1000;
/// Thirty minutes (ms); default per-block setup.
const DEFAULT_SETUP_MS: i64 = 30 * 60 * 1000;

/// Optimization objective. Lower fitness is better for every objective.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    /// Priority-weighted total tardiness, makespan as secondary term.
    MinimizeTardiness,
    /// Pieces finished inside the horizon, makespan as secondary term.
    MaximizeThroughput,
    /// Latest task end across all machines.
    MinimizeMakespan,
    /// Total setup time, makespan as secondary term.
    MinimizeSetups,
    /// Variance of machine loads, makespan as secondary term.
    BalanceLoad,
    /// Weighted sum of the raw measures.
    Weighted(ObjectiveWeights),
}

impl Default for Objective {
    fn default() -> Self {
        Self::MinimizeMakespan
    }
}

impl Objective {
    /// Seeding rule matching this objective.
    pub fn default_seeding_rule(&self) -> SeedingRule {
        match self {
            Self::MinimizeTardiness | Self::BalanceLoad | Self::Weighted(_) => {
                SeedingRule::EarliestDueDate
            }
            Self::MaximizeThroughput => SeedingRule::LargestQuantityFirst,
            Self::MinimizeMakespan => SeedingRule::ShortestProcessingTime,
            Self::MinimizeSetups => SeedingRule::ToolGrouping,
        }
    }
}

/// Weights of the `weighted` objective.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectiveWeights {
    /// Weight of makespan (ms).
    pub makespan: f64,
    /// Weight of priority-weighted tardiness (ms).
    pub tardiness: f64,
    /// Weight of total setup time (ms).
    pub setups: f64,
    /// Weight of machine-load variance (ms²).
    pub balance: f64,
}

impl Default for ObjectiveWeights {
    fn default() -> Self {
        Self {
            makespan: 1.0,
            tardiness: 0.1,
            setups: 0.0,
            balance: 0.05,
        }
    }
}

/// Priority ordering used to build the seeded individual of the initial population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedingRule {
    /// Earliest due date first.
    EarliestDueDate,
    /// Shortest total processing time first.
    ShortestProcessingTime,
    /// Largest quantity first.
    LargestQuantityFirst,
    /// Orders sharing fixture and tools kept adjacent.
    ToolGrouping,
}

/// Run-level configuration of one optimization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    /// Scenario name (for logs and reports).
    pub name: String,
    /// Planning horizon start (absolute ms). Simulated time starts here.
    pub horizon_start_ms: i64,
    /// Planning horizon end (absolute ms).
    pub horizon_end_ms: i64,
    /// Active objective.
    pub objective: Objective,
    /// Individuals per generation.
    pub population_size: usize,
    /// Generation budget.
    pub generations: usize,
    /// Probability of recombining a parent pair.
    pub crossover_rate: f64,
    /// Probability of mutating a child.
    pub mutation_rate: f64,
    /// Default per-block setup (ms); machines may override it.
    pub setup_duration_ms: i64,
    /// Individuals carried unchanged into the next generation.
    pub elite_count: usize,
    /// Individuals sampled per tournament.
    pub tournament_size: usize,
    /// Stop after this many generations without improvement. `None` = never.
    pub stall_generations: Option<usize>,
    /// PRNG seed. `None` = OS entropy (non-deterministic).
    pub seed: Option<u64>,
    /// Evaluate individuals on the rayon thread pool.
    pub parallel: bool,
    /// Seeding rule; `None` derives it from the objective.
    pub seeding_rule: Option<SeedingRule>,
    /// Crossover operator.
    pub crossover: CrossoverType,
    /// Mutation operator.
    pub mutation: MutationType,
    /// Fitness penalty per violated precedence pair.
    pub precedence_penalty: f64,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            name: String::new(),
            horizon_start_ms: 0,
            horizon_end_ms: DEFAULT_HORIZON_MS,
            objective: Objective::default(),
            population_size: 100,
            generations: 200,
            crossover_rate: 0.8,
            mutation_rate: 0.2,
            setup_duration_ms: DEFAULT_SETUP_MS,
            elite_count: 2,
            tournament_size: 3,
            stall_generations: None,
            seed: None,
            parallel: true,
            seeding_rule: None,
            crossover: CrossoverType::default(),
            mutation: MutationType::default(),
            precedence_penalty: 1.0e12,
        }
    }
}

impl Scenario {
    /// Creates a scenario with default settings and the given objective.
    pub fn new(objective: Objective) -> Self {
        Self {
            objective,
            ..Self::default()
        }
    }

    /// Sets the scenario name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the objective.
    pub fn with_objective(mut self, objective: Objective) -> Self {
        self.objective = objective;
        self
    }

    /// Sets the planning horizon (absolute ms).
    pub fn with_horizon(mut self, start_ms: i64, end_ms: i64) -> Self {
        self.horizon_start_ms = start_ms;
        self.horizon_end_ms = end_ms;
        self
    }

    /// Sets the population size.
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size;
        self
    }

    /// Sets the generation budget.
    pub fn with_generations(mut self, generations: usize) -> Self {
        self.generations = generations;
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

    /// Sets the default setup duration.
    pub fn with_setup_duration(mut self, setup_ms: i64) -> Self {
        self.setup_duration_ms = setup_ms;
        self
    }

    /// Sets the elite count.
    pub fn with_elite_count(mut self, count: usize) -> Self {
        self.elite_count = count;
        self
    }

    /// Sets the tournament size.
    pub fn with_tournament_size(mut self, size: usize) -> Self {
        self.tournament_size = size;
        self
    }

    /// Enables convergence detection after `generations` without improvement.
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

    /// Overrides the seeding rule.
    pub fn with_seeding_rule(mut self, rule: SeedingRule) -> Self {
        self.seeding_rule = Some(rule);
        self
    }

    /// Sets the crossover operator.
    pub fn with_crossover(mut self, crossover: CrossoverType) -> Self {
        self.crossover = crossover;
        self
    }

    /// Sets the mutation operator.
    pub fn with_mutation(mut self, mutation: MutationType) -> Self {
        self.mutation = mutation;
        self
    }

    /// Seeding rule in effect.
    pub fn effective_seeding_rule(&self) -> SeedingRule {
        self.seeding_rule
            .unwrap_or_else(|| self.objective.default_seeding_rule())
    }

    /// Horizon length (ms).
    #[inline]
    pub fn horizon_ms(&self) -> i64 {
        self.horizon_end_ms - self.horizon_start_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = Scenario::default();
        assert_eq!(s.population_size, 100);
        assert_eq!(s.generations, 200);
        assert!((s.crossover_rate - 0.8).abs() < 1e-12);
        assert!((s.mutation_rate - 0.2).abs() < 1e-12);
        assert_eq!(s.setup_duration_ms, 1_800_000);
        assert_eq!(s.horizon_ms(), DEFAULT_HORIZON_MS);
        assert_eq!(s.objective, Objective::MinimizeMakespan);
    }

    #[test]
    fn test_builder() {
        let s = Scenario::new(Objective::MinimizeSetups)
            .with_name("week 42")
            .with_horizon(1_000, 5_000)
            .with_population_size(20)
            .with_generations(30)
            .with_seed(7)
            .with_parallel(false)
            .with_stall_generations(10);

        assert_eq!(s.name, "week 42");
        assert_eq!(s.horizon_ms(), 4_000);
        assert_eq!(s.population_size, 20);
        assert_eq!(s.generations, 30);
        assert_eq!(s.seed, Some(7));
        assert!(!s.parallel);
        assert_eq!(s.stall_generations, Some(10));
        assert_eq!(s.effective_seeding_rule(), SeedingRule::ToolGrouping);
    }

    #[test]
    fn test_seeding_rule_override() {
        let s = Scenario::new(Objective::MinimizeMakespan)
            .with_seeding_rule(SeedingRule::EarliestDueDate);
        assert_eq!(s.effective_seeding_rule(), SeedingRule::EarliestDueDate);
    }

    #[test]
    fn test_objective_serde_names() {
        let cases = [
            (Objective::MinimizeTardiness, "\"minimize_tardiness\""),
            (Objective::MaximizeThroughput, "\"maximize_throughput\""),
            (Objective::MinimizeMakespan, "\"minimize_makespan\""),
            (Objective::MinimizeSetups, "\"minimize_setups\""),
            (Objective::BalanceLoad, "\"balance_load\""),
        ];
        for (objective, json) in cases {
            assert_eq!(serde_json::to_string(&objective).unwrap(), json);
        }

        let weighted: Objective =
            serde_json::from_str(r#"{"weighted": {"makespan": 1.0, "setups": 2.0}}"#).unwrap();
        match weighted {
            Objective::Weighted(w) => {
                assert!((w.setups - 2.0).abs() < 1e-12);
                // Missing weights take defaults
                assert!((w.tardiness - 0.1).abs() < 1e-12);
            }
            other => panic!("unexpected objective {other:?}"),
        }
    }

    #[test]
    fn test_minimal_json_scenario() {
        let s: Scenario =
            serde_json::from_str(r#"{"objective": "minimize_tardiness", "seed": 3}"#).unwrap();
        assert_eq!(s.objective, Objective::MinimizeTardiness);
        assert_eq!(s.seed, Some(3));
        assert_eq!(s.population_size, 100);
        assert_eq!(s.crossover, CrossoverType::Ox);
        assert_eq!(s.mutation, MutationType::Swap);
    }
}
