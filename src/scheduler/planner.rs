//! Planning entry point.
//!
//! [`Planner`] validates the input once, then runs the GA and projects the
//! best permutation into a [`PlanResult`].
//!
//! # Example
//! ```
//! use u_cnc_schedule::models::{Machine, Operation, OperationCode, Order, Scenario};
//! use u_cnc_schedule::scheduler::plan;
//!
//! let orders = vec![Order::new("OF-1", 2).with_operation(
//!     Operation::new(OperationCode::OP1)
//!         .with_piece_duration(60_000)
//!         .with_tools(["T1", "T2"]),
//! )];
//! let machines = vec![Machine::new("M1", 12)];
//! let scenario = Scenario::default()
//!     .with_population_size(10)
//!     .with_generations(5)
//!     .with_seed(42);
//!
//! let result = plan(&orders, machines, scenario).unwrap();
//! assert_eq!(result.timeline.production_entries().count(), 2);
//! ```

use log::{info, warn};
use serde::{Deserialize, Serialize};

use super::kpi::PlanKpi;
use super::projector::project;
use crate::decoder::Decoder;
use crate::decomposer::{decompose, TaskSet};
use crate::error::{ScheduleError, ScheduleWarning};
use crate::ga::{
    BlockSchedulingProblem, CancellationToken, Evolution, EvolutionConfig, GenerationStats,
    RunState,
};
use crate::models::{BlockSummary, Machine, Order, Scenario, Timeline};
use crate::validation::validate_scenario;

/// Output of one planning run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanResult {
    /// Chronological timeline with absolute times.
    pub timeline: Timeline,
    /// Blocks with their machine assignment.
    pub blocks: Vec<BlockSummary>,
    /// Best/mean fitness per generation.
    pub history: Vec<GenerationStats>,
    /// Summary indicators.
    pub kpi: PlanKpi,
    /// Fitness of the projected timeline (lower is better).
    pub fitness: f64,
    /// Terminal state of the evolution loop.
    pub state: RunState,
    /// Generations evaluated, the initial population included.
    pub generations: usize,
    /// Non-fatal conditions of the result.
    pub warnings: Vec<ScheduleWarning>,
}

impl PlanResult {
    /// Whether every precedence constraint holds in the timeline.
    pub fn is_feasible(&self) -> bool {
        !self
            .warnings
            .iter()
            .any(|w| matches!(w, ScheduleWarning::NoFeasibleSchedule { .. }))
    }
}

/// Validated planning problem.
#[derive(Debug, Clone)]
pub struct Planner {
    tasks: TaskSet,
    machines: Vec<Machine>,
    scenario: Scenario,
}

impl Planner {
    /// Validates the scenario and decomposes the orders.
    ///
    /// # Errors
    /// - [`ScheduleError::InvalidScenario`] for out-of-range parameters or
    ///   an empty machine set
    /// - [`ScheduleError::InvalidOrderData`] for malformed or
    ///   unschedulable orders
    pub fn new(
        orders: &[Order],
        machines: Vec<Machine>,
        scenario: Scenario,
    ) -> Result<Self, ScheduleError> {
        validate_scenario(&scenario, &machines).map_err(ScheduleError::InvalidScenario)?;
        let tasks = decompose(orders, &machines)?;
        Ok(Self {
            tasks,
            machines,
            scenario,
        })
    }

    /// Decomposed tasks.
    pub fn tasks(&self) -> &TaskSet {
        &self.tasks
    }

    /// Machines.
    pub fn machines(&self) -> &[Machine] {
        &self.machines
    }

    /// Run configuration.
    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    /// Runs the GA to a terminal state and projects the best permutation.
    pub fn run(&self, cancel: &CancellationToken) -> PlanResult {
        let decoder = Decoder::new(&self.tasks, &self.machines, &self.scenario);
        let problem = BlockSchedulingProblem::new(decoder);
        let config = EvolutionConfig::from_scenario(&self.scenario);

        info!(
            "planning {} tasks from {} orders on {} machines: objective {:?}, population {}, generations {}",
            self.tasks.len(),
            self.tasks.orders().len(),
            self.machines.len(),
            self.scenario.objective,
            config.population_size,
            config.max_generations
        );

        let seeds = vec![problem.seeded().clone()];
        let outcome = Evolution::run_seeded(&problem, &config, seeds, cancel);
        let (best, history, generations, state) = match outcome {
            Some(outcome) => (
                outcome.best,
                outcome.history,
                outcome.generations,
                outcome.state,
            ),
            None => (problem.seeded().clone(), Vec::new(), 0, RunState::Initialized),
        };

        let decoder = problem.decoder();
        let projection = project(decoder, best.genes());
        let fitness = projection.fitness(decoder);
        let kpi = projection.kpi(decoder);

        let mut warnings = Vec::new();
        if !projection.evaluation.is_feasible() {
            let violations = projection.evaluation.precedence_violations;
            let penalty = projection.evaluation.penalty(&self.scenario);
            warn!("no feasible schedule found: {violations} precedence violations remain");
            warnings.push(ScheduleWarning::NoFeasibleSchedule {
                violations,
                penalty,
            });
        }
        if state == RunState::Cancelled {
            warn!("planning cancelled after {generations} generations");
            warnings.push(ScheduleWarning::Cancelled { generations });
        }

        info!(
            "planning finished ({state:?}) after {generations} generations: fitness {fitness:.3}, makespan {} ms, {} setups",
            kpi.makespan_ms, kpi.setup_count
        );

        PlanResult {
            timeline: projection.timeline,
            blocks: projection.blocks,
            history,
            kpi,
            fitness,
            state,
            generations,
            warnings,
        }
    }
}

/// Validates the input and runs one uncancellable planning pass.
pub fn plan(
    orders: &[Order],
    machines: Vec<Machine>,
    scenario: Scenario,
) -> Result<PlanResult, ScheduleError> {
    Ok(Planner::new(orders, machines, scenario)?.run(&CancellationToken::new()))
}
