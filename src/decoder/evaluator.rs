//! Timeline simulation and fitness evaluation.
//!
//! # Simulation
//!
//! One linear pass: every machine runs its blocks in discovery order, each
//! block being a setup interval followed by its tasks back to back. Tasks
//! are never delayed for precedence; a task starting before its
//! predecessor's end is counted as a violation and penalised.
//!
//! # Fitness
//!
//! | Objective | Fitness (lower is better) |
//! |-----------|---------------------------|
//! | minimize_makespan | makespan |
//! | minimize_tardiness | priority-weighted tardiness + 0.1 × makespan |
//! | minimize_setups | total setup time + 0.1 × makespan |
//! | balance_load | machine-load variance + 0.1 × makespan |
//! | maximize_throughput | unfinished pieces × horizon length + makespan |
//! | weighted | weighted sum of the raw measures |
//!
//! Every objective adds `precedence_penalty` per violated piece pair.
//!
//! All times are offsets from the horizon start (ms).

use crate::decomposer::TaskSet;
use crate::models::{Block, Objective, Scenario};

/// Weight of the makespan tie-breaking term.
const SECONDARY_MAKESPAN_WEIGHT: f64 = 0.1;

/// Simulated layout of one block decomposition.
#[derive(Debug, Clone)]
pub struct Simulation {
    /// Blocks in discovery order.
    pub blocks: Vec<Block>,
    /// Setup start of each block.
    pub block_start: Vec<i64>,
    /// Setup duration charged to each block.
    pub block_setup: Vec<i64>,
    /// End of each block's last task.
    pub block_end: Vec<i64>,
    /// Start of each task, indexed by task.
    pub task_start: Vec<i64>,
    /// End of each task, indexed by task.
    pub task_end: Vec<i64>,
    /// Busy time (setups + tasks) per machine.
    pub machine_busy: Vec<i64>,
}

impl Simulation {
    /// Lays blocks out on their machines.
    ///
    /// `setup_ms` holds the effective per-block setup of each machine.
    pub fn run(tasks: &TaskSet, setup_ms: &[i64], blocks: Vec<Block>) -> Self {
        let machine_count = setup_ms.len();
        let mut clock = vec![0i64; machine_count];
        let mut machine_busy = vec![0i64; machine_count];
        let mut task_start = vec![0i64; tasks.len()];
        let mut task_end = vec![0i64; tasks.len()];
        let mut block_start = Vec::with_capacity(blocks.len());
        let mut block_setup = Vec::with_capacity(blocks.len());
        let mut block_end = Vec::with_capacity(blocks.len());

        for block in &blocks {
            let m = block.machine;
            let setup = setup_ms[m];
            block_start.push(clock[m]);
            block_setup.push(setup);
            clock[m] += setup;
            machine_busy[m] += setup;

            for &t in &block.tasks {
                let duration = tasks.task(t).duration_ms;
                task_start[t] = clock[m];
                clock[m] += duration;
                task_end[t] = clock[m];
                machine_busy[m] += duration;
            }
            block_end.push(clock[m]);
        }

        Self {
            blocks,
            block_start,
            block_setup,
            block_end,
            task_start,
            task_end,
            machine_busy,
        }
    }

    /// Latest task end across all machines.
    pub fn makespan_ms(&self) -> i64 {
        self.block_end.iter().copied().max().unwrap_or(0)
    }

    /// Tasks starting before their predecessor's end.
    pub fn precedence_violations(&self, tasks: &TaskSet) -> Vec<usize> {
        tasks
            .tasks()
            .iter()
            .enumerate()
            .filter_map(|(i, task)| {
                let pred = task.predecessor?;
                (self.task_start[i] < self.task_end[pred]).then_some(i)
            })
            .collect()
    }

    /// Completion offset of each order (end of its last task).
    pub fn order_completions(&self, tasks: &TaskSet) -> Vec<i64> {
        (0..tasks.orders().len())
            .map(|o| {
                tasks
                    .order_task_range(o)
                    .map(|t| self.task_end[t])
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }
}

/// Raw measures of a simulated timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Latest task end (ms).
    pub makespan_ms: i64,
    /// Sum of order tardiness (ms).
    pub total_tardiness_ms: i64,
    /// Sum of priority × order tardiness (ms).
    pub weighted_tardiness_ms: f64,
    /// Largest order tardiness (ms).
    pub max_tardiness_ms: i64,
    /// Number of blocks (one setup each).
    pub setup_count: usize,
    /// Total setup time (ms).
    pub setup_ms: i64,
    /// Busy time per machine (ms).
    pub machine_loads: Vec<i64>,
    /// Population variance of machine loads (ms²).
    pub load_variance: f64,
    /// Pieces whose last operation ends after the horizon.
    pub unfinished_pieces: usize,
    /// Violated precedence pairs.
    pub precedence_violations: usize,
}

impl Evaluation {
    /// Measures a simulation against the scenario horizon.
    pub fn measure(simulation: &Simulation, tasks: &TaskSet, scenario: &Scenario) -> Self {
        let mut total_tardiness_ms = 0i64;
        let mut weighted_tardiness_ms = 0.0;
        let mut max_tardiness_ms = 0i64;

        for (order, completion) in tasks
            .orders()
            .iter()
            .zip(simulation.order_completions(tasks))
        {
            let Some(due) = order.due_date_ms else {
                continue;
            };
            let tardiness = (scenario.horizon_start_ms + completion - due).max(0);
            total_tardiness_ms += tardiness;
            weighted_tardiness_ms += f64::from(order.priority) * tardiness as f64;
            max_tardiness_ms = max_tardiness_ms.max(tardiness);
        }

        let horizon_ms = scenario.horizon_ms();
        let unfinished_pieces = tasks
            .tasks()
            .iter()
            .enumerate()
            .filter(|(i, task)| {
                task.is_last_operation(tasks.order_of(task).operations.len())
                    && simulation.task_end[*i] > horizon_ms
            })
            .count();

        Self {
            makespan_ms: simulation.makespan_ms(),
            total_tardiness_ms,
            weighted_tardiness_ms,
            max_tardiness_ms,
            setup_count: simulation.blocks.len(),
            setup_ms: simulation.block_setup.iter().sum(),
            load_variance: variance(&simulation.machine_busy),
            machine_loads: simulation.machine_busy.clone(),
            unfinished_pieces,
            precedence_violations: simulation.precedence_violations(tasks).len(),
        }
    }

    /// Objective value without the precedence penalty.
    pub fn objective_value(&self, objective: &Objective, horizon_ms: i64) -> f64 {
        let makespan = self.makespan_ms as f64;
        match objective {
            Objective::MinimizeMakespan => makespan,
            Objective::MinimizeTardiness => {
                self.weighted_tardiness_ms + SECONDARY_MAKESPAN_WEIGHT * makespan
            }
            Objective::MinimizeSetups => {
                self.setup_ms as f64 + SECONDARY_MAKESPAN_WEIGHT * makespan
            }
            Objective::BalanceLoad => self.load_variance + SECONDARY_MAKESPAN_WEIGHT * makespan,
            Objective::MaximizeThroughput => {
                self.unfinished_pieces as f64 * horizon_ms as f64 + makespan
            }
            Objective::Weighted(w) => {
                w.makespan * makespan
                    + w.tardiness * self.weighted_tardiness_ms
                    + w.setups * self.setup_ms as f64
                    + w.balance * self.load_variance
            }
        }
    }

    /// Penalty for violated precedence pairs.
    pub fn penalty(&self, scenario: &Scenario) -> f64 {
        self.precedence_violations as f64 * scenario.precedence_penalty
    }

    /// Scalar fitness under the scenario's objective.
    pub fn fitness(&self, scenario: &Scenario) -> f64 {
        self.objective_value(&scenario.objective, scenario.horizon_ms()) + self.penalty(scenario)
    }

    /// Whether every precedence constraint holds.
    pub fn is_feasible(&self) -> bool {
        self.precedence_violations == 0
    }
}

/// Population variance.
pub(crate) fn variance(values: &[i64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().map(|&v| v as f64).sum::<f64>() / n;
    values
        .iter()
        .map(|&v| {
            let d = v as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n
}
