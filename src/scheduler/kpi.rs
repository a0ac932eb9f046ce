//! Plan quality metrics (KPIs).
//!
//! Computes shop-floor performance indicators from a projected timeline
//! and its input tasks. None of these feed back into the optimization.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Makespan (C_max) | Latest entry end minus horizon start |
//! | Total Tardiness | Sum of max(0, completion - due date) per order |
//! | Weighted Tardiness | Same, each term scaled by order priority |
//! | Maximum Tardiness | Largest single order delay |
//! | On-Time Rate | Fraction of orders meeting their due date |
//! | Utilization | Machine busy time (setups included) / makespan |
//! | Interleaving Rate | Adjacent task pairs on a machine crossing orders |
//! | Fragmentation Index | Mean number of blocks per order |
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 1.2: Performance Measures

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::decoder::variance;
use crate::decomposer::TaskSet;
use crate::models::{Machine, Scenario, Timeline, ViolationType};

/// Plan performance indicators.
///
/// All time values are in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanKpi {
    /// Makespan: latest completion, relative to the horizon start (ms).
    pub makespan_ms: i64,
    /// Sum of order tardiness (ms).
    pub total_tardiness_ms: i64,
    /// Sum of priority × order tardiness.
    pub weighted_tardiness_ms: f64,
    /// Maximum tardiness of any single order (ms).
    pub max_tardiness_ms: i64,
    /// Fraction of orders completing on time (0.0..=1.0).
    pub on_time_rate: f64,
    /// Tardiness per order ID; orders without a due date are omitted.
    pub tardiness_by_order: BTreeMap<String, i64>,
    /// Number of block setups.
    pub setup_count: usize,
    /// Total setup time (ms).
    pub total_setup_ms: i64,
    /// Per-machine utilization (0.0..=1.0).
    pub utilization_by_machine: BTreeMap<String, f64>,
    /// Average machine utilization (0.0..=1.0).
    pub avg_utilization: f64,
    /// Population variance of machine busy time (ms²).
    pub load_variance: f64,
    /// Fraction of consecutive task transitions that change order.
    pub interleaving_rate: f64,
    /// Mean number of blocks an order is spread over.
    pub fragmentation_index: f64,
    /// Pieces whose last operation ends after the horizon.
    pub unfinished_pieces: usize,
    /// Violated precedence pairs.
    pub precedence_violations: usize,
}

impl PlanKpi {
    /// Computes KPIs from a projected timeline.
    ///
    /// # Arguments
    /// * `timeline` - Projected timeline with absolute times.
    /// * `tasks` - The decomposed input (for due dates and routings).
    /// * `machines` - Every machine, including idle ones.
    /// * `scenario` - Horizon of the run.
    pub fn calculate(
        timeline: &Timeline,
        tasks: &TaskSet,
        machines: &[Machine],
        scenario: &Scenario,
    ) -> Self {
        let origin = scenario.horizon_start_ms;
        let makespan_ms = timeline.end_ms().map_or(0, |end| (end - origin).max(0));

        // Tardiness
        let mut tardiness_by_order = BTreeMap::new();
        let mut total_tardiness_ms = 0i64;
        let mut weighted_tardiness_ms = 0.0;
        let mut max_tardiness_ms = 0i64;
        let mut on_time = 0usize;

        for order in tasks.orders() {
            let Some(due) = order.due_date_ms else {
                on_time += 1;
                continue;
            };
            let completion = timeline.order_completion_ms(&order.id).unwrap_or(origin);
            let tardiness = (completion - due).max(0);
            if tardiness == 0 {
                on_time += 1;
            }
            total_tardiness_ms += tardiness;
            weighted_tardiness_ms += f64::from(order.priority) * tardiness as f64;
            max_tardiness_ms = max_tardiness_ms.max(tardiness);
            tardiness_by_order.insert(order.id.clone(), tardiness);
        }

        let on_time_rate = if tasks.orders().is_empty() {
            1.0
        } else {
            on_time as f64 / tasks.orders().len() as f64
        };

        // Utilization
        let busy = timeline.busy_by_machine();
        let loads: Vec<i64> = machines
            .iter()
            .map(|m| busy.get(&m.id).copied().unwrap_or(0))
            .collect();
        let utilization_by_machine: BTreeMap<String, f64> = machines
            .iter()
            .zip(&loads)
            .map(|(m, &load)| {
                let u = if makespan_ms > 0 {
                    load as f64 / makespan_ms as f64
                } else {
                    0.0
                };
                (m.id.clone(), u)
            })
            .collect();
        let avg_utilization = if utilization_by_machine.is_empty() {
            0.0
        } else {
            utilization_by_machine.values().sum::<f64>() / utilization_by_machine.len() as f64
        };

        let total_setup_ms = timeline
            .entries
            .iter()
            .filter(|e| e.is_setup())
            .map(|e| e.duration_ms())
            .sum();

        let unfinished_pieces = timeline
            .production_entries()
            .filter(|e| e.end_ms > scenario.horizon_end_ms)
            .filter_map(|e| e.task())
            .filter(|key| {
                tasks
                    .order_index(&key.order_id)
                    .map(|o| &tasks.orders()[o])
                    .and_then(|order| order.operations.last())
                    .is_some_and(|last| last.code == key.operation)
            })
            .count();

        let precedence_violations = timeline
            .violations
            .iter()
            .filter(|v| v.violation_type == ViolationType::PrecedenceViolation)
            .count();

        Self {
            makespan_ms,
            total_tardiness_ms,
            weighted_tardiness_ms,
            max_tardiness_ms,
            on_time_rate,
            tardiness_by_order,
            setup_count: timeline.setup_count(),
            total_setup_ms,
            utilization_by_machine,
            avg_utilization,
            load_variance: variance(&loads),
            interleaving_rate: interleaving_rate(timeline, machines),
            fragmentation_index: fragmentation_index(timeline, tasks),
            unfinished_pieces,
            precedence_violations,
        }
    }
}

fn interleaving_rate(timeline: &Timeline, machines: &[Machine]) -> f64 {
    let mut transitions = 0usize;
    let mut crossings = 0usize;

    for machine in machines {
        let mut entries: Vec<_> = timeline
            .entries_for_machine(&machine.id)
            .into_iter()
            .filter_map(|e| e.task().map(|key| (e.start_ms, key)))
            .collect();
        entries.sort_by_key(|&(start, _)| start);

        for pair in entries.windows(2) {
            transitions += 1;
            if pair[0].1.order_id != pair[1].1.order_id {
                crossings += 1;
            }
        }
    }

    if transitions == 0 {
        0.0
    } else {
        crossings as f64 / transitions as f64
    }
}

fn fragmentation_index(timeline: &Timeline, tasks: &TaskSet) -> f64 {
    if tasks.orders().is_empty() {
        return 0.0;
    }
    let mut blocks_by_order: BTreeMap<&str, BTreeSet<usize>> = BTreeMap::new();
    for entry in timeline.production_entries() {
        if let Some(key) = entry.task() {
            blocks_by_order
                .entry(key.order_id.as_str())
                .or_default()
                .insert(entry.block_id);
        }
    }
    let total: usize = blocks_by_order.values().map(BTreeSet::len).sum();
    total as f64 / tasks.orders().len() as f64
}
