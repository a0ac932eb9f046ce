//! Timeline projection of the best permutation.
//!
//! Re-runs the decoder once for the chosen permutation and materializes its
//! blocks as absolute-time timeline entries. The projection never reuses a
//! fitness cached during evolution.

use super::kpi::PlanKpi;
use crate::decoder::{Decoder, Evaluation};
use crate::models::{BlockSummary, Timeline, TimelineEntry, Violation};

/// Authoritative decoding of one permutation.
#[derive(Debug, Clone)]
pub struct Projection {
    /// Chronological setup and production entries.
    pub timeline: Timeline,
    /// Blocks in discovery order with their machine and time window.
    pub blocks: Vec<BlockSummary>,
    /// Raw measures of the decoded timeline.
    pub evaluation: Evaluation,
}

impl Projection {
    /// Fitness of the projected timeline under the decoder's scenario.
    pub fn fitness(&self, decoder: &Decoder<'_>) -> f64 {
        self.evaluation.fitness(decoder.scenario())
    }

    /// KPIs of the projected timeline.
    pub fn kpi(&self, decoder: &Decoder<'_>) -> PlanKpi {
        PlanKpi::calculate(
            &self.timeline,
            decoder.tasks(),
            decoder.machines(),
            decoder.scenario(),
        )
    }
}

/// Decodes a permutation into a timeline with absolute times.
pub fn project(decoder: &Decoder<'_>, genes: &[u32]) -> Projection {
    let tasks = decoder.tasks();
    let machines = decoder.machines();
    let scenario = decoder.scenario();
    let origin = scenario.horizon_start_ms;

    let sim = decoder.simulate(genes);
    let evaluation = Evaluation::measure(&sim, tasks, scenario);

    let mut timeline = Timeline::new();
    let mut blocks = Vec::with_capacity(sim.blocks.len());

    for (b, block) in sim.blocks.iter().enumerate() {
        let machine = &machines[block.machine];
        let start_ms = origin + sim.block_start[b];
        let setup_ms = sim.block_setup[b];

        timeline.add_entry(TimelineEntry::setup(
            &machine.id,
            block.id,
            start_ms,
            start_ms + setup_ms,
        ));
        for &t in &block.tasks {
            timeline.add_entry(TimelineEntry::production(
                tasks.task(t).key.clone(),
                &machine.id,
                block.id,
                origin + sim.task_start[t],
                origin + sim.task_end[t],
            ));
        }

        blocks.push(BlockSummary {
            id: block.id,
            machine_id: machine.id.clone(),
            tasks: block.tasks.iter().map(|&t| tasks.task(t).key.clone()).collect(),
            distinct_tools: block.tool_count(),
            tool_capacity: machine.tool_capacity,
            setup_ms,
            start_ms,
            end_ms: origin + sim.block_end[b],
        });
    }

    for t in sim.precedence_violations(tasks) {
        let task = tasks.task(t);
        let Some(pred) = task.predecessor else {
            continue;
        };
        let ready = origin + sim.task_end[pred];
        timeline.add_violation(Violation::precedence_violation(
            task.key.to_string(),
            format!(
                "starts at {} before {} is ready at {}",
                origin + sim.task_start[t],
                tasks.task(pred).key,
                ready
            ),
        ));
    }

    for (order, completion) in tasks.orders().iter().zip(sim.order_completions(tasks)) {
        let Some(due) = order.due_date_ms else {
            continue;
        };
        let done = origin + completion;
        if done > due {
            timeline.add_violation(Violation::deadline_miss(
                order.id.clone(),
                format!("completes at {done}, {} ms after due date {due}", done - due),
            ));
        }
    }

    for (i, task) in tasks.tasks().iter().enumerate() {
        let end = origin + sim.task_end[i];
        if end > scenario.horizon_end_ms {
            timeline.add_violation(Violation::horizon_overrun(
                task.key.to_string(),
                format!("ends at {end}, after horizon end {}", scenario.horizon_end_ms),
            ));
        }
    }

    timeline.sort_chronologically();

    Projection {
        timeline,
        blocks,
        evaluation,
    }
}
