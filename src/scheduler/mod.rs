//! Planning entry point, timeline projection and KPI evaluation.
//!
//! # Pipeline
//!
//! [`Planner`] validates the input, runs the GA over task permutations and
//! hands the best permutation to [`project`], which decodes it once more
//! into an authoritative timeline. [`PlanKpi`] summarizes that timeline.
//!
//! # KPI
//!
//! `PlanKpi` computes makespan, tardiness, on-time rate, utilization, load
//! variance, interleaving rate and fragmentation index.
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 3-4
//! - Baker & Trietsch (2019), "Principles of Sequencing and Scheduling"

mod kpi;
mod planner;
mod projector;

pub use kpi::PlanKpi;
pub use planner::{PlanResult, Planner, plan};
pub use projector::{Projection, project};
