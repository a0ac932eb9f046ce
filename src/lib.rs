//! Genetic block scheduler for CNC machining.
//!
//! Turns manufacturing orders into a timed production plan on a small set
//! of CNC machines, subject to tool-magazine capacity, per-piece operation
//! precedence, per-block setup and single-machine occupancy.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Order`, `Operation`, `Machine`, `Task`,
//!   `Block`, `Scenario`, `Timeline`
//! - **`validation`**: Input integrity checks (duplicate IDs, routings, tool capacity, GA ranges)
//! - **`decomposer`**: Order → (order, piece, operation) task expansion
//! - **`dispatching`**: Priority rules used to seed the initial population
//! - **`ga`**: Permutation encoding, genetic operators, evolution loop
//! - **`decoder`**: Block builder, machine assigner, fitness evaluator
//! - **`scheduler`**: `Planner` entry point, timeline projection, KPIs
//!
//! # Architecture
//!
//! Data flows one way: orders are decomposed once, the GA evolves task
//! permutations, each permutation is decoded into blocks and scored, and
//! the best one is projected into the output timeline. The crate performs
//! no I/O; the `cnc-plan` binary adds JSON files and logging around it.
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"
//! - Crama (1997), "Combinatorial optimization models for production
//!   scheduling in automated manufacturing systems"
//! - Bierwirth (1995), "A generalized permutation approach to JSSP"

pub mod decoder;
pub mod decomposer;
pub mod dispatching;
pub mod error;
pub mod ga;
pub mod models;
pub mod scheduler;
pub mod validation;

pub use error::{ScheduleError, ScheduleWarning};
pub use scheduler::{PlanKpi, PlanResult, Planner, plan};
