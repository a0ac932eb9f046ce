//! CNC scheduling domain models.
//!
//! Input records (orders, machines, scenario) arrive from the business
//! layer as immutable values; tasks and blocks are engine-internal; the
//! timeline is the output handed back.
//!
//! # Domain Mappings
//!
//! | Model | Shop floor |
//! |-------|------------|
//! | Order | Ordre de fabrication (OF) |
//! | Task | One piece through one operation |
//! | Block | Tool-magazine load behind one setup |
//! | Machine | CNC machining center |
//! | Timeline | Production plan / Gantt rows |

mod block;
mod machine;
mod order;
mod scenario;
pub(crate) mod task;
mod timeline;

pub use block::{Block, BlockId, BlockSummary};
pub use machine::Machine;
pub use order::{Operation, OperationCode, Order};
pub use scenario::{Objective, ObjectiveWeights, Scenario, SeedingRule};
pub use task::{FixtureId, Task, TaskKey, ToolId};
pub use timeline::{EntryKind, Timeline, TimelineEntry, Violation, ViolationType};
