//! Timeline (solution) model.
//!
//! The timeline is the materialized output of one run: every block setup
//! and every task with its machine and absolute time window, plus any
//! constraint violations left in the best solution.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{BlockId, TaskKey};

/// A chronological schedule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    /// Entries sorted by start time.
    pub entries: Vec<TimelineEntry>,
    /// Constraint violations detected in this timeline.
    pub violations: Vec<Violation>,
}

/// What a timeline entry represents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntryKind {
    /// Block setup interval.
    Setup,
    /// One piece operation.
    Production {
        /// The task processed.
        task: TaskKey,
    },
}

/// A machine-time interval of the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    /// Setup or production.
    #[serde(flatten)]
    pub kind: EntryKind,
    /// Machine ID.
    pub machine_id: String,
    /// Owning block.
    pub block_id: BlockId,
    /// Start (absolute ms).
    pub start_ms: i64,
    /// End (absolute ms).
    pub end_ms: i64,
}

/// A constraint violation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// Type of violation.
    pub violation_type: ViolationType,
    /// Related entity (task key string or order ID).
    pub entity_id: String,
    /// Human-readable description.
    pub message: String,
    /// Severity (0-100, higher = worse).
    pub severity: i32,
}

/// Classification of constraint violations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationType {
    /// Order completed after its due date.
    DeadlineMiss,
    /// Operation started before the previous operation of its piece ended.
    PrecedenceViolation,
    /// Task ends after the planning horizon.
    HorizonOverrun,
}

impl TimelineEntry {
    /// Creates a setup entry.
    pub fn setup(machine_id: impl Into<String>, block_id: BlockId, start_ms: i64, end_ms: i64) -> Self {
        Self {
            kind: EntryKind::Setup,
            machine_id: machine_id.into(),
            block_id,
            start_ms,
            end_ms,
        }
    }

    /// Creates a production entry.
    pub fn production(
        task: TaskKey,
        machine_id: impl Into<String>,
        block_id: BlockId,
        start_ms: i64,
        end_ms: i64,
    ) -> Self {
        Self {
            kind: EntryKind::Production { task },
            machine_id: machine_id.into(),
            block_id,
            start_ms,
            end_ms,
        }
    }

    /// Duration (end - start) in ms.
    #[inline]
    pub fn duration_ms(&self) -> i64 {
        self.end_ms - self.start_ms
    }

    /// Task processed by this entry, `None` for setups.
    pub fn task(&self) -> Option<&TaskKey> {
        match &self.kind {
            EntryKind::Production { task } => Some(task),
            EntryKind::Setup => None,
        }
    }

    /// Whether this is a setup entry.
    #[inline]
    pub fn is_setup(&self) -> bool {
        matches!(self.kind, EntryKind::Setup)
    }
}

impl Violation {
    /// Creates a deadline miss violation.
    pub fn deadline_miss(order_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            violation_type: ViolationType::DeadlineMiss,
            entity_id: order_id.into(),
            message: message.into(),
            severity: 80,
        }
    }

    /// Creates a precedence violation.
    pub fn precedence_violation(task: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            violation_type: ViolationType::PrecedenceViolation,
            entity_id: task.into(),
            message: message.into(),
            severity: 95,
        }
    }

    /// Creates a horizon overrun violation.
    pub fn horizon_overrun(task: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            violation_type: ViolationType::HorizonOverrun,
            entity_id: task.into(),
            message: message.into(),
            severity: 60,
        }
    }
}

impl Timeline {
    /// Creates an empty timeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry.
    pub fn add_entry(&mut self, entry: TimelineEntry) {
        self.entries.push(entry);
    }

    /// Adds a violation.
    pub fn add_violation(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    /// Sorts entries chronologically (start, then machine, setups first).
    pub fn sort_chronologically(&mut self) {
        self.entries.sort_by(|a, b| {
            a.start_ms
                .cmp(&b.start_ms)
                .then_with(|| a.machine_id.cmp(&b.machine_id))
                .then_with(|| b.is_setup().cmp(&a.is_setup()))
                .then_with(|| a.end_ms.cmp(&b.end_ms))
        });
    }

    /// Whether the timeline has no precedence violation.
    pub fn is_feasible(&self) -> bool {
        !self
            .violations
            .iter()
            .any(|v| v.violation_type == ViolationType::PrecedenceViolation)
    }

    /// Earliest start across all entries (absolute ms).
    pub fn start_ms(&self) -> Option<i64> {
        self.entries.iter().map(|e| e.start_ms).min()
    }

    /// Latest end across all entries (absolute ms).
    pub fn end_ms(&self) -> Option<i64> {
        self.entries.iter().map(|e| e.end_ms).max()
    }

    /// Production entries only.
    pub fn production_entries(&self) -> impl Iterator<Item = &TimelineEntry> {
        self.entries.iter().filter(|e| !e.is_setup())
    }

    /// Finds the entry for a task.
    pub fn entry_for_task(&self, key: &TaskKey) -> Option<&TimelineEntry> {
        self.entries.iter().find(|e| e.task() == Some(key))
    }

    /// Entries on a machine, in timeline order.
    pub fn entries_for_machine(&self, machine_id: &str) -> Vec<&TimelineEntry> {
        self.entries
            .iter()
            .filter(|e| e.machine_id == machine_id)
            .collect()
    }

    /// Completion time of an order: latest end of its production entries.
    pub fn order_completion_ms(&self, order_id: &str) -> Option<i64> {
        self.production_entries()
            .filter(|e| e.task().is_some_and(|t| t.order_id == order_id))
            .map(|e| e.end_ms)
            .max()
    }

    /// Busy time (setup + production) per machine (ms).
    pub fn busy_by_machine(&self) -> BTreeMap<String, i64> {
        let mut busy: BTreeMap<String, i64> = BTreeMap::new();
        for e in &self.entries {
            *busy.entry(e.machine_id.clone()).or_insert(0) += e.duration_ms();
        }
        busy
    }

    /// Number of setup entries.
    pub fn setup_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_setup()).count()
    }

    /// Number of entries.
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OperationCode;

    fn key(order: &str, piece: u32, op: OperationCode) -> TaskKey {
        TaskKey::new(order, piece, op)
    }

    fn sample_timeline() -> Timeline {
        let mut t = Timeline::new();
        t.add_entry(TimelineEntry::setup("M1", 0, 0, 30));
        t.add_entry(TimelineEntry::production(key("A", 0, OperationCode::OP1), "M1", 0, 30, 80));
        t.add_entry(TimelineEntry::production(key("A", 0, OperationCode::OP2), "M1", 0, 80, 100));
        t.add_entry(TimelineEntry::setup("M2", 1, 0, 30));
        t.add_entry(TimelineEntry::production(key("B", 0, OperationCode::OP1), "M2", 1, 30, 60));
        t
    }

    #[test]
    fn test_span_and_counts() {
        let t = sample_timeline();
        assert_eq!(t.start_ms(), Some(0));
        assert_eq!(t.end_ms(), Some(100));
        assert_eq!(t.setup_count(), 2);
        assert_eq!(t.entry_count(), 5);
        assert_eq!(t.production_entries().count(), 3);
    }

    #[test]
    fn test_order_completion() {
        let t = sample_timeline();
        assert_eq!(t.order_completion_ms("A"), Some(100));
        assert_eq!(t.order_completion_ms("B"), Some(60));
        assert_eq!(t.order_completion_ms("Z"), None);
    }

    #[test]
    fn test_busy_by_machine() {
        let t = sample_timeline();
        let busy = t.busy_by_machine();
        assert_eq!(busy["M1"], 100);
        assert_eq!(busy["M2"], 60);
    }

    #[test]
    fn test_sort_chronologically() {
        let mut t = sample_timeline();
        t.sort_chronologically();
        let starts: Vec<i64> = t.entries.iter().map(|e| e.start_ms).collect();
        assert_eq!(starts, vec![0, 0, 30, 30, 80]);
        assert!(t.entries[0].is_setup());
        assert_eq!(t.entries[0].machine_id, "M1");
    }

    #[test]
    fn test_entry_lookup() {
        let t = sample_timeline();
        let e = t.entry_for_task(&key("A", 0, OperationCode::OP2)).unwrap();
        assert_eq!(e.start_ms, 80);
        assert_eq!(e.duration_ms(), 20);
        assert_eq!(t.entries_for_machine("M2").len(), 2);
    }

    #[test]
    fn test_feasibility() {
        let mut t = sample_timeline();
        assert!(t.is_feasible());
        t.add_violation(Violation::deadline_miss("A", "late"));
        assert!(t.is_feasible());
        t.add_violation(Violation::precedence_violation("A-P1 OP2", "early"));
        assert!(!t.is_feasible());
    }

    #[test]
    fn test_entry_serde_shape() {
        let e = TimelineEntry::production(key("A", 0, OperationCode::OP1), "M1", 3, 10, 20);
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["type"], "production");
        assert_eq!(json["task"]["order_id"], "A");
        assert_eq!(json["block_id"], 3);

        let setup = serde_json::to_value(TimelineEntry::setup("M1", 0, 0, 5)).unwrap();
        assert_eq!(setup["type"], "setup");
    }
}
