//! Online machine assignment.
//!
//! Each block is bound to a machine at the moment it opens: the
//! least-loaded machine whose magazine can hold the opening task's tools.
//! Load is the cumulative simulated busy time (setups and tasks) already
//! committed to the machine.

use crate::models::Machine;

/// Running-load machine assigner for one decoding pass.
#[derive(Debug, Clone)]
pub struct MachineAssigner<'a> {
    machines: &'a [Machine],
    setup_ms: &'a [i64],
    loads: Vec<i64>,
}

impl<'a> MachineAssigner<'a> {
    /// Creates an assigner with zero load on every machine.
    ///
    /// `setup_ms` holds the effective per-block setup of each machine.
    pub fn new(machines: &'a [Machine], setup_ms: &'a [i64]) -> Self {
        Self {
            machines,
            setup_ms,
            loads: vec![0; machines.len()],
        }
    }

    /// Picks the machine for a new block and charges its setup.
    ///
    /// Candidates are machines able to hold `tool_count` distinct tools;
    /// ties go to the lower machine index. When no machine qualifies the
    /// largest magazine is used.
    pub fn open_block(&mut self, tool_count: usize) -> usize {
        let machine = self
            .machines
            .iter()
            .enumerate()
            .filter(|(_, m)| m.can_hold(tool_count))
            .min_by_key(|&(i, _)| (self.loads[i], i))
            .map(|(i, _)| i)
            .unwrap_or_else(|| self.largest_magazine());

        self.loads[machine] += self.setup_ms[machine];
        machine
    }

    /// Charges processing time to a machine.
    #[inline]
    pub fn add_work(&mut self, machine: usize, duration_ms: i64) {
        self.loads[machine] += duration_ms;
    }

    /// Cumulative load per machine (ms).
    pub fn loads(&self) -> &[i64] {
        &self.loads
    }

    fn largest_magazine(&self) -> usize {
        self.machines
            .iter()
            .enumerate()
            .max_by_key(|&(i, m)| (m.tool_capacity, std::cmp::Reverse(i)))
            .map(|(i, _)| i)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machines() -> Vec<Machine> {
        vec![
            Machine::new("M1", 12),
            Machine::new("M2", 40),
            Machine::new("M3", 12),
        ]
    }

    #[test]
    fn test_least_loaded_with_index_tie_break() {
        let machines = machines();
        let setups = vec![100; 3];
        let mut assigner = MachineAssigner::new(&machines, &setups);

        assert_eq!(assigner.open_block(5), 0);
        assigner.add_work(0, 50);
        assert_eq!(assigner.open_block(5), 1);
        assert_eq!(assigner.open_block(5), 2);
        assigner.add_work(2, 10);
        // M2 is now the least loaded
        assert_eq!(assigner.open_block(5), 1);
        assert_eq!(assigner.loads(), &[150, 200, 110]);
    }

    #[test]
    fn test_capacity_filter() {
        let machines = machines();
        let setups = vec![100; 3];
        let mut assigner = MachineAssigner::new(&machines, &setups);
        assigner.add_work(1, 10_000);
        // Only M2 holds 20 tools, however loaded it is
        assert_eq!(assigner.open_block(20), 1);
    }

    #[test]
    fn test_per_machine_setup() {
        let machines = machines();
        let setups = vec![100, 300, 200];
        let mut assigner = MachineAssigner::new(&machines, &setups);
        assigner.open_block(1);
        assigner.open_block(1);
        assigner.open_block(1);
        assert_eq!(assigner.loads(), &[100, 300, 200]);
    }

    #[test]
    fn test_fallback_to_largest_magazine() {
        let machines = machines();
        let setups = vec![100; 3];
        let mut assigner = MachineAssigner::new(&machines, &setups);
        assert_eq!(assigner.open_block(99), 1);
    }
}
