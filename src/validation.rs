//! Input validation for planning runs.
//!
//! Checks structural integrity of orders, machines, and the scenario
//! before any optimization work begins. Detects:
//! - Duplicate IDs
//! - Zero quantities and empty or broken routings
//! - Operations needing more tools than any machine holds
//! - Out-of-range GA parameters and horizons
//!
//! Every check runs; all problems found are reported together.

use crate::models::{Machine, Order, Scenario};
use std::collections::HashSet;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// An order asks for zero pieces.
    ZeroQuantity,
    /// An order has no operations.
    EmptyOperations,
    /// Operation codes are not OP1, OP2, ... in order.
    BrokenOperationSequence,
    /// An operation has no positive processing time.
    NonPositiveDuration,
    /// A loading or rotation time is negative.
    NegativeDuration,
    /// An operation needs more distinct tools than any machine holds.
    ToolCapacityExceeded,
    /// The machine set is empty.
    NoMachines,
    /// A machine record is unusable (zero capacity, bad setup).
    InvalidMachine,
    /// A rate lies outside `[0, 1]`.
    InvalidRate,
    /// Population size is zero.
    ZeroPopulation,
    /// Generation budget is zero.
    ZeroGenerations,
    /// Horizon end is not after its start.
    InvalidHorizon,
    /// Setup duration is not positive.
    InvalidSetupDuration,
    /// Any other out-of-range scenario knob.
    InvalidParameter,
}

impl ValidationError {
    /// Creates a validation error.
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates the scenario and the machine set.
///
/// Checks:
/// 1. At least one machine, unique machine IDs, positive capacities
/// 2. Positive population size and generation budget
/// 3. Crossover and mutation rates in `[0, 1]`
/// 4. Positive setup duration, horizon end after start
/// 5. Tournament size and elite count usable for the population
pub fn validate_scenario(scenario: &Scenario, machines: &[Machine]) -> ValidationResult {
    let mut errors = Vec::new();

    if machines.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::NoMachines,
            "machine set is empty",
        ));
    }

    let mut machine_ids = HashSet::new();
    for m in machines {
        if !machine_ids.insert(m.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate machine ID: {}", m.id),
            ));
        }
        if m.tool_capacity == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidMachine,
                format!("Machine '{}' has zero tool capacity", m.id),
            ));
        }
        if let Some(setup) = m.setup_ms {
            if setup <= 0 {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidMachine,
                    format!("Machine '{}' has non-positive setup duration {setup}", m.id),
                ));
            }
        }
    }

    if scenario.population_size == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::ZeroPopulation,
            "population_size must be positive",
        ));
    }
    if scenario.generations == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::ZeroGenerations,
            "generations must be positive",
        ));
    }

    for (name, rate) in [
        ("crossover_rate", scenario.crossover_rate),
        ("mutation_rate", scenario.mutation_rate),
    ] {
        if !(0.0..=1.0).contains(&rate) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidRate,
                format!("{name} must lie in [0, 1], got {rate}"),
            ));
        }
    }

    if scenario.setup_duration_ms <= 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidSetupDuration,
            format!(
                "setup_duration_ms must be positive, got {}",
                scenario.setup_duration_ms
            ),
        ));
    }
    if scenario.horizon_end_ms <= scenario.horizon_start_ms {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidHorizon,
            format!(
                "horizon end {} must be after horizon start {}",
                scenario.horizon_end_ms, scenario.horizon_start_ms
            ),
        ));
    }

    if scenario.tournament_size == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidParameter,
            "tournament_size must be positive",
        ));
    }
    if scenario.population_size > 0 && scenario.elite_count >= scenario.population_size {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidParameter,
            format!(
                "elite_count {} must be smaller than population_size {}",
                scenario.elite_count, scenario.population_size
            ),
        ));
    }
    if scenario.stall_generations == Some(0) {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidParameter,
            "stall_generations must be positive when set",
        ));
    }
    if !(scenario.precedence_penalty.is_finite() && scenario.precedence_penalty > 0.0) {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidParameter,
            "precedence_penalty must be a positive finite number",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates the order set against the machine set.
///
/// Checks:
/// 1. No duplicate order IDs
/// 2. Positive quantity, at least one operation
/// 3. Routing declares OP1, OP2, ... consecutively
/// 4. Positive per-piece processing time, non-negative load/rotation
/// 5. Every operation fits the magazine of at least one machine
pub fn validate_orders(orders: &[Order], machines: &[Machine]) -> ValidationResult {
    let mut errors = Vec::new();
    let max_capacity = machines.iter().map(|m| m.tool_capacity).max().unwrap_or(0) as usize;

    let mut order_ids = HashSet::new();
    for order in orders {
        if !order_ids.insert(order.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate order ID: {}", order.id),
            ));
        }

        if order.quantity == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::ZeroQuantity,
                format!("Order '{}' has zero quantity", order.id),
            ));
        }

        if order.operations.is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyOperations,
                format!("Order '{}' has no operations", order.id),
            ));
        }

        if order.load_ms < 0 || order.rotation_ms < 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::NegativeDuration,
                format!("Order '{}' has a negative loading or rotation time", order.id),
            ));
        }

        for (i, op) in order.operations.iter().enumerate() {
            let expected = i + 1;
            if usize::from(op.code.number()) != expected {
                errors.push(ValidationError::new(
                    ValidationErrorKind::BrokenOperationSequence,
                    format!(
                        "Order '{}' declares {} at position {expected}, expected OP{expected}",
                        order.id, op.code
                    ),
                ));
            }

            if order.quantity > 0 && op.unit_duration_ms(order.quantity) <= 0 {
                errors.push(ValidationError::new(
                    ValidationErrorKind::NonPositiveDuration,
                    format!(
                        "Order '{}' {} has no positive per-piece duration",
                        order.id, op.code
                    ),
                ));
            }

            let tools = op.distinct_tool_count();
            if !machines.is_empty() && tools > max_capacity {
                errors.push(ValidationError::new(
                    ValidationErrorKind::ToolCapacityExceeded,
                    format!(
                        "Order '{}' {} needs {tools} tools but the largest magazine holds {max_capacity}",
                        order.id, op.code
                    ),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Operation, OperationCode};
    use test_case::test_case;

    fn sample_machines() -> Vec<Machine> {
        vec![Machine::new("M1", 12), Machine::new("M2", 8)]
    }

    fn two_op_order(id: &str, quantity: u32) -> Order {
        Order::new(id, quantity)
            .with_operation(
                Operation::new(OperationCode::OP1)
                    .with_duration(600)
                    .with_tools(["T1", "T2"]),
            )
            .with_operation(
                Operation::new(OperationCode::OP2)
                    .with_duration(300)
                    .with_tools(["T3"]),
            )
    }

    fn has_kind(result: ValidationResult, kind: ValidationErrorKind) -> bool {
        result.unwrap_err().iter().any(|e| e.kind == kind)
    }

    #[test]
    fn test_valid_input() {
        let orders = vec![two_op_order("A", 2), two_op_order("B", 3)];
        assert!(validate_orders(&orders, &sample_machines()).is_ok());
        assert!(validate_scenario(&Scenario::default(), &sample_machines()).is_ok());
    }

    #[test]
    fn test_duplicate_order_id() {
        let orders = vec![two_op_order("A", 2), two_op_order("A", 1)];
        assert!(has_kind(
            validate_orders(&orders, &sample_machines()),
            ValidationErrorKind::DuplicateId
        ));
    }

    #[test]
    fn test_zero_quantity() {
        let orders = vec![two_op_order("A", 0)];
        assert!(has_kind(
            validate_orders(&orders, &sample_machines()),
            ValidationErrorKind::ZeroQuantity
        ));
    }

    #[test]
    fn test_empty_operations() {
        let orders = vec![Order::new("A", 1)];
        assert!(has_kind(
            validate_orders(&orders, &sample_machines()),
            ValidationErrorKind::EmptyOperations
        ));
    }

    #[test]
    fn test_op2_without_op1() {
        let orders = vec![Order::new("A", 1).with_operation(
            Operation::new(OperationCode::OP2).with_duration(100),
        )];
        assert!(has_kind(
            validate_orders(&orders, &sample_machines()),
            ValidationErrorKind::BrokenOperationSequence
        ));
    }

    #[test]
    fn test_non_positive_duration() {
        // 2 ms over 3 pieces rounds down to zero per piece
        let orders = vec![Order::new("A", 3).with_operation(
            Operation::new(OperationCode::OP1).with_duration(2),
        )];
        assert!(has_kind(
            validate_orders(&orders, &sample_machines()),
            ValidationErrorKind::NonPositiveDuration
        ));
    }

    #[test]
    fn test_negative_rotation() {
        let orders = vec![two_op_order("A", 1).with_rotation_time(-5)];
        assert!(has_kind(
            validate_orders(&orders, &sample_machines()),
            ValidationErrorKind::NegativeDuration
        ));
    }

    #[test]
    fn test_tool_capacity_exceeded_on_every_machine() {
        let tools: Vec<String> = (0..13).map(|i| format!("T{i}")).collect();
        let orders = vec![Order::new("A", 1).with_operation(
            Operation::new(OperationCode::OP1)
                .with_duration(100)
                .with_tools(tools),
        )];
        assert!(has_kind(
            validate_orders(&orders, &sample_machines()),
            ValidationErrorKind::ToolCapacityExceeded
        ));
    }

    #[test]
    fn test_tool_capacity_fits_largest_machine() {
        // 10 tools: too many for M2 (8) but fine on M1 (12)
        let tools: Vec<String> = (0..10).map(|i| format!("T{i}")).collect();
        let orders = vec![Order::new("A", 1).with_operation(
            Operation::new(OperationCode::OP1)
                .with_duration(100)
                .with_tools(tools),
        )];
        assert!(validate_orders(&orders, &sample_machines()).is_ok());
    }

    #[test_case(Scenario::default().with_population_size(0), ValidationErrorKind::ZeroPopulation; "zero population")]
    #[test_case(Scenario::default().with_generations(0), ValidationErrorKind::ZeroGenerations; "zero generations")]
    #[test_case(Scenario::default().with_crossover_rate(1.5), ValidationErrorKind::InvalidRate; "crossover above one")]
    #[test_case(Scenario::default().with_mutation_rate(-0.1), ValidationErrorKind::InvalidRate; "negative mutation")]
    #[test_case(Scenario::default().with_setup_duration(0), ValidationErrorKind::InvalidSetupDuration; "zero setup")]
    #[test_case(Scenario::default().with_horizon(100, 100), ValidationErrorKind::InvalidHorizon; "empty horizon")]
    #[test_case(Scenario::default().with_tournament_size(0), ValidationErrorKind::InvalidParameter; "zero tournament")]
    #[test_case(Scenario::default().with_population_size(2).with_elite_count(2), ValidationErrorKind::InvalidParameter; "elites fill population")]
    fn test_invalid_scenario(scenario: Scenario, kind: ValidationErrorKind) {
        assert!(has_kind(validate_scenario(&scenario, &sample_machines()), kind));
    }

    #[test]
    fn test_empty_machine_set() {
        assert!(has_kind(
            validate_scenario(&Scenario::default(), &[]),
            ValidationErrorKind::NoMachines
        ));
    }

    #[test]
    fn test_invalid_machines() {
        let machines = vec![
            Machine::new("M1", 0),
            Machine::new("M1", 10).with_setup(-1),
        ];
        let errors = validate_scenario(&Scenario::default(), &machines).unwrap_err();
        assert!(errors.iter().any(|e| e.kind == ValidationErrorKind::DuplicateId));
        assert_eq!(
            errors
                .iter()
                .filter(|e| e.kind == ValidationErrorKind::InvalidMachine)
                .count(),
            2
        );
    }

    #[test]
    fn test_multiple_errors() {
        let orders = vec![Order::new("A", 0), Order::new("A", 1)];
        let errors = validate_orders(&orders, &sample_machines()).unwrap_err();
        assert!(errors.len() >= 3);
    }
}
