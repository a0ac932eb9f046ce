//! Engine error and warning kinds.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::validation::ValidationError;

/// Fatal errors of one planning run. Raised before any generation runs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScheduleError {
    /// Malformed or unschedulable order input.
    #[error("invalid order data: {}", join_messages(.0))]
    InvalidOrderData(Vec<ValidationError>),
    /// Out-of-range scenario parameters or an empty machine set.
    #[error("invalid scenario: {}", join_messages(.0))]
    InvalidScenario(Vec<ValidationError>),
}

impl ScheduleError {
    /// Validation problems carried by the error.
    pub fn problems(&self) -> &[ValidationError] {
        match self {
            Self::InvalidOrderData(errors) | Self::InvalidScenario(errors) => errors,
        }
    }
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Non-fatal conditions reported alongside a best-effort result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScheduleWarning {
    /// The best individual still carries a precedence penalty.
    NoFeasibleSchedule {
        /// Violated precedence pairs.
        violations: usize,
        /// Penalty included in the final fitness.
        penalty: f64,
    },
    /// The run was cancelled before its budget was spent.
    Cancelled {
        /// Generations completed.
        generations: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationErrorKind;

    #[test]
    fn test_error_display_joins_messages() {
        let err = ScheduleError::InvalidScenario(vec![
            ValidationError::new(ValidationErrorKind::ZeroPopulation, "population_size must be positive"),
            ValidationError::new(ValidationErrorKind::ZeroGenerations, "generations must be positive"),
        ]);
        assert_eq!(
            err.to_string(),
            "invalid scenario: population_size must be positive; generations must be positive"
        );
        assert_eq!(err.problems().len(), 2);
    }

    #[test]
    fn test_warning_serde() {
        let w = ScheduleWarning::NoFeasibleSchedule {
            violations: 2,
            penalty: 2.0e12,
        };
        let json = serde_json::to_value(&w).unwrap();
        assert_eq!(json["kind"], "no_feasible_schedule");
        assert_eq!(json["violations"], 2);
    }
}
