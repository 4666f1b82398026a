//! Backend results for one solve: status, values in token order and diagnostics.

use crate::SolverStatus;
use serde::Serialize;
use std::collections::BTreeMap;

/// What a backend returns for one solve request.
///
/// `values` is `Some` exactly when the status has a solution; it holds one
/// entry per snapshot variable, in token order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolverOutput {
    pub status: SolverStatus,
    pub values: Option<Vec<f64>>,
    pub objective_value: Option<f64>,
    pub solve_time_seconds: f64,
    /// Backend-specific diagnostics (engine name, slack totals, ...).
    pub metadata: BTreeMap<String, String>,
}

impl SolverOutput {
    pub fn solved(status: SolverStatus, values: Vec<f64>, objective_value: Option<f64>) -> Self {
        Self {
            status,
            values: Some(values),
            objective_value,
            solve_time_seconds: 0.0,
            metadata: BTreeMap::new(),
        }
    }

    pub fn without_solution(status: SolverStatus) -> Self {
        Self {
            status,
            values: None,
            objective_value: None,
            solve_time_seconds: 0.0,
            metadata: BTreeMap::new(),
        }
    }

    pub fn cancelled() -> Self {
        Self::without_solution(SolverStatus::Cancelled)
    }

    pub fn with_solve_time(mut self, seconds: f64) -> Self {
        self.solve_time_seconds = seconds;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn is_optimal(&self) -> bool {
        self.status.is_optimal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancelled_output_has_no_values() {
        let out = SolverOutput::cancelled();
        assert_eq!(out.status, SolverStatus::Cancelled);
        assert!(out.values.is_none());
        assert!(out.objective_value.is_none());
    }

    #[test]
    fn solved_output_carries_metadata() {
        let out = SolverOutput::solved(SolverStatus::Optimal, vec![1.0, 0.0], Some(3.0))
            .with_metadata("engine", "fixture")
            .with_solve_time(0.25);
        assert!(out.is_optimal());
        assert_eq!(out.values.as_deref(), Some(&[1.0, 0.0][..]));
        assert_eq!(out.metadata.get("engine").map(String::as_str), Some("fixture"));
    }
}
