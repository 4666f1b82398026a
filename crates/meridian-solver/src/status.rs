//! Solve outcome statuses.

use serde::Serialize;

/// Terminal status of one solve request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverStatus {
    /// Proven optimal solution.
    Optimal,
    /// Feasible solution without an optimality proof.
    Feasible,
    Infeasible,
    Unbounded,
    /// Backend stopped on its configured limit without a solution.
    Timeout,
    /// Caller requested cancellation before the backend committed.
    Cancelled,
    /// Backend gave up without a usable answer.
    Error,
}

impl SolverStatus {
    pub fn is_optimal(self) -> bool {
        matches!(self, SolverStatus::Optimal)
    }

    /// Optimal or feasible: the output carries a value vector.
    pub fn has_solution(self) -> bool {
        matches!(self, SolverStatus::Optimal | SolverStatus::Feasible)
    }

    pub fn is_infeasible(self) -> bool {
        matches!(self, SolverStatus::Infeasible)
    }

    pub fn is_unbounded(self) -> bool {
        matches!(self, SolverStatus::Unbounded)
    }

    pub fn is_cancelled(self) -> bool {
        matches!(self, SolverStatus::Cancelled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SolverStatus::Optimal => "optimal",
            SolverStatus::Feasible => "feasible",
            SolverStatus::Infeasible => "infeasible",
            SolverStatus::Unbounded => "unbounded",
            SolverStatus::Timeout => "timeout",
            SolverStatus::Cancelled => "cancelled",
            SolverStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_optimal_and_feasible_carry_solutions() {
        assert!(SolverStatus::Optimal.has_solution());
        assert!(SolverStatus::Feasible.has_solution());
        for status in [
            SolverStatus::Infeasible,
            SolverStatus::Unbounded,
            SolverStatus::Timeout,
            SolverStatus::Cancelled,
            SolverStatus::Error,
        ] {
            assert!(!status.has_solution(), "{status} must not carry values");
        }
    }

    #[test]
    fn status_predicates() {
        assert!(SolverStatus::Optimal.is_optimal());
        assert!(!SolverStatus::Feasible.is_optimal());
        assert!(SolverStatus::Infeasible.is_infeasible());
        assert!(SolverStatus::Unbounded.is_unbounded());
        assert!(SolverStatus::Cancelled.is_cancelled());
    }

    #[test]
    fn status_display() {
        assert_eq!(format!("{}", SolverStatus::Optimal), "optimal");
        assert_eq!(SolverStatus::Timeout.to_string(), "timeout");
    }
}
