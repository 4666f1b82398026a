//! Hard backend failures.
//!
//! Infeasible, unbounded, timeout and cancelled outcomes are statuses on
//! [`crate::SolverOutput`], not errors.

/// Error type for solver operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolverError {
    /// Snapshot has no variables.
    EmptyModel,
    /// Snapshot is internally inconsistent (bad column reference, non-finite data).
    MalformedSnapshot(String),
    /// Engine crashed or returned nonsense.
    InternalError(String),
    /// Backend cannot handle this model at all.
    NotAvailable(String),
}

impl SolverError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            SolverError::EmptyModel => "MODEL_EMPTY",
            SolverError::MalformedSnapshot(_) => "SNAPSHOT_MALFORMED",
            SolverError::InternalError(_) => "SOLVER_INTERNAL",
            SolverError::NotAvailable(_) => "SOLVER_NOT_AVAILABLE",
        }
    }
}

impl std::fmt::Display for SolverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolverError::EmptyModel => write!(f, "[{}] Model has no variables", self.code()),
            SolverError::MalformedSnapshot(msg) => {
                write!(f, "[{}] Malformed snapshot: {}", self.code(), msg)
            }
            SolverError::InternalError(msg) => {
                write!(f, "[{}] Solver internal error: {}", self.code(), msg)
            }
            SolverError::NotAvailable(msg) => {
                write!(f, "[{}] Solver not available: {}", self.code(), msg)
            }
        }
    }
}

impl std::error::Error for SolverError {}
