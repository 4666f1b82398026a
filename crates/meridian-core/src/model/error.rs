//! Model error types.

use meridian_expr::{ExprError, SymbolId, VariableId, VariableKind};
use meridian_solver::SolverError;

/// Errors raised by model building, solve dispatch and solution mapping.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    /// Invalid expression, bounds or shape.
    Expr(ExprError),
    /// Name already registered in this namespace.
    NameConflict { namespace: &'static str, name: String },
    /// Expression references a variable that was never added to the model.
    ///
    /// Expressions carry only ids, so the id is all there is to report.
    UnboundVariable { variable: VariableId },
    /// Operand references a symbol this model does not own.
    UnknownSymbol { id: SymbolId },
    /// Variables cannot be added once tokens are assigned.
    ModelFinalized { variable: String },
    /// An asynchronous solve is pending on this model.
    SolveInProgress,
    /// Solution vector length differs from the token count.
    SolutionShapeMismatch { expected: usize, actual: usize },
    /// Value outside the variable's kind or bounds.
    DomainViolation {
        variable: String,
        kind: VariableKind,
        value: f64,
    },
    /// A solve task was finished against a model that did not start it.
    ForeignSolveTask,
    /// Hard backend failure.
    Solver(SolverError),
}

impl ModelError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            ModelError::Expr(err) => err.code(),
            ModelError::NameConflict { .. } => "NAME_CONFLICT",
            ModelError::UnboundVariable { .. } => "VARIABLE_UNBOUND",
            ModelError::UnknownSymbol { .. } => "SYMBOL_UNKNOWN",
            ModelError::ModelFinalized { .. } => "MODEL_FINALIZED",
            ModelError::SolveInProgress => "SOLVE_IN_PROGRESS",
            ModelError::SolutionShapeMismatch { .. } => "SOLUTION_SHAPE_MISMATCH",
            ModelError::DomainViolation { .. } => "SOLUTION_DOMAIN_VIOLATION",
            ModelError::ForeignSolveTask => "SOLVE_TASK_FOREIGN",
            ModelError::Solver(err) => err.code(),
        }
    }
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelError::Expr(err) => write!(f, "{err}"),
            ModelError::Solver(err) => write!(f, "{err}"),
            ModelError::NameConflict { namespace, name } => write!(
                f,
                "[{}] {} name '{}' is already registered",
                self.code(),
                namespace,
                name
            ),
            ModelError::UnboundVariable { variable } => write!(
                f,
                "[{}] Variable with id {} is not registered in this model; add it or its shape first",
                self.code(),
                variable
            ),
            ModelError::UnknownSymbol { id } => write!(
                f,
                "[{}] Symbol {} is not defined in this model",
                self.code(),
                id
            ),
            ModelError::ModelFinalized { variable } => write!(
                f,
                "[{}] Cannot add variable '{}' after tokens were assigned",
                self.code(),
                variable
            ),
            ModelError::SolveInProgress => write!(
                f,
                "[{}] An asynchronous solve is pending on this model",
                self.code()
            ),
            ModelError::SolutionShapeMismatch { expected, actual } => write!(
                f,
                "[{}] Expected {} solution values, got {}",
                self.code(),
                expected,
                actual
            ),
            ModelError::DomainViolation {
                variable,
                kind,
                value,
            } => write!(
                f,
                "[{}] Value {} is outside the {} domain of '{}'",
                self.code(),
                value,
                kind,
                variable
            ),
            ModelError::ForeignSolveTask => write!(
                f,
                "[{}] Solve task belongs to a different model",
                self.code()
            ),
        }
    }
}

impl std::error::Error for ModelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ModelError::Expr(err) => Some(err),
            ModelError::Solver(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ExprError> for ModelError {
    fn from(err: ExprError) -> Self {
        ModelError::Expr(err)
    }
}

impl From<SolverError> for ModelError {
    fn from(err: SolverError) -> Self {
        ModelError::Solver(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapped_errors_keep_their_code() {
        let err = ModelError::from(ExprError::InvalidShape { dims: vec![0] });
        assert_eq!(err.code(), "SHAPE_INVALID");
        assert!(err.to_string().starts_with("[SHAPE_INVALID]"));

        let err = ModelError::from(SolverError::EmptyModel);
        assert_eq!(err.code(), "MODEL_EMPTY");
    }

    #[test]
    fn display_prefixes_error_code() {
        let err = ModelError::NameConflict {
            namespace: "symbol",
            name: "profit".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "[NAME_CONFLICT] symbol name 'profit' is already registered"
        );
        let err = ModelError::SolutionShapeMismatch {
            expected: 3,
            actual: 2,
        };
        assert!(err.to_string().contains("Expected 3"));
    }

    #[test]
    fn unbound_variable_reports_typed_id() {
        let err = ModelError::UnboundVariable {
            variable: VariableId::new(17),
        };
        assert_eq!(err.code(), "VARIABLE_UNBOUND");
        assert!(err.to_string().contains("id 17 is not registered"));
    }
}
