//! The meta-model: registry of variables, symbols, objective and constraints.
//!
//! # Module Organization
//!
//! - [`error`]: Model error types
//! - `builder`: variable, symbol, objective and constraint registration
//! - `tokens`: token assignment at finalization
//! - `lower`: snapshot lowering for backends
//! - `solution`: mapping solver values back onto tokens
//! - `inspect`: read-only accessors

mod builder;
mod error;
mod inspect;
mod lower;
mod solution;
mod tokens;

use crate::symbol::ExpressionSymbol;
use meridian_expr::{
    ComparisonSense, ConstraintId, Operand, Polynomial, Sense, SymbolId, Variable, VariableId,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub use error::ModelError;
pub use tokens::Token;

/// Tolerance used when validating solution values against variable domains.
pub const DEFAULT_TOLERANCE: f64 = 1e-5;

/// Lifecycle of a [`MetaModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelState {
    /// Accepting registrations; no tokens yet.
    Building,
    /// Tokens assigned; no results.
    Finalized,
    /// Every token carries a result.
    Solved,
}

impl ModelState {
    pub fn as_str(self) -> &'static str {
        match self {
            ModelState::Building => "building",
            ModelState::Finalized => "finalized",
            ModelState::Solved => "solved",
        }
    }
}

impl std::fmt::Display for ModelState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Objective {
    pub(crate) sense: Sense,
    pub(crate) operand: Operand,
    pub(crate) name: String,
}

#[derive(Debug, Clone)]
pub(crate) struct RegisteredConstraint {
    pub(crate) id: ConstraintId,
    pub(crate) name: String,
    pub(crate) operand: Operand,
    pub(crate) sense: ComparisonSense,
    pub(crate) rhs: f64,
    pub(crate) soft: bool,
}

/// Mutable container for one optimization problem.
///
/// Created empty, populated through registration calls, finalized on the
/// first solve (tokens assigned in registration order) and marked solved
/// once a successful outcome has been mapped back. Exclusive access comes
/// from `&mut self`; an asynchronous solve additionally blocks building
/// calls until its task is finished or dropped.
#[derive(Debug)]
pub struct MetaModel {
    name: String,
    pub(crate) variables: Vec<Variable>,
    pub(crate) variable_index: HashMap<VariableId, usize>,
    pub(crate) variable_names: HashMap<String, VariableId>,
    pub(crate) symbols: Vec<ExpressionSymbol>,
    pub(crate) symbol_index: HashMap<SymbolId, usize>,
    pub(crate) symbol_names: HashMap<String, SymbolId>,
    pub(crate) objective: Option<Objective>,
    pub(crate) constraints: Vec<RegisteredConstraint>,
    pub(crate) constraint_names: HashMap<String, ConstraintId>,
    pub(crate) next_constraint_id: u32,
    pub(crate) tokens: Vec<Token>,
    pub(crate) state: ModelState,
    tolerance: f64,
    in_flight: Arc<AtomicBool>,
}

impl MetaModel {
    /// Create a new empty model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variables: Vec::new(),
            variable_index: HashMap::new(),
            variable_names: HashMap::new(),
            symbols: Vec::new(),
            symbol_index: HashMap::new(),
            symbol_names: HashMap::new(),
            objective: None,
            constraints: Vec::new(),
            constraint_names: HashMap::new(),
            next_constraint_id: 0,
            tokens: Vec::new(),
            state: ModelState::Building,
            tolerance: DEFAULT_TOLERANCE,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> ModelState {
        self.state
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Tolerance for solution validation and the selected-set filter.
    pub fn set_tolerance(&mut self, tolerance: f64) {
        self.tolerance = tolerance.abs();
        tracing::debug!(
            component = "model",
            operation = "set_tolerance",
            status = "success",
            tolerance = self.tolerance,
            "Updated solution tolerance"
        );
    }

    /// Whether an asynchronous solve is pending.
    pub fn is_solving(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub(crate) fn in_flight_flag(&self) -> &Arc<AtomicBool> {
        &self.in_flight
    }

    pub(crate) fn ensure_idle(&self) -> Result<(), ModelError> {
        if self.is_solving() {
            Err(ModelError::SolveInProgress)
        } else {
            Ok(())
        }
    }

    pub(crate) fn ensure_bound(&self, polynomial: &Polynomial) -> Result<(), ModelError> {
        for var_id in polynomial.variables() {
            if !self.variable_index.contains_key(&var_id) {
                return Err(ModelError::UnboundVariable { variable: var_id });
            }
        }
        Ok(())
    }

    /// Polynomial behind an operand, symbols resolved through the cache.
    pub(crate) fn resolve_operand<'a>(
        &'a self,
        operand: &'a Operand,
    ) -> Result<&'a Polynomial, ModelError> {
        match operand {
            Operand::Polynomial(polynomial) => Ok(polynomial),
            Operand::Symbol(id) => self
                .symbol_index
                .get(id)
                .map(|&pos| self.symbols[pos].polynomial())
                .ok_or(ModelError::UnknownSymbol { id: *id }),
        }
    }

    /// Drop results after the objective or constraints change.
    pub(crate) fn invalidate_results(&mut self, operation: &'static str) {
        if self.state == ModelState::Solved {
            self.reset_results();
            tracing::debug!(
                component = "model",
                operation,
                status = "invalidated",
                "Cleared stale results after model edit"
            );
        }
    }
}

impl Default for MetaModel {
    fn default() -> Self {
        Self::new("model")
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use meridian_expr::{VariableKind, declare_shape};

    mod lifecycle;
    mod solution_mapping;
    mod support;
    mod symbols;

    #[test]
    fn test_new_model_is_empty() {
        let model = MetaModel::new("empty");
        assert_eq!(model.name(), "empty");
        assert_eq!(model.num_variables(), 0);
        assert_eq!(model.num_constraints(), 0);
        assert_eq!(model.state(), ModelState::Building);
        assert_eq!(model.tolerance(), DEFAULT_TOLERANCE);
        assert!(!model.is_solving());
    }

    #[test]
    fn test_unregistered_variable_in_constraint_is_rejected() {
        let mut model = MetaModel::default();
        let arr = declare_shape(&[2], VariableKind::Binary, "x{}").expect("valid shape");
        model.add_variable(&arr[0]).expect("registers");
        let err = model
            .add_constraint((Polynomial::from(&arr[0]) + Polynomial::from(&arr[1])).leq(1.0), "c")
            .unwrap_err();
        assert_eq!(
            err,
            ModelError::UnboundVariable {
                variable: arr[1].id()
            }
        );
    }

    #[test]
    fn test_set_tolerance_is_absolute() {
        let mut model = MetaModel::default();
        model.set_tolerance(-1e-3);
        assert_eq!(model.tolerance(), 1e-3);
    }
}
