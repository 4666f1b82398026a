//! Lowering the live model into an immutable backend snapshot.

use meridian_expr::{Polynomial, VariableId};
use meridian_solver::{
    ModelSnapshot, SnapshotConstraint, SnapshotObjective, SnapshotSymbol, SnapshotTerm,
    SnapshotVariable,
};
use std::time::Instant;

use crate::model::error::ModelError;
use crate::model::{MetaModel, RegisteredConstraint};

impl MetaModel {
    /// Finalize if needed and capture everything a backend needs.
    ///
    /// Symbol operands are expanded from the cache; operand constants are
    /// moved to the right-hand side of constraints.
    pub fn snapshot(&mut self) -> Result<ModelSnapshot, ModelError> {
        self.finalize();
        self.lower()
    }

    pub(crate) fn lower(&self) -> Result<ModelSnapshot, ModelError> {
        let started = Instant::now();

        let variables = self
            .tokens
            .iter()
            .map(|token| SnapshotVariable {
                index: token.index,
                id: token.variable.id(),
                name: token.variable.name().to_string(),
                kind: token.variable.kind(),
                bounds: token.variable.bounds(),
            })
            .collect();

        let constraints = self.lower_constraints()?;

        let objective = match &self.objective {
            Some(objective) => {
                let polynomial = self.resolve_operand(&objective.operand)?;
                Some(SnapshotObjective {
                    name: objective.name.clone(),
                    sense: objective.sense,
                    terms: self.lower_terms(polynomial)?,
                    constant: polynomial.constant(),
                })
            }
            None => None,
        };

        let symbols = self
            .symbols
            .iter()
            .map(|symbol| {
                Ok(SnapshotSymbol {
                    name: symbol.name().to_string(),
                    terms: self.lower_terms(symbol.polynomial())?,
                    constant: symbol.polynomial().constant(),
                })
            })
            .collect::<Result<Vec<_>, ModelError>>()?;

        let snapshot = ModelSnapshot {
            name: self.name().to_string(),
            variables,
            constraints,
            objective,
            symbols,
        };

        tracing::debug!(
            component = "model",
            operation = "snapshot",
            status = "success",
            variables = snapshot.num_variables(),
            constraints = snapshot.num_constraints(),
            symbols = snapshot.symbols.len(),
            duration_ms = started.elapsed().as_secs_f64() * 1000.0,
            "Lowered model to snapshot"
        );
        Ok(snapshot)
    }

    #[cfg(feature = "parallel")]
    fn lower_constraints(&self) -> Result<Vec<SnapshotConstraint>, ModelError> {
        use rayon::prelude::*;

        self.constraints
            .par_iter()
            .map(|constraint| self.lower_constraint(constraint))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn lower_constraints(&self) -> Result<Vec<SnapshotConstraint>, ModelError> {
        self.constraints
            .iter()
            .map(|constraint| self.lower_constraint(constraint))
            .collect()
    }

    fn lower_constraint(
        &self,
        constraint: &RegisteredConstraint,
    ) -> Result<SnapshotConstraint, ModelError> {
        let polynomial = self.resolve_operand(&constraint.operand)?;
        let lowered = SnapshotConstraint {
            name: constraint.name.clone(),
            terms: self.lower_terms(polynomial)?,
            sense: constraint.sense,
            rhs: constraint.rhs - polynomial.constant(),
            soft: constraint.soft,
        };
        tracing::trace!(
            component = "model",
            operation = "lower_constraint",
            constraint = constraint.name.as_str(),
            constraint_id = constraint.id.inner(),
            terms = lowered.terms.len(),
            "Lowered constraint"
        );
        Ok(lowered)
    }

    fn lower_terms(&self, polynomial: &Polynomial) -> Result<Vec<SnapshotTerm>, ModelError> {
        polynomial
            .terms()
            .iter()
            .map(|&(variable, coefficient)| {
                Ok(SnapshotTerm {
                    variable,
                    column: self.column_of(variable)?,
                    coefficient,
                })
            })
            .collect()
    }

    fn column_of(&self, variable: VariableId) -> Result<usize, ModelError> {
        self.variable_index
            .get(&variable)
            .copied()
            .filter(|&pos| pos < self.tokens.len())
            .ok_or(ModelError::UnboundVariable { variable })
    }
}
