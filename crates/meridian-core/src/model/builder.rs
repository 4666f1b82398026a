//! Registration of variables, symbols, the objective and constraints.
//!
//! Every check runs here, at the call that caused it: unknown variables,
//! unknown symbols, non-finite data and duplicate names never reach solve
//! time.

use meridian_expr::{
    ConstraintExpr, ConstraintId, ExprError, Operand, Polynomial, Sense, Variable, VariableArray,
};

use crate::model::error::ModelError;
use crate::model::{MetaModel, ModelState, Objective, RegisteredConstraint};
use crate::symbol::ExpressionSymbol;

impl MetaModel {
    /// Register a variable. Its token index will be its registration order.
    pub fn add_variable(&mut self, variable: &Variable) -> Result<(), ModelError> {
        self.ensure_idle()?;
        if self.state != ModelState::Building {
            return Err(ModelError::ModelFinalized {
                variable: variable.name().to_string(),
            });
        }
        if self.variable_index.contains_key(&variable.id())
            || self.variable_names.contains_key(variable.name())
        {
            return Err(ModelError::NameConflict {
                namespace: "variable",
                name: variable.name().to_string(),
            });
        }

        let position = self.variables.len();
        self.variable_index.insert(variable.id(), position);
        self.variable_names
            .insert(variable.name().to_string(), variable.id());
        self.variables.push(variable.clone());

        tracing::trace!(
            component = "model",
            operation = "add_variable",
            status = "success",
            variable = variable.name(),
            kind = variable.kind().as_str(),
            position,
            "Registered variable"
        );
        Ok(())
    }

    /// Register every member of a shape, in flat order.
    pub fn add_variables<'a, I>(&mut self, variables: I) -> Result<(), ModelError>
    where
        I: IntoIterator<Item = &'a Variable>,
    {
        let before = self.variables.len();
        for variable in variables {
            self.add_variable(variable)?;
        }
        tracing::debug!(
            component = "model",
            operation = "add_variables",
            status = "success",
            added = self.variables.len() - before,
            variables = self.variables.len(),
            "Registered variables"
        );
        Ok(())
    }

    /// Register all members of a declared shape.
    pub fn add_shape(&mut self, shape: &VariableArray) -> Result<(), ModelError> {
        self.add_variables(shape.iter())
    }

    /// Cache `polynomial` under `name`.
    ///
    /// The returned handle can be used in any number of constraints and the
    /// objective; each use resolves to this one cached polynomial.
    pub fn define_symbol(
        &mut self,
        polynomial: Polynomial,
        name: &str,
    ) -> Result<ExpressionSymbol, ModelError> {
        self.ensure_idle()?;
        if self.symbol_names.contains_key(name) {
            return Err(ModelError::NameConflict {
                namespace: "symbol",
                name: name.to_string(),
            });
        }
        polynomial.ensure_finite()?;
        self.ensure_bound(&polynomial)?;

        let symbol = ExpressionSymbol::new(name, polynomial);
        self.symbol_index.insert(symbol.id(), self.symbols.len());
        self.symbol_names.insert(name.to_string(), symbol.id());
        self.symbols.push(symbol.clone());

        tracing::debug!(
            component = "model",
            operation = "define_symbol",
            status = "success",
            symbol = name,
            terms = symbol.polynomial().len(),
            "Defined expression symbol"
        );
        Ok(symbol)
    }

    /// Maximize an operand. A later objective call replaces this one.
    pub fn maximize(&mut self, operand: impl Into<Operand>, name: &str) -> Result<(), ModelError> {
        self.set_objective(Sense::Maximize, operand.into(), name)
    }

    /// Minimize an operand. A later objective call replaces this one.
    pub fn minimize(&mut self, operand: impl Into<Operand>, name: &str) -> Result<(), ModelError> {
        self.set_objective(Sense::Minimize, operand.into(), name)
    }

    fn set_objective(
        &mut self,
        sense: Sense,
        operand: Operand,
        name: &str,
    ) -> Result<(), ModelError> {
        self.ensure_idle()?;
        self.check_operand(&operand)?;

        if let Some(previous) = &self.objective {
            tracing::warn!(
                component = "model",
                operation = "set_objective",
                status = "replaced",
                previous = previous.name.as_str(),
                previous_sense = previous.sense.as_str(),
                objective = name,
                "Objective already set; replacing it"
            );
        }
        self.objective = Some(Objective {
            sense,
            operand,
            name: name.to_string(),
        });
        self.invalidate_results("set_objective");

        tracing::debug!(
            component = "model",
            operation = "set_objective",
            status = "success",
            sense = sense.as_str(),
            objective = name,
            "Set objective function"
        );
        Ok(())
    }

    /// Register a constraint under a unique name.
    ///
    /// An empty name is replaced with `c{index}`.
    pub fn add_constraint(
        &mut self,
        constraint: ConstraintExpr,
        name: &str,
    ) -> Result<ConstraintId, ModelError> {
        self.ensure_idle()?;
        let (operand, sense, rhs, soft) = constraint.into_parts();
        if !rhs.is_finite() {
            return Err(ExprError::NonFiniteCoefficient { coefficient: rhs }.into());
        }
        self.check_operand(&operand)?;

        let name = if name.is_empty() {
            format!("c{}", self.constraints.len())
        } else {
            name.to_string()
        };
        if self.constraint_names.contains_key(&name) {
            return Err(ModelError::NameConflict {
                namespace: "constraint",
                name,
            });
        }

        let id = ConstraintId::new(self.next_constraint_id);
        self.next_constraint_id += 1;
        self.constraint_names.insert(name.clone(), id);
        tracing::debug!(
            component = "model",
            operation = "add_constraint",
            status = "success",
            constraint = name.as_str(),
            sense = sense.as_str(),
            rhs,
            soft,
            "Added constraint"
        );
        self.constraints.push(RegisteredConstraint {
            id,
            name,
            operand,
            sense,
            rhs,
            soft,
        });
        self.invalidate_results("add_constraint");
        Ok(id)
    }

    fn check_operand(&self, operand: &Operand) -> Result<(), ModelError> {
        match operand {
            Operand::Polynomial(polynomial) => {
                polynomial.ensure_finite()?;
                self.ensure_bound(polynomial)
            }
            Operand::Symbol(id) => {
                if self.symbol_index.contains_key(id) {
                    Ok(())
                } else {
                    Err(ModelError::UnknownSymbol { id: *id })
                }
            }
        }
    }
}
