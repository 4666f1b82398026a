//! Mapping solver values back onto tokens, and reading them.

use meridian_expr::{Variable, VariableKind};
use meridian_solver::{SolverError, SolverOutput};

use crate::model::error::ModelError;
use crate::model::tokens::Token;
use crate::model::{MetaModel, ModelState};
use crate::symbol::ExpressionSymbol;

impl MetaModel {
    /// Write `values` (token order) into the token table.
    ///
    /// All values are validated against kind and bounds before anything is
    /// written, so a failure leaves the model untouched. Integer kinds are
    /// stored rounded. Applying the same vector twice is a no-op the second
    /// time. Finalizes the model if it was still building.
    pub fn apply_solution(&mut self, values: &[f64]) -> Result<(), ModelError> {
        self.ensure_idle()?;
        self.finalize();
        self.write_results(values)
    }

    pub(crate) fn write_results(&mut self, values: &[f64]) -> Result<(), ModelError> {
        if values.len() != self.tokens.len() {
            return Err(ModelError::SolutionShapeMismatch {
                expected: self.tokens.len(),
                actual: values.len(),
            });
        }

        let tolerance = self.tolerance();
        let checked = self
            .tokens
            .iter()
            .zip(values)
            .map(|(token, &value)| checked_value(token, value, tolerance))
            .collect::<Result<Vec<f64>, ModelError>>()?;

        for (token, value) in self.tokens.iter_mut().zip(checked) {
            token.result = Some(value);
        }
        self.state = ModelState::Solved;

        tracing::debug!(
            component = "model",
            operation = "apply_solution",
            status = "success",
            tokens = self.tokens.len(),
            "Applied solution to tokens"
        );
        Ok(())
    }

    /// Consume a backend output: write values on success, leave the model
    /// finalized otherwise.
    pub(crate) fn accept_output(&mut self, output: &SolverOutput) -> Result<(), ModelError> {
        if !output.status.has_solution() {
            tracing::debug!(
                component = "model",
                operation = "accept_output",
                status = output.status.as_str(),
                "Solve finished without a solution"
            );
            return Ok(());
        }
        let values = output.values.as_deref().ok_or_else(|| {
            ModelError::Solver(SolverError::InternalError(format!(
                "backend reported {} without values",
                output.status
            )))
        })?;
        self.write_results(values)
    }

    /// Drop results; a solved model returns to `Finalized`.
    pub fn clear_solution(&mut self) {
        if self.state == ModelState::Solved {
            self.reset_results();
            tracing::debug!(
                component = "model",
                operation = "clear_solution",
                status = "success",
                "Cleared solution"
            );
        }
    }

    pub(crate) fn reset_results(&mut self) {
        for token in &mut self.tokens {
            token.result = None;
        }
        if self.state == ModelState::Solved {
            self.state = ModelState::Finalized;
        }
    }

    /// Solved value of a registered variable.
    pub fn value_of(&self, variable: &Variable) -> Option<f64> {
        self.token(variable).and_then(Token::result)
    }

    /// Solved value of a symbol, evaluated from the cached polynomial.
    pub fn value_of_symbol(&self, symbol: &ExpressionSymbol) -> Option<f64> {
        if self.state != ModelState::Solved || !self.symbol_index.contains_key(&symbol.id()) {
            return None;
        }
        Some(symbol.polynomial().evaluate(|id| self.result_by_id(id)))
    }

    /// Objective evaluated at the current results.
    pub fn objective_value(&self) -> Option<f64> {
        if self.state != ModelState::Solved {
            return None;
        }
        let objective = self.objective.as_ref()?;
        let polynomial = self.resolve_operand(&objective.operand).ok()?;
        Some(polynomial.evaluate(|id| self.result_by_id(id)))
    }

    /// Binary members of `variables` whose value is 1 within tolerance.
    pub fn selected<'a>(&self, variables: &'a [Variable]) -> Vec<&'a Variable> {
        variables
            .iter()
            .filter(|variable| {
                variable.kind().is_binary()
                    && self
                        .value_of(variable)
                        .is_some_and(|value| is_one(value, self.tolerance()))
            })
            .collect()
    }

    /// All binary tokens whose value is 1 within tolerance.
    pub fn selected_tokens(&self) -> Vec<&Token> {
        self.tokens
            .iter()
            .filter(|token| {
                token.variable.kind().is_binary()
                    && token
                        .result
                        .is_some_and(|value| is_one(value, self.tolerance()))
            })
            .collect()
    }

    fn result_by_id(&self, id: meridian_expr::VariableId) -> f64 {
        self.variable_index
            .get(&id)
            .and_then(|&pos| self.tokens.get(pos))
            .and_then(Token::result)
            .unwrap_or(0.0)
    }
}

fn is_one(value: f64, tolerance: f64) -> bool {
    (value - 1.0).abs() <= tolerance
}

fn checked_value(token: &Token, value: f64, tolerance: f64) -> Result<f64, ModelError> {
    let variable = &token.variable;
    let kind = variable.kind();
    let violation = || ModelError::DomainViolation {
        variable: variable.name().to_string(),
        kind,
        value,
    };

    if !value.is_finite() || !variable.bounds().contains(value, tolerance) {
        return Err(violation());
    }
    if !kind.is_integer() {
        return Ok(value);
    }
    let rounded = value.round();
    if (value - rounded).abs() > tolerance {
        return Err(violation());
    }
    if kind == VariableKind::Binary && rounded != 0.0 && rounded != 1.0 {
        return Err(violation());
    }
    Ok(rounded)
}
