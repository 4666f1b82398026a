//! Token assignment.
//!
//! Tokens are created once, at the first finalization, one per registered
//! variable with `index` equal to its registration position. Variable
//! registration is closed afterwards, so the table is never renumbered.

use meridian_expr::Variable;

use crate::model::{MetaModel, ModelState};

/// Solver-facing handle for one registered variable.
#[derive(Debug, Clone)]
pub struct Token {
    pub(crate) variable: Variable,
    pub(crate) index: usize,
    pub(crate) result: Option<f64>,
}

impl Token {
    pub fn variable(&self) -> &Variable {
        &self.variable
    }

    /// Column in snapshots and position in solution vectors.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Value written by the last successful solve.
    pub fn result(&self) -> Option<f64> {
        self.result
    }
}

impl MetaModel {
    /// Assign tokens if that has not happened yet. Idempotent.
    pub fn finalize(&mut self) {
        if self.state != ModelState::Building {
            return;
        }
        self.tokens = self
            .variables
            .iter()
            .enumerate()
            .map(|(index, variable)| Token {
                variable: variable.clone(),
                index,
                result: None,
            })
            .collect();
        self.state = ModelState::Finalized;
        tracing::debug!(
            component = "model",
            operation = "finalize",
            status = "success",
            tokens = self.tokens.len(),
            "Assigned solver tokens"
        );
    }

    /// Token table in index order; empty until finalization.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn token(&self, variable: &Variable) -> Option<&Token> {
        self.variable_index
            .get(&variable.id())
            .and_then(|&pos| self.tokens.get(pos))
    }
}
