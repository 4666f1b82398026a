//! Read-only model inspection.

use meridian_expr::{Sense, Variable};

use crate::model::MetaModel;
use crate::symbol::ExpressionSymbol;

impl MetaModel {
    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_symbols(&self) -> usize {
        self.symbols.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Registered variables in registration order.
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn variable_by_name(&self, name: &str) -> Option<&Variable> {
        let id = self.variable_names.get(name)?;
        self.variable_index
            .get(id)
            .map(|&pos| &self.variables[pos])
    }

    pub fn symbol(&self, name: &str) -> Option<&ExpressionSymbol> {
        let id = self.symbol_names.get(name)?;
        self.symbol_index.get(id).map(|&pos| &self.symbols[pos])
    }

    pub fn symbols(&self) -> &[ExpressionSymbol] {
        &self.symbols
    }

    /// Constraint names in registration order.
    pub fn constraint_names(&self) -> Vec<&str> {
        self.constraints.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn objective_sense(&self) -> Option<Sense> {
        self.objective.as_ref().map(|o| o.sense)
    }

    pub fn objective_name(&self) -> Option<&str> {
        self.objective.as_ref().map(|o| o.name.as_str())
    }
}
