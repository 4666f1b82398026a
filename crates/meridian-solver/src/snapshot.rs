//! Read-only model snapshot handed to backends.
//!
//! Variables appear in token order: `variables[i].index == i`, and every
//! term addresses its variable both by identity and by that column.
//! Symbol references are already expanded into plain terms.

use crate::SolverError;
use meridian_expr::{Bounds, ComparisonSense, Sense, VariableId, VariableKind};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotVariable {
    pub index: usize,
    pub id: VariableId,
    pub name: String,
    pub kind: VariableKind,
    pub bounds: Bounds,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SnapshotTerm {
    pub variable: VariableId,
    pub column: usize,
    pub coefficient: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotConstraint {
    pub name: String,
    pub terms: Vec<SnapshotTerm>,
    pub sense: ComparisonSense,
    pub rhs: f64,
    pub soft: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotObjective {
    pub name: String,
    pub sense: Sense,
    pub terms: Vec<SnapshotTerm>,
    pub constant: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotSymbol {
    pub name: String,
    pub terms: Vec<SnapshotTerm>,
    pub constant: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModelSnapshot {
    pub name: String,
    pub variables: Vec<SnapshotVariable>,
    pub constraints: Vec<SnapshotConstraint>,
    pub objective: Option<SnapshotObjective>,
    pub symbols: Vec<SnapshotSymbol>,
}

impl ModelSnapshot {
    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn contains_binary(&self) -> bool {
        self.variables.iter().any(|v| v.kind.is_binary())
    }

    pub fn contains_integer(&self) -> bool {
        self.variables.iter().any(|v| v.kind.is_integer())
    }

    /// Copy with every variable replaced by its continuous relaxation.
    pub fn linear_relax(&self) -> ModelSnapshot {
        let mut relaxed = self.clone();
        for variable in &mut relaxed.variables {
            variable.kind = variable.kind.relaxed();
        }
        relaxed
    }

    /// Check structural consistency before handing the snapshot to an engine.
    pub fn validate(&self) -> Result<(), SolverError> {
        if self.variables.is_empty() {
            return Err(SolverError::EmptyModel);
        }
        for (position, variable) in self.variables.iter().enumerate() {
            if variable.index != position {
                return Err(SolverError::MalformedSnapshot(format!(
                    "variable '{}' has index {} at position {}",
                    variable.name, variable.index, position
                )));
            }
            if !variable.bounds.is_valid() {
                return Err(SolverError::MalformedSnapshot(format!(
                    "variable '{}' has empty bounds",
                    variable.name
                )));
            }
        }
        for constraint in &self.constraints {
            self.check_terms(&constraint.name, &constraint.terms)?;
            if !constraint.rhs.is_finite() {
                return Err(SolverError::MalformedSnapshot(format!(
                    "constraint '{}' has non-finite rhs",
                    constraint.name
                )));
            }
        }
        if let Some(objective) = &self.objective {
            self.check_terms(&objective.name, &objective.terms)?;
        }
        Ok(())
    }

    fn check_terms(&self, owner: &str, terms: &[SnapshotTerm]) -> Result<(), SolverError> {
        for term in terms {
            let Some(variable) = self.variables.get(term.column) else {
                return Err(SolverError::MalformedSnapshot(format!(
                    "'{}' references column {} of {}",
                    owner,
                    term.column,
                    self.variables.len()
                )));
            };
            if variable.id != term.variable {
                return Err(SolverError::MalformedSnapshot(format!(
                    "'{}' column {} is not variable {}",
                    owner, term.column, term.variable
                )));
            }
            if !term.coefficient.is_finite() {
                return Err(SolverError::MalformedSnapshot(format!(
                    "'{}' has non-finite coefficient on '{}'",
                    owner, variable.name
                )));
            }
        }
        Ok(())
    }

    /// Objective value of `values` (token order), constant included.
    pub fn objective_value(&self, values: &[f64]) -> Option<f64> {
        let objective = self.objective.as_ref()?;
        Some(
            objective
                .terms
                .iter()
                .map(|t| t.coefficient * values.get(t.column).copied().unwrap_or(0.0))
                .sum::<f64>()
                + objective.constant,
        )
    }

    /// Render in CPLEX LP format.
    pub fn to_lp(&self) -> String {
        LpFormat(self).to_string()
    }
}

struct LpFormat<'a>(&'a ModelSnapshot);

impl LpFormat<'_> {
    fn write_terms(&self, f: &mut fmt::Formatter<'_>, terms: &[SnapshotTerm]) -> fmt::Result {
        let mut written = 0;
        for term in terms.iter().filter(|t| t.coefficient != 0.0) {
            let name = &self.0.variables[term.column].name;
            if written == 0 {
                if term.coefficient == 1.0 {
                    write!(f, "{name}")?;
                } else if term.coefficient == -1.0 {
                    write!(f, "- {name}")?;
                } else {
                    write!(f, "{} {name}", term.coefficient)?;
                }
            } else {
                let sign = if term.coefficient < 0.0 { '-' } else { '+' };
                let magnitude = term.coefficient.abs();
                if magnitude == 1.0 {
                    write!(f, " {sign} {name}")?;
                } else {
                    write!(f, " {sign} {magnitude} {name}")?;
                }
            }
            written += 1;
        }
        if written == 0 {
            write!(f, "0")?;
        }
        Ok(())
    }
}

impl fmt::Display for LpFormat<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.0;
        match &snapshot.objective {
            Some(objective) => {
                let header = match objective.sense {
                    Sense::Minimize => "Minimize",
                    Sense::Maximize => "Maximize",
                };
                writeln!(f, "{header}")?;
                write!(f, " {}: ", lp_name(&objective.name, "obj"))?;
                self.write_terms(f, &objective.terms)?;
                if objective.constant != 0.0 {
                    let sign = if objective.constant < 0.0 { '-' } else { '+' };
                    write!(f, " {sign} {}", objective.constant.abs())?;
                }
                writeln!(f)?;
            }
            None => writeln!(f, "Minimize\n obj: 0")?,
        }
        writeln!(f)?;

        writeln!(f, "Subject To")?;
        for (row, constraint) in snapshot.constraints.iter().enumerate() {
            let fallback = format!("c{row}");
            write!(f, " {}: ", lp_name(&constraint.name, &fallback))?;
            self.write_terms(f, &constraint.terms)?;
            writeln!(f, " {} {}", constraint.sense.symbol(), constraint.rhs)?;
        }
        writeln!(f)?;

        writeln!(f, "Bounds")?;
        for variable in &snapshot.variables {
            let Bounds { lower, upper } = variable.bounds;
            let name = &variable.name;
            match (lower.is_infinite(), upper.is_infinite()) {
                (true, true) => writeln!(f, " {name} free")?,
                (true, false) => writeln!(f, " -inf <= {name} <= {upper}")?,
                (false, true) => writeln!(f, " {name} >= {lower}")?,
                (false, false) if lower == upper => writeln!(f, " {name} = {lower}")?,
                (false, false) => writeln!(f, " {lower} <= {name} <= {upper}")?,
            }
        }
        writeln!(f)?;

        let generals: Vec<&str> = snapshot
            .variables
            .iter()
            .filter(|v| v.kind.is_integer() && !v.kind.is_binary())
            .map(|v| v.name.as_str())
            .collect();
        if !generals.is_empty() {
            writeln!(f, "Generals")?;
            writeln!(f, " {}", generals.join(" "))?;
            writeln!(f)?;
        }

        let binaries: Vec<&str> = snapshot
            .variables
            .iter()
            .filter(|v| v.kind.is_binary())
            .map(|v| v.name.as_str())
            .collect();
        if !binaries.is_empty() {
            writeln!(f, "Binaries")?;
            writeln!(f, " {}", binaries.join(" "))?;
            writeln!(f)?;
        }

        writeln!(f, "End")
    }
}

fn lp_name<'a>(name: &'a str, fallback: &'a str) -> &'a str {
    if name.is_empty() { fallback } else { name }
}
