//! Constraint expressions: operand with comparison sense and RHS.

use crate::expr::polynomial::Polynomial;
use crate::ids::SymbolId;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonSense {
    LessEqual,
    GreaterEqual,
    Equal,
}

impl ComparisonSense {
    pub fn as_str(self) -> &'static str {
        match self {
            ComparisonSense::LessEqual => "le",
            ComparisonSense::GreaterEqual => "ge",
            ComparisonSense::Equal => "eq",
        }
    }

    /// Operator as written in LP files.
    pub fn symbol(self) -> &'static str {
        match self {
            ComparisonSense::LessEqual => "<=",
            ComparisonSense::GreaterEqual => ">=",
            ComparisonSense::Equal => "=",
        }
    }

    /// Whether `lhs (sense) rhs` holds within `tolerance`.
    pub fn holds(self, lhs: f64, rhs: f64, tolerance: f64) -> bool {
        match self {
            ComparisonSense::LessEqual => lhs <= rhs + tolerance,
            ComparisonSense::GreaterEqual => lhs >= rhs - tolerance,
            ComparisonSense::Equal => (lhs - rhs).abs() <= tolerance,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Sense {
    Minimize,
    Maximize,
}

impl Sense {
    pub fn as_str(self) -> &'static str {
        match self {
            Sense::Minimize => "minimize",
            Sense::Maximize => "maximize",
        }
    }
}

/// Left side of a constraint or objective: an inline polynomial or a
/// reference to a symbol registered in the owning model.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Polynomial(Polynomial),
    Symbol(SymbolId),
}

impl From<Polynomial> for Operand {
    fn from(polynomial: Polynomial) -> Self {
        Operand::Polynomial(polynomial)
    }
}

impl From<SymbolId> for Operand {
    fn from(id: SymbolId) -> Self {
        Operand::Symbol(id)
    }
}

#[derive(Debug, Clone)]
pub struct ConstraintExpr {
    lhs: Operand,
    sense: ComparisonSense,
    rhs: f64,
    soft: bool,
}

impl ConstraintExpr {
    pub fn new(lhs: Operand, sense: ComparisonSense, rhs: f64) -> Self {
        Self {
            lhs,
            sense,
            rhs,
            soft: false,
        }
    }

    /// Mark the constraint relaxable.
    pub fn soft(mut self) -> Self {
        self.soft = true;
        self
    }

    pub fn lhs(&self) -> &Operand {
        &self.lhs
    }

    pub fn sense(&self) -> ComparisonSense {
        self.sense
    }

    pub fn rhs(&self) -> f64 {
        self.rhs
    }

    pub fn is_soft(&self) -> bool {
        self.soft
    }

    pub fn into_parts(self) -> (Operand, ComparisonSense, f64, bool) {
        (self.lhs, self.sense, self.rhs, self.soft)
    }
}
