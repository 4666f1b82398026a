//! Canonical linear polynomial: one term per variable + constant.
//!
//! Terms are merged through a `BTreeMap`, so they are always sorted by
//! `VariableId`, free of duplicates and free of zero coefficients. Each
//! variable's addends are sorted before they are accumulated, so the result
//! is bit-identical whatever order the monomials were supplied in.

use crate::error::ExprError;
use crate::expr::constraint::{ComparisonSense, ConstraintExpr, Operand};
use crate::expr::monomial::Monomial;
use crate::ids::VariableId;
use crate::variable::Variable;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polynomial {
    terms: Vec<(VariableId, f64)>,
    constant: f64,
}

impl Polynomial {
    // ── Constructors ────────────────────────────────────────

    /// Sum monomials into canonical form.
    pub fn sum<I>(monomials: I) -> Self
    where
        I: IntoIterator<Item = Monomial>,
    {
        let mut grouped: BTreeMap<VariableId, Vec<f64>> = BTreeMap::new();
        let mut constants = Vec::new();
        for monomial in monomials {
            match monomial.variable {
                Some(var_id) => grouped.entry(var_id).or_default().push(monomial.coefficient),
                None => constants.push(monomial.coefficient),
            }
        }
        Self {
            terms: grouped
                .into_iter()
                .map(|(var_id, addends)| (var_id, ordered_sum(addends)))
                .filter(|(_, c)| *c != 0.0)
                .collect(),
            constant: ordered_sum(constants),
        }
    }

    /// Like [`Polynomial::sum`], rejecting NaN or infinite coefficients.
    pub fn try_sum<I>(monomials: I) -> Result<Self, ExprError>
    where
        I: IntoIterator<Item = Monomial>,
    {
        let monomials: Vec<Monomial> = monomials.into_iter().collect();
        if let Some(bad) = monomials.iter().find(|m| !m.coefficient.is_finite()) {
            return Err(ExprError::NonFiniteCoefficient {
                coefficient: bad.coefficient,
            });
        }
        Ok(Self::sum(monomials))
    }

    /// From raw (variable, coefficient) pairs; duplicates are merged.
    pub fn from_terms<I>(terms: I, constant: f64) -> Self
    where
        I: IntoIterator<Item = (VariableId, f64)>,
    {
        Self::sum(
            terms
                .into_iter()
                .map(|(var_id, coeff)| Monomial::new(coeff, var_id))
                .chain(std::iter::once(Monomial::constant(constant))),
        )
    }

    pub fn from_constant(constant: f64) -> Self {
        Self {
            terms: Vec::new(),
            constant,
        }
    }

    /// Single term: coeff * var.
    pub fn term(var_id: VariableId, coeff: f64) -> Self {
        if coeff == 0.0 {
            return Self::default();
        }
        Self {
            terms: vec![(var_id, coeff)],
            constant: 0.0,
        }
    }

    /// Single variable with coefficient 1.0.
    pub fn var(var_id: VariableId) -> Self {
        Self::term(var_id, 1.0)
    }

    // ── Accessors ───────────────────────────────────────────

    pub fn terms(&self) -> &[(VariableId, f64)] {
        &self.terms
    }

    pub fn constant(&self) -> f64 {
        self.constant
    }

    pub fn coefficient_of(&self, var_id: VariableId) -> f64 {
        self.terms
            .binary_search_by_key(&var_id, |(id, _)| *id)
            .map(|pos| self.terms[pos].1)
            .unwrap_or(0.0)
    }

    pub fn variables(&self) -> impl Iterator<Item = VariableId> + '_ {
        self.terms.iter().map(|(id, _)| *id)
    }

    /// Terms as monomials, the constant last when non-zero.
    pub fn monomials(&self) -> Vec<Monomial> {
        let mut out: Vec<Monomial> = self
            .terms
            .iter()
            .map(|(id, c)| Monomial::new(*c, *id))
            .collect();
        if self.constant != 0.0 {
            out.push(Monomial::constant(self.constant));
        }
        out
    }

    pub fn is_constant(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty() && self.constant == 0.0
    }

    /// First non-finite coefficient or constant, if any.
    pub fn ensure_finite(&self) -> Result<(), ExprError> {
        let bad = self
            .terms
            .iter()
            .map(|(_, c)| *c)
            .chain(std::iter::once(self.constant))
            .find(|c| !c.is_finite());
        match bad {
            Some(coefficient) => Err(ExprError::NonFiniteCoefficient { coefficient }),
            None => Ok(()),
        }
    }

    // ── Operations ──────────────────────────────────────────

    pub fn add(&self, other: &Polynomial) -> Self {
        Self::sum(self.monomials().into_iter().chain(other.monomials()))
    }

    pub fn scale(&self, by: f64) -> Self {
        Self {
            terms: self
                .terms
                .iter()
                .map(|(v, c)| (*v, *c * by))
                .filter(|(_, c)| *c != 0.0)
                .collect(),
            constant: self.constant * by,
        }
    }

    pub fn add_constant(&self, value: f64) -> Self {
        Self {
            terms: self.terms.clone(),
            constant: self.constant + value,
        }
    }

    pub fn without_constant(&self) -> Self {
        Self {
            terms: self.terms.clone(),
            constant: 0.0,
        }
    }

    /// Evaluate with `value` supplying each variable's value.
    pub fn evaluate<F>(&self, mut value: F) -> f64
    where
        F: FnMut(VariableId) -> f64,
    {
        self.terms
            .iter()
            .fold(self.constant, |acc, (id, c)| acc + c * value(*id))
    }

    // ── Comparison methods (produce ConstraintExpr) ─────────

    pub fn compare_scalar(&self, rhs: f64, sense: ComparisonSense) -> ConstraintExpr {
        ConstraintExpr::new(
            Operand::Polynomial(self.without_constant()),
            sense,
            rhs - self.constant,
        )
    }

    pub fn compare_expr(&self, other: &Polynomial, sense: ComparisonSense) -> ConstraintExpr {
        let combined = self.add(&other.scale(-1.0));
        combined.compare_scalar(0.0, sense)
    }

    pub fn leq(&self, rhs: f64) -> ConstraintExpr {
        self.compare_scalar(rhs, ComparisonSense::LessEqual)
    }

    pub fn geq(&self, rhs: f64) -> ConstraintExpr {
        self.compare_scalar(rhs, ComparisonSense::GreaterEqual)
    }

    pub fn eq(&self, rhs: f64) -> ConstraintExpr {
        self.compare_scalar(rhs, ComparisonSense::Equal)
    }

    pub fn leq_expr(&self, rhs: &Polynomial) -> ConstraintExpr {
        self.compare_expr(rhs, ComparisonSense::LessEqual)
    }

    pub fn geq_expr(&self, rhs: &Polynomial) -> ConstraintExpr {
        self.compare_expr(rhs, ComparisonSense::GreaterEqual)
    }

    pub fn eq_expr(&self, rhs: &Polynomial) -> ConstraintExpr {
        self.compare_expr(rhs, ComparisonSense::Equal)
    }
}

/// Float addition is not associative; sorting the addends first makes the
/// total independent of the order they arrived in.
fn ordered_sum(mut addends: Vec<f64>) -> f64 {
    addends.sort_by(f64::total_cmp);
    addends.into_iter().fold(0.0, |acc, c| acc + c)
}

// ── Conversions ─────────────────────────────────────────────

impl From<Monomial> for Polynomial {
    fn from(monomial: Monomial) -> Self {
        Polynomial::sum([monomial])
    }
}

impl From<&Variable> for Polynomial {
    fn from(variable: &Variable) -> Self {
        Polynomial::var(variable.id())
    }
}

impl From<f64> for Polynomial {
    fn from(constant: f64) -> Self {
        Polynomial::from_constant(constant)
    }
}

impl FromIterator<Monomial> for Polynomial {
    fn from_iter<I: IntoIterator<Item = Monomial>>(iter: I) -> Self {
        Polynomial::sum(iter)
    }
}

impl std::iter::Sum<Monomial> for Polynomial {
    fn sum<I: Iterator<Item = Monomial>>(iter: I) -> Self {
        Polynomial::sum(iter)
    }
}

impl std::iter::Sum<Polynomial> for Polynomial {
    fn sum<I: Iterator<Item = Polynomial>>(iter: I) -> Self {
        Polynomial::sum(iter.flat_map(|p| p.monomials()))
    }
}

// ── Operator overloads ──────────────────────────────────────

impl std::ops::Add for Polynomial {
    type Output = Polynomial;

    fn add(self, rhs: Polynomial) -> Self::Output {
        Polynomial::add(&self, &rhs)
    }
}

impl std::ops::Sub for Polynomial {
    type Output = Polynomial;

    fn sub(self, rhs: Polynomial) -> Self::Output {
        Polynomial::add(&self, &rhs.scale(-1.0))
    }
}

impl std::ops::Mul<f64> for Polynomial {
    type Output = Polynomial;

    fn mul(self, rhs: f64) -> Self::Output {
        self.scale(rhs)
    }
}

impl std::ops::Mul<Polynomial> for f64 {
    type Output = Polynomial;

    fn mul(self, rhs: Polynomial) -> Self::Output {
        rhs.scale(self)
    }
}

impl std::ops::Neg for Polynomial {
    type Output = Polynomial;

    fn neg(self) -> Self::Output {
        self.scale(-1.0)
    }
}

impl std::ops::Add<f64> for Polynomial {
    type Output = Polynomial;

    fn add(self, rhs: f64) -> Self::Output {
        self.add_constant(rhs)
    }
}

impl std::ops::Sub<f64> for Polynomial {
    type Output = Polynomial;

    fn sub(self, rhs: f64) -> Self::Output {
        self.add_constant(-rhs)
    }
}
