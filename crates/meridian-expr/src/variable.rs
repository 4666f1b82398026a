//! Typed decision variables.
//!
//! A [`Variable`] is an immutable handle: identity, kind, bounds, name and
//! (for shape members) its position. Values live in the owning model, never
//! on the handle.

use crate::error::ExprError;
use crate::expr::{ConstraintExpr, Operand, Polynomial};
use crate::ids::VariableId;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableKind {
    Continuous,
    UContinuous,
    Percentage,
    Integer,
    UInteger,
    Binary,
    Ternary,
    BalancedTernary,
}

impl VariableKind {
    pub fn as_str(self) -> &'static str {
        match self {
            VariableKind::Continuous => "continuous",
            VariableKind::UContinuous => "ucontinuous",
            VariableKind::Percentage => "percentage",
            VariableKind::Integer => "integer",
            VariableKind::UInteger => "uinteger",
            VariableKind::Binary => "binary",
            VariableKind::Ternary => "ternary",
            VariableKind::BalancedTernary => "balanced_ternary",
        }
    }

    /// Whether values of this kind must be integral.
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            VariableKind::Integer
                | VariableKind::UInteger
                | VariableKind::Binary
                | VariableKind::Ternary
                | VariableKind::BalancedTernary
        )
    }

    pub fn is_binary(self) -> bool {
        self == VariableKind::Binary
    }

    /// Default domain of the kind.
    pub fn domain(self) -> Bounds {
        match self {
            VariableKind::Continuous | VariableKind::Integer => Bounds::unbounded(),
            VariableKind::UContinuous | VariableKind::UInteger => {
                Bounds::new(0.0, f64::INFINITY)
            }
            VariableKind::Percentage | VariableKind::Binary => Bounds::new(0.0, 1.0),
            VariableKind::Ternary => Bounds::new(0.0, 2.0),
            VariableKind::BalancedTernary => Bounds::new(-1.0, 1.0),
        }
    }

    /// Continuous kind covering the same domain.
    pub fn relaxed(self) -> VariableKind {
        match self {
            VariableKind::Binary => VariableKind::Percentage,
            VariableKind::Ternary | VariableKind::UInteger => VariableKind::UContinuous,
            VariableKind::Integer | VariableKind::BalancedTernary => VariableKind::Continuous,
            other => other,
        }
    }
}

impl std::fmt::Display for VariableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub lower: f64,
    pub upper: f64,
}

impl Bounds {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    pub fn unbounded() -> Self {
        Self::new(f64::NEG_INFINITY, f64::INFINITY)
    }

    pub fn is_valid(&self) -> bool {
        !self.lower.is_nan() && !self.upper.is_nan() && self.lower <= self.upper
    }

    /// Tightest bounds satisfying both; `None` when the overlap is empty.
    pub fn intersect(&self, other: &Bounds) -> Option<Bounds> {
        let merged = Bounds::new(self.lower.max(other.lower), self.upper.min(other.upper));
        merged.is_valid().then_some(merged)
    }

    pub fn contains(&self, value: f64, tolerance: f64) -> bool {
        value >= self.lower - tolerance && value <= self.upper + tolerance
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::unbounded()
    }
}

/// Where a variable sits inside its shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShapePosition {
    pub shape: Arc<str>,
    pub index: Vec<usize>,
    pub flat: usize,
}

#[derive(Debug, Clone)]
pub struct Variable {
    id: VariableId,
    kind: VariableKind,
    bounds: Bounds,
    name: Arc<str>,
    position: Option<ShapePosition>,
}

impl Variable {
    /// Declare a free-standing variable.
    ///
    /// Explicit bounds are intersected with the kind's domain.
    pub fn declare(
        kind: VariableKind,
        bounds: Option<Bounds>,
        name: impl Into<Arc<str>>,
    ) -> Result<Self, ExprError> {
        let bounds = resolve_bounds(kind, bounds)?;
        Ok(Self {
            id: VariableId::allocate(),
            kind,
            bounds,
            name: name.into(),
            position: None,
        })
    }

    pub(crate) fn declare_at(
        kind: VariableKind,
        bounds: Bounds,
        name: String,
        position: ShapePosition,
    ) -> Self {
        Self {
            id: VariableId::allocate(),
            kind,
            bounds,
            name: name.into(),
            position: Some(position),
        }
    }

    pub fn binary(name: impl Into<Arc<str>>) -> Self {
        Self::with_domain(VariableKind::Binary, name)
    }

    pub fn continuous(name: impl Into<Arc<str>>) -> Self {
        Self::with_domain(VariableKind::Continuous, name)
    }

    pub fn integer(name: impl Into<Arc<str>>) -> Self {
        Self::with_domain(VariableKind::Integer, name)
    }

    fn with_domain(kind: VariableKind, name: impl Into<Arc<str>>) -> Self {
        Self {
            id: VariableId::allocate(),
            kind,
            bounds: kind.domain(),
            name: name.into(),
            position: None,
        }
    }

    pub fn id(&self) -> VariableId {
        self.id
    }

    pub fn kind(&self) -> VariableKind {
        self.kind
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> Option<&ShapePosition> {
        self.position.as_ref()
    }

    /// The variable as a one-term polynomial.
    pub fn to_polynomial(&self) -> Polynomial {
        Polynomial::var(self.id)
    }

    pub fn leq(&self, rhs: f64) -> ConstraintExpr {
        self.to_polynomial().leq(rhs)
    }

    pub fn geq(&self, rhs: f64) -> ConstraintExpr {
        self.to_polynomial().geq(rhs)
    }

    pub fn eq(&self, rhs: f64) -> ConstraintExpr {
        self.to_polynomial().eq(rhs)
    }
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Variable {}

impl std::hash::Hash for Variable {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl std::fmt::Display for Variable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

impl From<&Variable> for Operand {
    fn from(variable: &Variable) -> Self {
        Operand::Polynomial(variable.to_polynomial())
    }
}

/// Free-function form of [`Variable::declare`].
pub fn declare_variable(
    kind: VariableKind,
    bounds: Option<Bounds>,
    name: impl Into<Arc<str>>,
) -> Result<Variable, ExprError> {
    Variable::declare(kind, bounds, name)
}

pub(crate) fn resolve_bounds(
    kind: VariableKind,
    bounds: Option<Bounds>,
) -> Result<Bounds, ExprError> {
    let domain = kind.domain();
    let Some(explicit) = bounds else {
        return Ok(domain);
    };
    if !explicit.is_valid() {
        return Err(ExprError::InvalidBounds {
            lower: explicit.lower,
            upper: explicit.upper,
        });
    }
    domain
        .intersect(&explicit)
        .ok_or(ExprError::InvalidBounds {
            lower: explicit.lower,
            upper: explicit.upper,
        })
}
