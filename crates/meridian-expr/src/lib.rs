//! Decision variables, shapes and the linear expression algebra.
//!
//! - [`variable`]: typed decision variables and their domains
//! - [`shape`]: fixed-size multi-dimensional variable collections
//! - [`expr`]: monomials, canonical polynomials and constraint expressions

pub mod error;
pub mod expr;
pub mod ids;
pub mod shape;
pub mod variable;

pub use error::ExprError;
pub use expr::{
    ComparisonSense, ConstraintExpr, Monomial, Operand, Polynomial, Sense, linear_sum,
    polynomial_from_parts, sum_by,
};
pub use ids::{ConstraintId, SymbolId, VariableId};
pub use shape::{Shape, VariableArray, declare_shape, declare_shape_bounded};
pub use variable::{Bounds, ShapePosition, Variable, VariableKind, declare_variable};
