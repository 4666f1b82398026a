//! Expression types for optimization modeling.
//!
//! - `monomial`: Monomial: coefficient times at most one variable
//! - `polynomial`: Polynomial: canonical linear terms + constant
//! - `constraint`: ConstraintExpr: operand with comparison sense and RHS
//! - `builders`: free functions assembling polynomials

pub mod builders;
pub mod constraint;
pub mod monomial;
pub mod polynomial;

pub use builders::{linear_sum, polynomial_from_parts, sum_by};
pub use constraint::{ComparisonSense, ConstraintExpr, Operand, Sense};
pub use monomial::Monomial;
pub use polynomial::Polynomial;
