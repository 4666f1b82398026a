//! Meridian modeling core.
//!
//! [`MetaModel`] owns registered variables, expression symbols, the
//! objective and the constraint set. On the first solve it assigns every
//! variable a token, lowers itself to a [`meridian_solver::ModelSnapshot`]
//! for a pluggable backend and maps the returned vector back onto tokens.

pub mod dispatch;
pub mod model;
pub mod symbol;

pub use dispatch::{SolveCanceller, SolveTask};
pub use model::{MetaModel, ModelError, ModelState, Token, DEFAULT_TOLERANCE};
pub use symbol::ExpressionSymbol;

pub use meridian_expr as expr;
pub use meridian_solver as solver;
