//! Expression symbols: named polynomials registered once per model.

use meridian_expr::{ComparisonSense, ConstraintExpr, Operand, Polynomial, SymbolId};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_SYMBOL_ID: AtomicU32 = AtomicU32::new(0);

/// Handle to a polynomial cached inside a [`crate::MetaModel`].
///
/// Clones share the same polynomial. Constraints and objectives built from
/// a symbol reference it by id, so the polynomial is lowered from the
/// model's cache rather than rebuilt.
#[derive(Debug, Clone)]
pub struct ExpressionSymbol {
    id: SymbolId,
    name: Arc<str>,
    polynomial: Arc<Polynomial>,
}

impl ExpressionSymbol {
    pub(crate) fn new(name: &str, polynomial: Polynomial) -> Self {
        Self {
            id: SymbolId::new(NEXT_SYMBOL_ID.fetch_add(1, Ordering::Relaxed)),
            name: name.into(),
            polynomial: Arc::new(polynomial),
        }
    }

    pub fn id(&self) -> SymbolId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn polynomial(&self) -> &Polynomial {
        &self.polynomial
    }

    /// Whether both handles point at the same cached polynomial.
    pub fn shares_polynomial(&self, other: &ExpressionSymbol) -> bool {
        Arc::ptr_eq(&self.polynomial, &other.polynomial)
    }

    fn compare(&self, rhs: f64, sense: ComparisonSense) -> ConstraintExpr {
        ConstraintExpr::new(Operand::Symbol(self.id), sense, rhs)
    }

    pub fn leq(&self, rhs: f64) -> ConstraintExpr {
        self.compare(rhs, ComparisonSense::LessEqual)
    }

    pub fn geq(&self, rhs: f64) -> ConstraintExpr {
        self.compare(rhs, ComparisonSense::GreaterEqual)
    }

    pub fn eq(&self, rhs: f64) -> ConstraintExpr {
        self.compare(rhs, ComparisonSense::Equal)
    }
}

impl From<&ExpressionSymbol> for Operand {
    fn from(symbol: &ExpressionSymbol) -> Self {
        Operand::Symbol(symbol.id)
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use meridian_expr::Variable;

    #[test]
    fn comparisons_reference_the_symbol() {
        let x = Variable::binary("x");
        let symbol = ExpressionSymbol::new("capital", Polynomial::from(&x) + 2.0);
        let c = symbol.geq(10.0);
        assert_eq!(c.lhs(), &Operand::Symbol(symbol.id()));
        // The constant is folded at lowering time, not here.
        assert_eq!(c.rhs(), 10.0);
    }

    #[test]
    fn clones_share_the_cached_polynomial() {
        let x = Variable::binary("x");
        let symbol = ExpressionSymbol::new("s", Polynomial::from(&x));
        let clone = symbol.clone();
        assert!(symbol.shares_polynomial(&clone));
        assert_ne!(
            symbol.id(),
            ExpressionSymbol::new("t", Polynomial::from(&x)).id()
        );
    }
}
