use crate::expr::polynomial::Polynomial;
use crate::ids::VariableId;
use crate::variable::Variable;

/// A coefficient times zero or one variable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Monomial {
    pub coefficient: f64,
    pub variable: Option<VariableId>,
}

impl Monomial {
    pub fn new(coefficient: f64, variable: VariableId) -> Self {
        Self {
            coefficient,
            variable: Some(variable),
        }
    }

    pub fn constant(value: f64) -> Self {
        Self {
            coefficient: value,
            variable: None,
        }
    }

    pub fn is_constant(&self) -> bool {
        self.variable.is_none()
    }
}

impl From<&Variable> for Monomial {
    fn from(variable: &Variable) -> Self {
        Monomial::new(1.0, variable.id())
    }
}

impl std::ops::Mul<&Variable> for f64 {
    type Output = Monomial;

    fn mul(self, rhs: &Variable) -> Self::Output {
        Monomial::new(self, rhs.id())
    }
}

impl std::ops::Mul<f64> for &Variable {
    type Output = Monomial;

    fn mul(self, rhs: f64) -> Self::Output {
        Monomial::new(rhs, self.id())
    }
}

impl std::ops::Mul<f64> for Monomial {
    type Output = Monomial;

    fn mul(self, rhs: f64) -> Self::Output {
        Monomial {
            coefficient: self.coefficient * rhs,
            variable: self.variable,
        }
    }
}

impl std::ops::Neg for Monomial {
    type Output = Monomial;

    fn neg(self) -> Self::Output {
        self * -1.0
    }
}

impl std::ops::Add for Monomial {
    type Output = Polynomial;

    fn add(self, rhs: Monomial) -> Self::Output {
        Polynomial::sum([self, rhs])
    }
}

impl std::ops::Sub for Monomial {
    type Output = Polynomial;

    fn sub(self, rhs: Monomial) -> Self::Output {
        Polynomial::sum([self, -rhs])
    }
}

impl std::ops::Add<Monomial> for Polynomial {
    type Output = Polynomial;

    fn add(self, rhs: Monomial) -> Self::Output {
        Polynomial::add(&self, &Polynomial::from(rhs))
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::Monomial;
    use crate::variable::Variable;

    #[test]
    fn scalar_times_variable() {
        let x = Variable::binary("x");
        let left = 3.0 * &x;
        let right = &x * 3.0;
        assert_eq!(left, right);
        assert_eq!(left.variable, Some(x.id()));
        assert_eq!(left.coefficient, 3.0);
    }

    #[test]
    fn adding_monomials_merges_same_variable() {
        let x = Variable::continuous("x");
        let p = 2.0 * &x + 3.0 * &x;
        assert_eq!(p.terms(), &[(x.id(), 5.0)]);
    }

    #[test]
    fn constant_monomial_folds_into_constant() {
        let x = Variable::continuous("x");
        let p = 2.0 * &x + Monomial::constant(4.0);
        assert_eq!(p.constant(), 4.0);
        assert_eq!(p.terms().len(), 1);
    }

    #[test]
    fn negation_and_subtraction() {
        let x = Variable::continuous("x");
        let y = Variable::continuous("y");
        let p = 2.0 * &x - 1.5 * &y;
        assert_eq!(p.coefficient_of(y.id()), -1.5);
        assert_eq!((-(2.0 * &x)).coefficient, -2.0);
    }
}
