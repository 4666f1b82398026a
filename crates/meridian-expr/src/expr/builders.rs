//! Builder functions for constructing polynomials.

use crate::error::ExprError;
use crate::expr::monomial::Monomial;
use crate::expr::polynomial::Polynomial;
use crate::variable::Variable;

/// Sum `f(item)` over a collection, e.g. `sum_by(&arr, |v| 2.0 * v)`.
pub fn sum_by<T, I, F, M>(items: I, mut f: F) -> Polynomial
where
    I: IntoIterator<Item = T>,
    F: FnMut(T) -> M,
    M: Into<Polynomial>,
{
    items
        .into_iter()
        .fold(Polynomial::default(), |acc, item| acc.add(&f(item).into()))
}

/// Combine polynomials into one canonical polynomial.
pub fn linear_sum(polys: Vec<Polynomial>) -> Polynomial {
    polys.into_iter().sum()
}

/// Zip variables with coefficients.
pub fn polynomial_from_parts(
    variables: &[Variable],
    coefficients: &[f64],
) -> Result<Polynomial, ExprError> {
    if variables.len() != coefficients.len() {
        return Err(ExprError::MismatchedLengths {
            variables: variables.len(),
            coefficients: coefficients.len(),
        });
    }
    Polynomial::try_sum(
        variables
            .iter()
            .zip(coefficients)
            .map(|(v, c)| Monomial::new(*c, v.id())),
    )
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::shape::declare_shape;
    use crate::variable::VariableKind;

    #[test]
    fn sum_by_weights_each_member() {
        let arr = declare_shape(&[3], VariableKind::Binary, "c{}").expect("valid");
        let weights = [3.48, 5.62, 7.33];
        let p = sum_by(arr.iter().zip(weights), |(v, w)| w * v);
        assert_eq!(p.len(), 3);
        assert_eq!(p.coefficient_of(arr[2].id()), 7.33);
    }

    #[test]
    fn from_parts_rejects_mismatched_lengths() {
        let x = Variable::binary("x");
        let err = polynomial_from_parts(&[x], &[1.0, 2.0]).unwrap_err();
        assert_eq!(
            err,
            ExprError::MismatchedLengths {
                variables: 1,
                coefficients: 2
            }
        );
    }

    #[test]
    fn linear_sum_merges_terms() {
        let x = Variable::continuous("x");
        let summed = linear_sum(vec![Polynomial::from(&x), Polynomial::from(&x) + 1.0]);
        assert_eq!(summed.terms(), &[(x.id(), 2.0)]);
        assert_eq!(summed.constant(), 1.0);
    }
}
