//! Variable, shape and expression construction errors.

#[derive(Debug, Clone, PartialEq)]
pub enum ExprError {
    InvalidShape { dims: Vec<usize> },
    InvalidBounds { lower: f64, upper: f64 },
    NonFiniteCoefficient { coefficient: f64 },
    MismatchedLengths { variables: usize, coefficients: usize },
}

impl ExprError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            ExprError::InvalidShape { .. } => "SHAPE_INVALID",
            ExprError::InvalidBounds { .. } => "BOUNDS_INVALID",
            ExprError::NonFiniteCoefficient { .. } => "EXPR_NON_FINITE_COEFFICIENT",
            ExprError::MismatchedLengths { .. } => "EXPR_MISMATCHED_LENGTHS",
        }
    }
}

impl std::fmt::Display for ExprError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExprError::InvalidShape { dims } => write!(
                f,
                "[{}] shape dimensions must be non-empty and positive, got {:?}",
                self.code(),
                dims
            ),
            ExprError::InvalidBounds { lower, upper } => write!(
                f,
                "[{}] bounds [{}, {}] leave an empty domain",
                self.code(),
                lower,
                upper
            ),
            ExprError::NonFiniteCoefficient { coefficient } => write!(
                f,
                "[{}] coefficient {} is not finite",
                self.code(),
                coefficient
            ),
            ExprError::MismatchedLengths {
                variables,
                coefficients,
            } => write!(
                f,
                "[{}] {} variables but {} coefficients",
                self.code(),
                variables,
                coefficients
            ),
        }
    }
}

impl std::error::Error for ExprError {}

#[cfg(test)]
mod tests {
    use super::ExprError;

    #[test]
    fn error_code_is_stable() {
        assert_eq!(
            ExprError::InvalidShape { dims: vec![0] }.code(),
            "SHAPE_INVALID"
        );
        assert_eq!(
            ExprError::InvalidBounds {
                lower: 1.0,
                upper: 0.0
            }
            .code(),
            "BOUNDS_INVALID"
        );
        assert_eq!(
            ExprError::NonFiniteCoefficient {
                coefficient: f64::NAN
            }
            .code(),
            "EXPR_NON_FINITE_COEFFICIENT"
        );
    }

    #[test]
    fn display_prefixes_error_code() {
        let rendered = ExprError::InvalidShape { dims: vec![2, 0] }.to_string();
        assert!(rendered.starts_with("[SHAPE_INVALID]"));
        assert!(rendered.contains("[2, 0]"));
    }
}
