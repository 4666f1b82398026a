//! Status conversions for microlp outcomes.

use meridian_solver::{SolverError, SolverStatus};

/// Expected engine failures become statuses; anything else is a hard error.
pub(crate) fn status_from_error(err: microlp::Error) -> Result<SolverStatus, SolverError> {
    match err {
        microlp::Error::Infeasible => Ok(SolverStatus::Infeasible),
        microlp::Error::Unbounded => Ok(SolverStatus::Unbounded),
        microlp::Error::InternalError(msg) => Err(SolverError::InternalError(msg)),
    }
}

pub(crate) fn error_string(err: &microlp::Error) -> &'static str {
    match err {
        microlp::Error::Infeasible => "infeasible",
        microlp::Error::Unbounded => "unbounded",
        microlp::Error::InternalError(_) => "internal_error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_outcomes_map_to_statuses() {
        assert_eq!(
            status_from_error(microlp::Error::Infeasible),
            Ok(SolverStatus::Infeasible)
        );
        assert_eq!(
            status_from_error(microlp::Error::Unbounded),
            Ok(SolverStatus::Unbounded)
        );
    }

    #[test]
    fn test_internal_error_is_hard_failure() {
        let err = status_from_error(microlp::Error::InternalError("singular basis".into()))
            .unwrap_err();
        assert_eq!(err.code(), "SOLVER_INTERNAL");
        assert!(err.to_string().contains("singular basis"));
    }

    #[test]
    fn test_error_strings() {
        assert_eq!(error_string(&microlp::Error::Infeasible), "infeasible");
        assert_eq!(error_string(&microlp::Error::Unbounded), "unbounded");
        assert_eq!(
            error_string(&microlp::Error::InternalError(String::new())),
            "internal_error"
        );
    }
}
