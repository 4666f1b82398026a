//! The backend plug-in seam.

use crate::{Interrupt, ModelSnapshot, SolverConfig, SolverError, SolverOutput};

/// A solver engine.
///
/// Implementations only ever see an immutable [`ModelSnapshot`]; they must
/// return one value per snapshot variable, in snapshot order, whenever the
/// status has a solution.
pub trait Solver: Send + Sync {
    /// Short engine name for logs and metadata.
    fn name(&self) -> &str;

    /// Solve the snapshot to completion.
    ///
    /// # Errors
    ///
    /// Returns a `SolverError` only for hard failures: an empty or malformed
    /// snapshot, or an engine crash.
    fn solve(
        &self,
        snapshot: &ModelSnapshot,
        config: &SolverConfig,
    ) -> Result<SolverOutput, SolverError>;

    /// Solve while honoring `interrupt`.
    ///
    /// The default checks the flag before starting and again before handing
    /// back a result; engines with finer-grained hooks should override it.
    fn solve_interruptible(
        &self,
        snapshot: &ModelSnapshot,
        config: &SolverConfig,
        interrupt: &Interrupt,
    ) -> Result<SolverOutput, SolverError> {
        if interrupt.is_triggered() {
            tracing::debug!(
                component = "solver",
                operation = "solve_interruptible",
                status = "cancelled",
                solver = self.name(),
                "Interrupted before the engine started"
            );
            return Ok(SolverOutput::cancelled());
        }
        let output = self.solve(snapshot, config)?;
        if interrupt.is_triggered() {
            tracing::debug!(
                component = "solver",
                operation = "solve_interruptible",
                status = "cancelled",
                solver = self.name(),
                discarded = output.status.as_str(),
                "Interrupted after the engine returned; discarding result"
            );
            return Ok(SolverOutput::cancelled());
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SolverStatus;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingSolver {
        calls: AtomicUsize,
    }

    impl Solver for CountingSolver {
        fn name(&self) -> &str {
            "counting"
        }

        fn solve(
            &self,
            snapshot: &ModelSnapshot,
            _config: &SolverConfig,
        ) -> Result<SolverOutput, SolverError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(SolverOutput::solved(
                SolverStatus::Optimal,
                vec![0.0; snapshot.variables.len()],
                None,
            ))
        }
    }

    #[test]
    fn triggered_interrupt_skips_backend() {
        let solver = CountingSolver::default();
        let interrupt = Interrupt::new();
        interrupt.trigger();
        let out = solver
            .solve_interruptible(&ModelSnapshot::default(), &SolverConfig::new(), &interrupt)
            .expect("cancelled is not an error");
        assert_eq!(out.status, SolverStatus::Cancelled);
        assert_eq!(solver.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn untouched_interrupt_runs_backend() {
        let solver = CountingSolver::default();
        let out = solver
            .solve_interruptible(
                &ModelSnapshot::default(),
                &SolverConfig::new(),
                &Interrupt::new(),
            )
            .expect("fixture solve succeeds");
        assert!(out.is_optimal());
        assert_eq!(solver.calls.load(Ordering::SeqCst), 1);
    }
}
