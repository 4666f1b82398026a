//! Solve dispatch: blocking, and cancellable asynchronous.
//!
//! Both forms finalize the model, clear earlier results and hand the
//! backend a snapshot, never the live model. The asynchronous form runs
//! the backend on a dedicated worker thread and returns a [`SolveTask`];
//! results reach the model only when the task is finished against it.

use meridian_solver::{Interrupt, ModelSnapshot, Solver, SolverConfig, SolverError, SolverOutput};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tokio::sync::{oneshot, watch};

use crate::model::{MetaModel, ModelError};

impl MetaModel {
    /// Solve on the calling thread.
    ///
    /// Infeasible, unbounded, timeout and cancelled outcomes come back as
    /// an `Ok` output and leave the model `Finalized`; only hard backend
    /// failures are errors.
    pub fn solve<S>(&mut self, solver: &S, config: &SolverConfig) -> Result<SolverOutput, ModelError>
    where
        S: Solver + ?Sized,
    {
        self.ensure_idle()?;
        let snapshot = self.prepare_solve()?;
        let started = Instant::now();
        tracing::debug!(
            component = "dispatch",
            operation = "solve",
            status = "start",
            backend = solver.name(),
            variables = snapshot.num_variables(),
            constraints = snapshot.num_constraints(),
            "Dispatching blocking solve"
        );

        let output = solver.solve(&snapshot, config)?;
        self.accept_output(&output)?;

        tracing::debug!(
            component = "dispatch",
            operation = "solve",
            status = output.status.as_str(),
            backend = solver.name(),
            objective_value = ?output.objective_value,
            duration_ms = started.elapsed().as_secs_f64() * 1000.0,
            "Blocking solve finished"
        );
        Ok(output)
    }

    /// Start a solve on a worker thread.
    ///
    /// Until the returned task is finished or dropped, building calls and
    /// further solves on this model fail with `SolveInProgress`.
    pub fn solve_async(
        &mut self,
        solver: Arc<dyn Solver>,
        config: SolverConfig,
    ) -> Result<SolveTask, ModelError> {
        self.ensure_idle()?;
        let snapshot = self.prepare_solve()?;

        let flag = Arc::clone(self.in_flight_flag());
        if flag
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(ModelError::SolveInProgress);
        }
        let interrupt = Interrupt::new();
        let guard = InFlightGuard {
            flag,
            interrupt: interrupt.clone(),
        };

        let (cancel_tx, cancel_rx) = watch::channel(false);
        let (result_tx, result_rx) = oneshot::channel();
        let backend = solver.name().to_string();
        let worker_interrupt = interrupt.clone();
        let variables = snapshot.num_variables();

        std::thread::Builder::new()
            .name(format!("meridian-solve-{backend}"))
            .spawn(move || {
                let result = run_worker(solver.as_ref(), &snapshot, &config, &worker_interrupt);
                // The receiver is gone when the task was cancelled or dropped.
                let _ = result_tx.send(result);
            })
            .map_err(|err| {
                ModelError::Solver(SolverError::InternalError(format!(
                    "failed to spawn solve worker: {err}"
                )))
            })?;

        tracing::debug!(
            component = "dispatch",
            operation = "solve_async",
            status = "start",
            backend = backend.as_str(),
            variables,
            "Dispatched asynchronous solve"
        );

        Ok(SolveTask {
            result_rx,
            cancel_rx,
            canceller: SolveCanceller {
                cancel_tx: Arc::new(cancel_tx),
                interrupt,
            },
            guard,
            backend,
            started: Instant::now(),
        })
    }

    fn prepare_solve(&mut self) -> Result<ModelSnapshot, ModelError> {
        self.finalize();
        self.reset_results();
        self.lower()
    }
}

fn run_worker(
    solver: &dyn Solver,
    snapshot: &ModelSnapshot,
    config: &SolverConfig,
    interrupt: &Interrupt,
) -> Result<SolverOutput, SolverError> {
    let result = solver.solve_interruptible(snapshot, config, interrupt);
    tracing::trace!(
        component = "dispatch",
        operation = "worker",
        status = if result.is_ok() { "returned" } else { "failed" },
        backend = solver.name(),
        "Solve worker finished"
    );
    result
}

/// Releases the model's in-flight flag and stops the worker when the task
/// goes away without being finished.
#[derive(Debug)]
struct InFlightGuard {
    flag: Arc<AtomicBool>,
    interrupt: Interrupt,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.interrupt.trigger();
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Cloneable handle that cancels a pending [`SolveTask`].
#[derive(Debug, Clone)]
pub struct SolveCanceller {
    cancel_tx: Arc<watch::Sender<bool>>,
    interrupt: Interrupt,
}

impl SolveCanceller {
    /// Request cancellation. Has no effect once the task has been finished.
    pub fn cancel(&self) {
        self.interrupt.trigger();
        self.cancel_tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancel_tx.borrow()
    }
}

/// A pending asynchronous solve.
///
/// Exactly one terminal outcome is delivered, by [`SolveTask::finish`].
/// Dropping the task abandons the solve and releases the model.
#[derive(Debug)]
pub struct SolveTask {
    result_rx: oneshot::Receiver<Result<SolverOutput, SolverError>>,
    cancel_rx: watch::Receiver<bool>,
    canceller: SolveCanceller,
    guard: InFlightGuard,
    backend: String,
    started: Instant,
}

impl SolveTask {
    pub fn cancel(&self) {
        self.canceller.cancel();
    }

    pub fn canceller(&self) -> SolveCanceller {
        self.canceller.clone()
    }

    pub fn backend(&self) -> &str {
        &self.backend
    }

    /// Wait for the outcome and map it onto `model`.
    ///
    /// A cancellation requested before this call observes the backend's
    /// result wins: the output is `Cancelled` and the model keeps no
    /// results. `model` must be the model that started the task; otherwise
    /// the task is abandoned and `ForeignSolveTask` is returned.
    pub async fn finish(self, model: &mut MetaModel) -> Result<SolverOutput, ModelError> {
        let SolveTask {
            mut result_rx,
            mut cancel_rx,
            canceller,
            guard,
            backend,
            started,
        } = self;

        if !Arc::ptr_eq(&guard.flag, model.in_flight_flag()) {
            return Err(ModelError::ForeignSolveTask);
        }

        let received = tokio::select! {
            biased;
            _ = cancel_rx.wait_for(|cancelled| *cancelled) => None,
            received = &mut result_rx => Some(received),
        };
        drop(guard);
        drop(canceller);

        let output = match received {
            None => SolverOutput::cancelled(),
            Some(Ok(result)) => result?,
            Some(Err(_)) => {
                return Err(ModelError::Solver(SolverError::InternalError(
                    "solve worker exited without a result".to_string(),
                )));
            }
        };
        model.accept_output(&output)?;

        tracing::debug!(
            component = "dispatch",
            operation = "finish",
            status = output.status.as_str(),
            backend = backend.as_str(),
            duration_ms = started.elapsed().as_secs_f64() * 1000.0,
            "Asynchronous solve finished"
        );
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canceller_clones_share_state() {
        let (tx, _rx) = watch::channel(false);
        let canceller = SolveCanceller {
            cancel_tx: Arc::new(tx),
            interrupt: Interrupt::new(),
        };
        let other = canceller.clone();
        assert!(!other.is_cancelled());
        canceller.cancel();
        assert!(other.is_cancelled());
        assert!(other.interrupt.is_triggered());
    }

    #[test]
    fn dropping_guard_releases_flag() {
        let flag = Arc::new(AtomicBool::new(true));
        let interrupt = Interrupt::new();
        drop(InFlightGuard {
            flag: Arc::clone(&flag),
            interrupt: interrupt.clone(),
        });
        assert!(!flag.load(Ordering::SeqCst));
        assert!(interrupt.is_triggered());
    }
}
