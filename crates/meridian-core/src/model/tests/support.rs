use crate::model::MetaModel;
use meridian_expr::{Polynomial, Variable, VariableArray, VariableKind, declare_shape, sum_by};
use meridian_solver::{
    ModelSnapshot, Solver, SolverConfig, SolverError, SolverOutput, SolverStatus,
};
use std::sync::Mutex;
use std::sync::mpsc;

pub(super) const CAPITALS: [f64; 5] = [3.48, 5.62, 7.33, 6.27, 2.14];
pub(super) const LIABILITIES: [f64; 5] = [1.28, 2.53, 1.02, 3.55, 0.53];
pub(super) const PROFITS: [f64; 5] = [5400.0, 2300.0, 4600.0, 3300.0, 900.0];

/// Backend returning a fixed status and value vector.
pub(super) struct FixedSolver {
    pub(super) status: SolverStatus,
    pub(super) values: Option<Vec<f64>>,
}

impl FixedSolver {
    pub(super) fn optimal(values: Vec<f64>) -> Self {
        Self {
            status: SolverStatus::Optimal,
            values: Some(values),
        }
    }

    pub(super) fn status(status: SolverStatus) -> Self {
        Self {
            status,
            values: None,
        }
    }
}

impl Solver for FixedSolver {
    fn name(&self) -> &str {
        "fixed"
    }

    fn solve(
        &self,
        snapshot: &ModelSnapshot,
        _config: &SolverConfig,
    ) -> Result<SolverOutput, SolverError> {
        Ok(match &self.values {
            Some(values) => SolverOutput::solved(
                self.status,
                values.clone(),
                snapshot.objective_value(values),
            ),
            None => SolverOutput::without_solution(self.status),
        })
    }
}

/// Backend that always fails hard.
pub(super) struct BrokenSolver;

impl Solver for BrokenSolver {
    fn name(&self) -> &str {
        "broken"
    }

    fn solve(
        &self,
        _snapshot: &ModelSnapshot,
        _config: &SolverConfig,
    ) -> Result<SolverOutput, SolverError> {
        Err(SolverError::InternalError("engine crashed".to_string()))
    }
}

/// Backend that records the snapshot it was given.
#[derive(Default)]
pub(super) struct RecordingSolver {
    pub(super) seen: Mutex<Vec<ModelSnapshot>>,
}

impl Solver for RecordingSolver {
    fn name(&self) -> &str {
        "recording"
    }

    fn solve(
        &self,
        snapshot: &ModelSnapshot,
        _config: &SolverConfig,
    ) -> Result<SolverOutput, SolverError> {
        self.seen.lock().unwrap().push(snapshot.clone());
        Ok(SolverOutput::without_solution(SolverStatus::Infeasible))
    }
}

/// Backend that blocks until released, then answers with `values`.
pub(super) struct GateSolver {
    release: Mutex<mpsc::Receiver<()>>,
    values: Vec<f64>,
}

impl GateSolver {
    pub(super) fn new(values: Vec<f64>) -> (Self, mpsc::Sender<()>) {
        let (tx, rx) = mpsc::channel();
        (
            Self {
                release: Mutex::new(rx),
                values,
            },
            tx,
        )
    }
}

impl Solver for GateSolver {
    fn name(&self) -> &str {
        "gate"
    }

    fn solve(
        &self,
        _snapshot: &ModelSnapshot,
        _config: &SolverConfig,
    ) -> Result<SolverOutput, SolverError> {
        let _ = self.release.lock().unwrap().recv();
        Ok(SolverOutput::solved(
            SolverStatus::Optimal,
            self.values.clone(),
            None,
        ))
    }
}

/// One binary variable `x`, objective: maximize x.
pub(super) fn one_binary_model() -> (MetaModel, Variable) {
    let mut model = MetaModel::new("single");
    let x = Variable::binary("x");
    model.add_variable(&x).unwrap();
    model.maximize(Polynomial::from(&x), "obj").unwrap();
    (model, x)
}

/// Capital/liability/profit selection over five companies.
pub(super) fn company_model() -> (MetaModel, VariableArray) {
    let mut model = MetaModel::new("companies");
    let x = declare_shape(&[5], VariableKind::Binary, "x{}").unwrap();
    model.add_shape(&x).unwrap();

    let capital = model
        .define_symbol(sum_by(x.iter().zip(CAPITALS), |(v, c)| c * v), "capital")
        .unwrap();
    let liability = model
        .define_symbol(sum_by(x.iter().zip(LIABILITIES), |(v, l)| l * v), "liability")
        .unwrap();
    let profit = model
        .define_symbol(sum_by(x.iter().zip(PROFITS), |(v, p)| p * v), "profit")
        .unwrap();

    model.maximize(&profit, "profit").unwrap();
    model.add_constraint(capital.geq(10.0), "capital").unwrap();
    model.add_constraint(liability.leq(5.0), "liability").unwrap();
    (model, x)
}
