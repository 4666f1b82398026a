//! microlp solver implementation.

use crate::status::{error_string, status_from_error};
use meridian_expr::{Bounds, ComparisonSense, Sense};
use meridian_solver::{
    ModelSnapshot, SnapshotConstraint, SnapshotTerm, SnapshotVariable, Solver, SolverConfig,
    SolverError, SolverOutput, SolverStatus,
};
use microlp::{ComparisonOp, OptimizationDirection, Problem};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, trace, warn};

/// Slack on rows whose left-hand side has no variables left.
const CONSTANT_ROW_TOLERANCE: f64 = 1e-9;

/// Pure-Rust backend: simplex for LPs, branch and bound for MIPs.
///
/// microlp has no time limit, gap or thread controls; those options are
/// logged and ignored. Cancellation is honored before and after the engine
/// runs, never mid-solve.
///
/// Integer columns are handed to the engine as `i32` ranges. An integer
/// variable whose bounds are infinite or leave that range is reported as
/// [`SolverError::NotAvailable`]; bound it explicitly or solve the
/// relaxation.
#[derive(Debug, Clone, Copy, Default)]
pub struct MicroLpSolver {
    relax: bool,
}

impl MicroLpSolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Solve the continuous relaxation instead of the MIP.
    pub fn with_relaxation(mut self, enabled: bool) -> Self {
        self.relax = enabled;
        self
    }

    pub fn is_relaxed(&self) -> bool {
        self.relax
    }
}

impl Solver for MicroLpSolver {
    fn name(&self) -> &str {
        "microlp"
    }

    fn solve(
        &self,
        snapshot: &ModelSnapshot,
        config: &SolverConfig,
    ) -> Result<SolverOutput, SolverError> {
        snapshot.validate()?;
        let working: Cow<'_, ModelSnapshot> = if self.relax {
            Cow::Owned(snapshot.linear_relax())
        } else {
            Cow::Borrowed(snapshot)
        };
        solve_snapshot(&working, config)
    }
}

/// Engine-side handles for one lowered snapshot.
struct Lowered {
    problem: Problem,
    columns: Vec<microlp::Variable>,
    slacks: Vec<microlp::Variable>,
}

enum Prepared {
    Ready(Lowered),
    /// Rejected before reaching the engine.
    Infeasible(String),
}

fn solve_snapshot(
    snapshot: &ModelSnapshot,
    config: &SolverConfig,
) -> Result<SolverOutput, SolverError> {
    let solve_started = Instant::now();
    log_unsupported_options(config);

    debug!(
        component = "solver",
        operation = "solve",
        status = "success",
        solver = "microlp",
        model = %snapshot.name,
        variables = snapshot.num_variables(),
        constraints = snapshot.num_constraints(),
        integer = snapshot.contains_integer(),
        "Starting solve process"
    );

    let lowered = match build_problem(snapshot, config)? {
        Prepared::Ready(lowered) => lowered,
        Prepared::Infeasible(reason) => {
            warn!(
                component = "solver",
                operation = "build",
                status = "warn",
                solver = "microlp",
                reason = %reason,
                "Model rejected as infeasible before solving"
            );
            return Ok(SolverOutput::without_solution(SolverStatus::Infeasible)
                .with_solve_time(solve_started.elapsed().as_secs_f64())
                .with_metadata("engine", "microlp")
                .with_metadata("reason", reason));
        }
    };

    let outcome = lowered.problem.solve();
    let solve_seconds = solve_started.elapsed().as_secs_f64();

    let solution = match outcome {
        Ok(solution) => solution,
        Err(err) => {
            let kind = error_string(&err);
            let status = status_from_error(err)?;
            warn!(
                component = "solver",
                operation = "solve",
                status = "warn",
                solver = "microlp",
                solver_status = kind,
                duration_ms = solve_seconds * 1000.0,
                "microlp finished without a solution"
            );
            return Ok(SolverOutput::without_solution(status)
                .with_solve_time(solve_seconds)
                .with_metadata("engine", "microlp"));
        }
    };

    let values: Vec<f64> = lowered
        .columns
        .iter()
        .zip(&snapshot.variables)
        .map(|(column, variable)| {
            let value = *solution.var_value(*column);
            if variable.kind.is_integer() {
                value.round()
            } else {
                value
            }
        })
        .collect();
    let soft_violation: f64 = lowered
        .slacks
        .iter()
        .map(|slack| *solution.var_value(*slack))
        .sum();
    let objective_value = snapshot.objective_value(&values);

    debug!(
        component = "solver",
        operation = "solve",
        status = "success",
        solver = "microlp",
        solver_status = "optimal",
        objective_value = ?objective_value,
        soft_violation,
        duration_ms = solve_seconds * 1000.0,
        "microlp solve completed"
    );

    Ok(
        SolverOutput::solved(SolverStatus::Optimal, values, objective_value)
            .with_solve_time(solve_seconds)
            .with_metadata("engine", "microlp")
            .with_metadata("soft_rows", lowered.slacks.len().to_string())
            .with_metadata("soft_violation", soft_violation.to_string()),
    )
}

fn log_unsupported_options(config: &SolverConfig) {
    for (option, value) in config.engine_options() {
        warn!(
            component = "solver",
            operation = "config",
            status = "warn",
            solver = "microlp",
            option,
            value = %value,
            "Option not supported by microlp; ignoring"
        );
    }
}

fn build_problem(
    snapshot: &ModelSnapshot,
    config: &SolverConfig,
) -> Result<Prepared, SolverError> {
    let (direction, objective_coeffs) = collect_objective_coefficients(snapshot);
    let mut problem = Problem::new(direction);

    let mut columns = Vec::with_capacity(snapshot.num_variables());
    for (variable, coeff) in snapshot.variables.iter().zip(&objective_coeffs) {
        let Some(column) = add_column(&mut problem, variable, *coeff)? else {
            return Ok(Prepared::Infeasible(format!(
                "variable '{}' has no integer value in [{}, {}]",
                variable.name, variable.bounds.lower, variable.bounds.upper
            )));
        };
        columns.push(column);
    }

    // Slack columns must exist before any row references them.
    let penalty = match direction {
        OptimizationDirection::Minimize => config.soft_penalty_or_default(),
        OptimizationDirection::Maximize => -config.soft_penalty_or_default(),
    };
    let mut slacks = Vec::new();
    let mut row_slacks = Vec::with_capacity(snapshot.num_constraints());
    for constraint in &snapshot.constraints {
        let mut elastic = Vec::new();
        if constraint.soft {
            if matches!(
                constraint.sense,
                ComparisonSense::GreaterEqual | ComparisonSense::Equal
            ) {
                let lower = problem.add_var(penalty, (0.0, f64::INFINITY));
                slacks.push(lower);
                elastic.push((lower, 1.0));
            }
            if matches!(
                constraint.sense,
                ComparisonSense::LessEqual | ComparisonSense::Equal
            ) {
                let upper = problem.add_var(penalty, (0.0, f64::INFINITY));
                slacks.push(upper);
                elastic.push((upper, -1.0));
            }
        }
        row_slacks.push(elastic);
    }

    for (constraint, elastic) in snapshot.constraints.iter().zip(row_slacks) {
        let mut expr: Vec<(microlp::Variable, f64)> = merge_terms(&constraint.terms)
            .into_iter()
            .map(|(column, coeff)| (columns[column], coeff))
            .collect();
        expr.extend(elastic);

        if expr.is_empty() {
            if !constraint
                .sense
                .holds(0.0, constraint.rhs, CONSTANT_ROW_TOLERANCE)
            {
                return Ok(Prepared::Infeasible(format!(
                    "constraint '{}' reduces to 0 {} {}",
                    constraint.name,
                    constraint.sense.symbol(),
                    constraint.rhs
                )));
            }
            continue;
        }

        trace!(
            component = "solver",
            operation = "add_constraint",
            status = "success",
            constraint = %constraint.name,
            sense = constraint.sense.as_str(),
            rhs = constraint.rhs,
            soft = constraint.soft,
            num_coeffs = expr.len(),
            "Added constraint to microlp"
        );
        problem.add_constraint(expr, comparison_op(constraint), constraint.rhs);
    }

    debug!(
        component = "solver",
        operation = "build",
        status = "success",
        solver = "microlp",
        columns = columns.len(),
        slack_columns = slacks.len(),
        rows = snapshot.num_constraints(),
        "Built microlp problem"
    );

    Ok(Prepared::Ready(Lowered {
        problem,
        columns,
        slacks,
    }))
}

/// Objective direction and one coefficient per snapshot column.
///
/// A snapshot without an objective is a feasibility problem.
fn collect_objective_coefficients(snapshot: &ModelSnapshot) -> (OptimizationDirection, Vec<f64>) {
    let mut coeffs = vec![0.0; snapshot.num_variables()];
    let Some(objective) = &snapshot.objective else {
        return (OptimizationDirection::Minimize, coeffs);
    };
    for (column, coeff) in merge_terms(&objective.terms) {
        coeffs[column] = coeff;
    }
    let direction = match objective.sense {
        Sense::Minimize => OptimizationDirection::Minimize,
        Sense::Maximize => OptimizationDirection::Maximize,
    };
    (direction, coeffs)
}

/// microlp rejects a row that names the same column twice.
fn merge_terms(terms: &[SnapshotTerm]) -> BTreeMap<usize, f64> {
    let mut merged = BTreeMap::new();
    for term in terms {
        *merged.entry(term.column).or_insert(0.0) += term.coefficient;
    }
    merged
}

/// `Ok(None)` when an integer column has no integer value in its bounds.
fn add_column(
    problem: &mut Problem,
    variable: &SnapshotVariable,
    objective_coeff: f64,
) -> Result<Option<microlp::Variable>, SolverError> {
    let column = if variable.kind.is_binary() && variable.bounds == Bounds::new(0.0, 1.0) {
        problem.add_binary_var(objective_coeff)
    } else if variable.kind.is_integer() {
        let Some(range) = integer_range(&variable.bounds).map_err(|bounds| {
            SolverError::NotAvailable(format!(
                "microlp needs integer bounds within [{}, {}]; variable '{}' has {bounds}",
                i32::MIN,
                i32::MAX,
                variable.name
            ))
        })?
        else {
            return Ok(None);
        };
        problem.add_integer_var(objective_coeff, range)
    } else {
        problem.add_var(objective_coeff, (variable.bounds.lower, variable.bounds.upper))
    };
    trace!(
        component = "solver",
        operation = "add_variable",
        status = "success",
        variable = %variable.name,
        kind = variable.kind.as_str(),
        lower = variable.bounds.lower,
        upper = variable.bounds.upper,
        obj_coeff = objective_coeff,
        "Added variable to microlp"
    );
    Ok(Some(column))
}

/// Integer points of `bounds` as an `i32` range.
///
/// `Ok(None)` for an empty integer domain. `Err` carries the rounded bounds
/// when they are non-empty but do not fit in `i32`.
fn integer_range(bounds: &Bounds) -> Result<Option<(i32, i32)>, String> {
    let lower = bounds.lower.ceil();
    let upper = bounds.upper.floor();
    if lower > upper {
        return Ok(None);
    }
    if lower < f64::from(i32::MIN) || upper > f64::from(i32::MAX) {
        return Err(format!("[{lower}, {upper}]"));
    }
    Ok(Some((lower as i32, upper as i32)))
}

fn comparison_op(constraint: &SnapshotConstraint) -> ComparisonOp {
    match constraint.sense {
        ComparisonSense::LessEqual => ComparisonOp::Le,
        ComparisonSense::GreaterEqual => ComparisonOp::Ge,
        ComparisonSense::Equal => ComparisonOp::Eq,
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use meridian_expr::{VariableId, VariableKind};
    use meridian_solver::SnapshotObjective;

    fn variable(index: usize, kind: VariableKind, bounds: Bounds) -> SnapshotVariable {
        SnapshotVariable {
            index,
            id: VariableId::new(index as u32),
            name: format!("v{index}"),
            kind,
            bounds,
        }
    }

    fn term(column: usize, coefficient: f64) -> SnapshotTerm {
        SnapshotTerm {
            variable: VariableId::new(column as u32),
            column,
            coefficient,
        }
    }

    fn row(terms: Vec<SnapshotTerm>, sense: ComparisonSense, rhs: f64) -> SnapshotConstraint {
        SnapshotConstraint {
            name: "row".to_string(),
            terms,
            sense,
            rhs,
            soft: false,
        }
    }

    #[test]
    fn test_integer_range_rounds_inward() {
        assert_eq!(integer_range(&Bounds::new(0.5, 3.7)), Ok(Some((1, 3))));
        assert_eq!(integer_range(&Bounds::new(-2.0, 2.0)), Ok(Some((-2, 2))));
        assert_eq!(integer_range(&Bounds::new(0.2, 0.8)), Ok(None));
        assert_eq!(
            integer_range(&Bounds::new(f64::from(i32::MIN), f64::from(i32::MAX))),
            Ok(Some((i32::MIN, i32::MAX)))
        );
    }

    #[test]
    fn test_integer_range_rejects_bounds_beyond_i32() {
        assert!(integer_range(&Bounds::unbounded()).is_err());
        assert!(integer_range(&Bounds::new(0.0, f64::INFINITY)).is_err());
        assert_eq!(
            integer_range(&Bounds::new(3e9, 4e9)),
            Err("[3000000000, 4000000000]".to_string())
        );
        // Empty stays empty even when out of range.
        assert_eq!(integer_range(&Bounds::new(3e9 + 0.2, 3e9 + 0.8)), Ok(None));
    }

    #[test]
    fn test_out_of_range_integer_bounds_are_not_available() {
        let snapshot = ModelSnapshot {
            variables: vec![variable(0, VariableKind::Integer, Bounds::new(3e9, 4e9))],
            objective: Some(SnapshotObjective {
                name: "obj".to_string(),
                sense: Sense::Minimize,
                terms: vec![term(0, 1.0)],
                constant: 0.0,
            }),
            ..ModelSnapshot::default()
        };
        let err = MicroLpSolver::new()
            .solve(&snapshot, &SolverConfig::new())
            .unwrap_err();
        assert_eq!(err.code(), "SOLVER_NOT_AVAILABLE");
        assert!(err.to_string().contains("'v0'"));
    }

    #[test]
    fn test_unbounded_integer_is_not_available() {
        let snapshot = ModelSnapshot {
            variables: vec![variable(0, VariableKind::Integer, Bounds::unbounded())],
            constraints: vec![row(vec![term(0, 1.0)], ComparisonSense::GreaterEqual, 5.0)],
            objective: Some(SnapshotObjective {
                name: "obj".to_string(),
                sense: Sense::Minimize,
                terms: vec![term(0, 1.0)],
                constant: 0.0,
            }),
            ..ModelSnapshot::default()
        };
        let err = MicroLpSolver::new()
            .solve(&snapshot, &SolverConfig::new())
            .unwrap_err();
        assert!(matches!(err, SolverError::NotAvailable(_)));

        let relaxed = MicroLpSolver::new()
            .with_relaxation(true)
            .solve(&snapshot, &SolverConfig::new())
            .unwrap();
        assert_eq!(relaxed.status, SolverStatus::Optimal);
        assert!((relaxed.objective_value.unwrap() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_merge_terms_sums_duplicate_columns() {
        let merged = merge_terms(&[term(1, 2.0), term(0, 1.0), term(1, 3.0)]);
        assert_eq!(merged.into_iter().collect::<Vec<_>>(), vec![(0, 1.0), (1, 5.0)]);
    }

    #[test]
    fn test_missing_objective_is_feasibility_problem() {
        let snapshot = ModelSnapshot {
            variables: vec![variable(0, VariableKind::Continuous, Bounds::new(1.0, 4.0))],
            ..ModelSnapshot::default()
        };
        let (direction, coeffs) = collect_objective_coefficients(&snapshot);
        assert!(matches!(direction, OptimizationDirection::Minimize));
        assert_eq!(coeffs, vec![0.0]);

        let output = MicroLpSolver::new()
            .solve(&snapshot, &SolverConfig::new())
            .unwrap();
        assert_eq!(output.status, SolverStatus::Optimal);
        let value = output.values.unwrap()[0];
        assert!((1.0..=4.0).contains(&value));
        assert_eq!(output.objective_value, None);
    }

    #[test]
    fn test_violated_constant_row_is_infeasible() {
        let snapshot = ModelSnapshot {
            variables: vec![variable(0, VariableKind::Continuous, Bounds::new(0.0, 1.0))],
            constraints: vec![row(Vec::new(), ComparisonSense::GreaterEqual, 3.0)],
            ..ModelSnapshot::default()
        };
        let output = MicroLpSolver::new()
            .solve(&snapshot, &SolverConfig::new())
            .unwrap();
        assert_eq!(output.status, SolverStatus::Infeasible);
        assert!(output.values.is_none());
        assert!(output.metadata["reason"].contains("0 >= 3"));
    }

    #[test]
    fn test_satisfied_constant_row_is_skipped() {
        let snapshot = ModelSnapshot {
            variables: vec![variable(0, VariableKind::Continuous, Bounds::new(0.0, 1.0))],
            constraints: vec![row(Vec::new(), ComparisonSense::LessEqual, 3.0)],
            objective: Some(SnapshotObjective {
                name: "obj".to_string(),
                sense: Sense::Maximize,
                terms: vec![term(0, 2.0)],
                constant: 1.0,
            }),
            ..ModelSnapshot::default()
        };
        let output = MicroLpSolver::new()
            .solve(&snapshot, &SolverConfig::new())
            .unwrap();
        assert_eq!(output.status, SolverStatus::Optimal);
        assert!((output.objective_value.unwrap() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_integer_domain_is_infeasible() {
        let snapshot = ModelSnapshot {
            variables: vec![variable(0, VariableKind::Integer, Bounds::new(0.2, 0.8))],
            ..ModelSnapshot::default()
        };
        let output = MicroLpSolver::new()
            .solve(&snapshot, &SolverConfig::new())
            .unwrap();
        assert_eq!(output.status, SolverStatus::Infeasible);
    }

    #[test]
    fn test_empty_snapshot_is_rejected() {
        let err = MicroLpSolver::new()
            .solve(&ModelSnapshot::default(), &SolverConfig::new())
            .unwrap_err();
        assert_eq!(err, SolverError::EmptyModel);
    }

    #[test]
    fn test_relaxation_flag() {
        assert!(!MicroLpSolver::new().is_relaxed());
        assert!(MicroLpSolver::new().with_relaxation(true).is_relaxed());
    }
}
