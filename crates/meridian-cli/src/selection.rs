//! Capital/liability/profit company selection.

use meridian_core::expr::{VariableArray, VariableKind, declare_shape, sum_by};
use meridian_core::solver::SolverOutput;
use meridian_core::{MetaModel, ModelError};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub(crate) struct Company {
    pub(crate) name: String,
    pub(crate) capital: f64,
    pub(crate) liability: f64,
    pub(crate) profit: f64,
}

/// Pick companies maximizing profit with enough capital and bounded liability.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub(crate) struct SelectionProblem {
    pub(crate) min_capital: f64,
    pub(crate) max_liability: f64,
    pub(crate) companies: Vec<Company>,
}

const DEMO_COMPANIES: [(f64, f64, f64); 5] = [
    (3.48, 1.28, 5400.0),
    (5.62, 2.53, 2300.0),
    (7.33, 1.02, 4600.0),
    (6.27, 3.55, 3300.0),
    (2.14, 0.53, 900.0),
];

impl SelectionProblem {
    pub(crate) fn demo(min_capital: f64, max_liability: f64) -> Self {
        let companies = DEMO_COMPANIES
            .iter()
            .enumerate()
            .map(|(index, &(capital, liability, profit))| Company {
                name: format!("company_{index}"),
                capital,
                liability,
                profit,
            })
            .collect();
        Self {
            min_capital,
            max_liability,
            companies,
        }
    }

    pub(crate) fn from_json(text: &str) -> Result<Self, Box<dyn Error>> {
        Ok(serde_json::from_str(text)?)
    }

    pub(crate) fn load(path: &Path) -> Result<Self, Box<dyn Error>> {
        let text = fs::read_to_string(path)
            .map_err(|err| format!("Failed to read {}: {err}", path.display()))?;
        Self::from_json(&text)
    }

    /// Build the model; `x[k]` selects company `k`.
    pub(crate) fn build(&self, name: &str) -> Result<(MetaModel, VariableArray), ModelError> {
        let mut model = MetaModel::new(name);
        let x = declare_shape(&[self.companies.len()], VariableKind::Binary, "x_{}")?;
        model.add_shape(&x)?;

        let capital = model.define_symbol(
            sum_by(x.iter().zip(&self.companies), |(v, c)| c.capital * v),
            "capital",
        )?;
        let liability = model.define_symbol(
            sum_by(x.iter().zip(&self.companies), |(v, c)| c.liability * v),
            "liability",
        )?;
        let profit = model.define_symbol(
            sum_by(x.iter().zip(&self.companies), |(v, c)| c.profit * v),
            "profit",
        )?;

        model.maximize(&profit, "profit")?;
        model.add_constraint(capital.geq(self.min_capital), "min_capital")?;
        model.add_constraint(liability.leq(self.max_liability), "max_liability")?;
        Ok((model, x))
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct SelectionReport {
    pub(crate) model: String,
    pub(crate) backend: String,
    pub(crate) status: String,
    pub(crate) objective_value: Option<f64>,
    pub(crate) capital: Option<f64>,
    pub(crate) liability: Option<f64>,
    pub(crate) selected: Vec<String>,
    pub(crate) solve_time_seconds: f64,
}

impl SelectionReport {
    pub(crate) fn new(
        problem: &SelectionProblem,
        model: &MetaModel,
        x: &VariableArray,
        backend: &str,
        output: &SolverOutput,
    ) -> Self {
        let symbol_value =
            |name: &str| model.symbol(name).and_then(|s| model.value_of_symbol(s));
        let selected = model
            .selected(x.as_slice())
            .into_iter()
            .filter_map(|v| v.position())
            .filter_map(|position| problem.companies.get(position.flat))
            .map(|company| company.name.clone())
            .collect();
        Self {
            model: model.name().to_string(),
            backend: backend.to_string(),
            status: output.status.to_string(),
            objective_value: model.objective_value(),
            capital: symbol_value("capital"),
            liability: symbol_value("liability"),
            selected,
            solve_time_seconds: output.solve_time_seconds,
        }
    }
}

fn format_option(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}

pub(crate) fn print_report_table(report: &SelectionReport) {
    println!("{:<12} {}", "model", report.model);
    println!("{:<12} {}", "backend", report.backend);
    println!("{:<12} {}", "status", report.status);
    println!("{:<12} {}", "profit", format_option(report.objective_value));
    println!("{:<12} {}", "capital", format_option(report.capital));
    println!("{:<12} {}", "liability", format_option(report.liability));
    println!("{:<12} {:.3}", "solve_ms", report.solve_time_seconds * 1000.0);
    if report.selected.is_empty() {
        println!("{:<12} -", "selected");
    } else {
        println!("{:<12} {}", "selected", report.selected.join(", "));
    }
}
