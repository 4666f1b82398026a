//! Options handed to a backend alongside the snapshot.
//!
//! Meridian never interprets the engine options itself. Each backend maps
//! what it supports and warns about the rest, using [`SolverConfig::engine_options`]
//! to find what was set. `soft_penalty` is the exception: it shapes the
//! lowered model, so every backend applies it.

/// Per-solve options; an unset field leaves the engine's own default in place.
#[derive(Debug, Clone, Default)]
pub struct SolverConfig {
    /// Wall-clock budget in seconds.
    pub time_limit: Option<f64>,
    /// Relative gap at which branch and bound may stop.
    pub mip_gap: Option<f64>,
    pub verbosity: Option<u32>,
    pub presolve: Option<bool>,
    pub threads: Option<u32>,
    /// Primal feasibility tolerance inside the engine. The tolerance used
    /// when checking a returned solution lives on the model.
    pub tolerance: Option<f64>,
    pub log_to_console: Option<bool>,
    /// Objective cost per unit of slack on a soft constraint.
    pub soft_penalty: Option<f64>,
}

/// Soft-constraint slack cost when `soft_penalty` is unset.
pub const DEFAULT_SOFT_PENALTY: f64 = 1e4;

impl SolverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_time_limit(mut self, seconds: f64) -> Self {
        self.time_limit = Some(seconds);
        self
    }

    pub fn with_mip_gap(mut self, gap: f64) -> Self {
        self.mip_gap = Some(gap);
        self
    }

    pub fn with_verbosity(mut self, level: u32) -> Self {
        self.verbosity = Some(level);
        self
    }

    pub fn with_presolve(mut self, enabled: bool) -> Self {
        self.presolve = Some(enabled);
        self
    }

    pub fn with_threads(mut self, count: u32) -> Self {
        self.threads = Some(count);
        self
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = Some(tol);
        self
    }

    pub fn with_log_to_console(mut self, enabled: bool) -> Self {
        self.log_to_console = Some(enabled);
        self
    }

    /// Cost per unit of soft-constraint violation. The backend flips the
    /// sign for maximization so slack always worsens the objective.
    pub fn with_soft_penalty(mut self, penalty: f64) -> Self {
        self.soft_penalty = Some(penalty);
        self
    }

    pub fn soft_penalty_or_default(&self) -> f64 {
        self.soft_penalty.unwrap_or(DEFAULT_SOFT_PENALTY)
    }

    /// Engine options that were set, as `(name, value)` pairs in field order.
    ///
    /// `soft_penalty` is not listed; it is applied while lowering the model.
    pub fn engine_options(&self) -> Vec<(&'static str, String)> {
        fn render<T: ToString>(
            name: &'static str,
            value: Option<T>,
        ) -> Option<(&'static str, String)> {
            value.map(|v| (name, v.to_string()))
        }
        [
            render("time_limit", self.time_limit),
            render("mip_gap", self.mip_gap),
            render("verbosity", self.verbosity),
            render("presolve", self.presolve),
            render("threads", self.threads),
            render("tolerance", self.tolerance),
            render("log_to_console", self.log_to_console),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// True when nothing, including the soft penalty, was set.
    pub fn is_empty(&self) -> bool {
        self.engine_options().is_empty() && self.soft_penalty.is_none()
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_sets_nothing() {
        let config = SolverConfig::new();
        assert!(config.is_empty());
        assert!(config.engine_options().is_empty());
        assert_eq!(config.soft_penalty_or_default(), DEFAULT_SOFT_PENALTY);
    }

    #[test]
    fn test_engine_options_lists_set_fields_in_order() {
        let config = SolverConfig::new()
            .with_threads(4)
            .with_time_limit(2.5)
            .with_presolve(false);
        assert_eq!(
            config.engine_options(),
            vec![
                ("time_limit", "2.5".to_string()),
                ("presolve", "false".to_string()),
                ("threads", "4".to_string()),
            ]
        );
    }

    #[test]
    fn test_soft_penalty_is_not_an_engine_option() {
        let config = SolverConfig::new().with_soft_penalty(250.0);
        assert!(config.engine_options().is_empty());
        assert!(!config.is_empty());
        assert_eq!(config.soft_penalty_or_default(), 250.0);
    }

    #[test]
    fn test_every_engine_builder_is_reported() {
        let config = SolverConfig::new()
            .with_time_limit(60.0)
            .with_mip_gap(0.01)
            .with_verbosity(1)
            .with_presolve(true)
            .with_threads(2)
            .with_tolerance(1e-7)
            .with_log_to_console(false);
        let names: Vec<_> = config.engine_options().into_iter().map(|(n, _)| n).collect();
        assert_eq!(
            names,
            vec![
                "time_limit",
                "mip_gap",
                "verbosity",
                "presolve",
                "threads",
                "tolerance",
                "log_to_console"
            ]
        );
        assert_eq!(config.tolerance, Some(1e-7));
    }
}
