//! Bridge from a Meridian [`ModelSnapshot`](meridian_solver::ModelSnapshot) to
//! the `microlp` simplex and branch-and-bound engine.
//!
//! Soft constraints are lowered to elastic rows: each gets a non-negative
//! slack column per violated side, charged [`SolverConfig::soft_penalty`]
//! in the objective. Slack columns never appear in the returned values.
//!
//! [`SolverConfig::soft_penalty`]: meridian_solver::SolverConfig::soft_penalty

pub mod solver;
mod status;

pub use solver::MicroLpSolver;
