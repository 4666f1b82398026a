//! Backend-independent solver interface.
//!
//! A backend receives an immutable [`ModelSnapshot`] plus [`SolverConfig`]
//! and answers with a [`SolverOutput`]. Expected outcomes (infeasible,
//! unbounded, timeout, cancelled) are [`SolverStatus`] values; only
//! unexpected failures surface as [`SolverError`].

pub mod config;
pub mod error;
pub mod interrupt;
pub mod output;
pub mod snapshot;
pub mod status;
pub mod traits;

pub use config::SolverConfig;
pub use error::SolverError;
pub use interrupt::Interrupt;
pub use output::SolverOutput;
pub use snapshot::{
    ModelSnapshot, SnapshotConstraint, SnapshotObjective, SnapshotSymbol, SnapshotTerm,
    SnapshotVariable,
};
pub use status::SolverStatus;
pub use traits::Solver;
