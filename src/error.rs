//! Error types of this crate.

use thiserror::Error;


/// Failures reported by a [`QuadraticSolver`](crate::solver::QuadraticSolver)
/// or a [`LinearSolver`](crate::solver::LinearSolver).
#[derive(Error, Debug)]
pub enum SolverError {
    /// The feasible region is empty.
    #[error("the problem is infeasible")]
    Infeasible,

    /// The objective is unbounded over the feasible region.
    #[error("the problem is unbounded")]
    Unbounded,

    /// A constraint refers to a variable the solver does not have.
    #[error("variable x[{index}] is out of range ({n_variables} variables)")]
    VariableOutOfRange {
        /// The offending variable index.
        index: usize,
        /// The number of variables of the solver.
        n_variables: usize,
    },

    /// The solver stopped without a trustworthy solution.
    #[error("numerical failure: {0}")]
    NumericalFailure(String),

    /// Error raised by the Gurobi backend.
    #[cfg(feature = "extended")]
    #[error("Gurobi error: {0}")]
    Gurobi(#[from] grb::Error),
}


/// Error type of this crate.
#[derive(Error, Debug)]
pub enum Error {
    /// Loss-augmented inference admits no feasible output.
    #[error("loss-augmented inference has no feasible solution")]
    OracleInfeasible,

    /// The master problem of the bundle method admits no solution.
    #[error("the master problem of the bundle method is infeasible")]
    MasterInfeasible,

    /// Two vectors (or a vector and a matrix) do not fit together.
    #[error("dimension mismatch in {context}: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Where the mismatch was detected.
        context: &'static str,
        /// The expected length.
        expected: usize,
        /// The actual length.
        got: usize,
    },

    /// A value that must be finite is not.
    #[error("numerical failure: {0}")]
    NumericalFailure(String),

    /// Malformed input data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Any other failure of an external solver.
    #[error("solver error: {0}")]
    Solver(#[from] SolverError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}


/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
