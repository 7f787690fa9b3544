//! The contracts with the external optimization solvers
//! and their backends.
//!
//! - [`QuadraticSolver`] solves the master problem of the bundle method.
//!   The default backend is [`ClarabelQpSolver`].
//! - [`LinearSolver`] solves the binary program of
//!   loss-augmented inference.
//!   The default backend is [`BranchAndBound`].
//!
//! With the `extended` feature,
//! [`GurobiQpSolver`] and [`GurobiIlpSolver`] implement both contracts
//! on top of Gurobi.
pub mod model;
pub mod clarabel_qp;
pub mod branch_and_bound;

pub(crate) mod conic;

#[cfg(feature = "extended")]
pub mod gurobi;

pub use model::{
    LinearConstraint,
    LinearConstraints,
    LinearObjective,
    QuadraticObjective,
    Relation,
    Sense,
    Solution,
};
pub use clarabel_qp::ClarabelQpSolver;
pub use branch_and_bound::BranchAndBound;

#[cfg(feature = "extended")]
pub use gurobi::{
    GurobiIlpSolver,
    GurobiQpSolver,
};

use crate::error::SolverError;


/// A solver for convex quadratic programs over continuous variables.
/// The objective is fixed once;
/// linear constraints are added one at a time and never removed.
pub trait QuadraticSolver: Sized {
    /// Constructs a solver over `n_variables` continuous variables.
    fn new(n_variables: usize) -> Result<Self, SolverError>;

    /// Returns the number of variables.
    fn n_variables(&self) -> usize;

    /// Sets the objective function to be minimized.
    fn set_objective(&mut self, objective: QuadraticObjective)
        -> Result<(), SolverError>;

    /// Appends a linear constraint.
    fn add_constraint(&mut self, constraint: LinearConstraint)
        -> Result<(), SolverError>;

    /// Solves the program over all constraints added so far.
    fn solve(&mut self) -> Result<Solution, SolverError>;
}


/// A solver for linear programs over binary variables.
/// The feasible region is set once;
/// the objective is re-specified before each solve.
pub trait LinearSolver: Sized {
    /// Constructs a solver over `n_variables` binary variables.
    fn new(n_variables: usize) -> Result<Self, SolverError>;

    /// Returns the number of variables.
    fn n_variables(&self) -> usize;

    /// Sets the feasible region.
    fn set_constraints(&mut self, constraints: LinearConstraints)
        -> Result<(), SolverError>;

    /// Sets the objective function.
    fn set_objective(&mut self, objective: LinearObjective)
        -> Result<(), SolverError>;

    /// Returns an optimal assignment and its objective value.
    fn solve(&mut self) -> Result<Solution, SolverError>;
}
