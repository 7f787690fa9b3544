//! Translation of linear constraints and quadratic objectives
//! into the conic form solved by `clarabel`.
use clarabel::{
    algebra::*,
    solver::*,
};

use super::model::{
    LinearConstraint,
    QuadraticObjective,
    Relation,
};
use crate::common::constants::SOLVER_TOLERANCE;
use crate::error::SolverError;


/// A sparse row `(Σ_i c_i x_i, rhs)`.
type Row = (Vec<(usize, f64)>, f64);


/// The constraint part of a conic program.
/// `clarabel` solves
/// ```txt
/// min  ½ xᵀPx + qᵀx
///  x
/// s.t. Ax + s = b,   s ∈ K,
/// ```
/// so we build the constraint matrix
/// ```txt
/// # of
/// rows                x1      ...     xn
///       ┏                                  ┓   ┏     ┓
///       ┃        equality constraints      ┃ = ┃  b  ┃
///   E   ┃        (zero cone)               ┃   ┃     ┃
///      ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
///       ┃        inequality constraints    ┃ ≤ ┃  b  ┃
///   I   ┃        (nonnegative cone)        ┃   ┃     ┃
///       ┗                                  ┛   ┗     ┛
/// ```
/// where every `≥` row is negated into a `≤` row.
#[derive(Clone, Debug)]
pub(crate) struct ConicConstraints {
    n_variables: usize,
    equalities: Vec<Row>,
    inequalities: Vec<Row>,
}


impl ConicConstraints {
    pub(crate) fn new(n_variables: usize) -> Self {
        Self {
            n_variables,
            equalities: Vec::new(),
            inequalities: Vec::new(),
        }
    }


    /// Appends a [`LinearConstraint`].
    pub(crate) fn push(&mut self, constraint: &LinearConstraint) {
        let row = constraint.coefficients.iter()
            .map(|(&i, &c)| (i, c))
            .collect::<Vec<_>>();
        match constraint.relation {
            Relation::Equal => {
                self.equalities.push((row, constraint.rhs));
            },
            Relation::LessEqual => {
                self.inequalities.push((row, constraint.rhs));
            },
            Relation::GreaterEqual => {
                let row = row.into_iter()
                    .map(|(i, c)| (i, -c))
                    .collect();
                self.inequalities.push((row, -constraint.rhs));
            },
        }
    }


    /// Appends the equality `x_i = value`.
    pub(crate) fn push_fixing(&mut self, i: usize, value: f64) {
        self.equalities.push((vec![(i, 1f64)], value));
    }


    /// Appends the bounds `lower ≤ x_i ≤ upper`.
    pub(crate) fn push_bounds(&mut self, i: usize, lower: f64, upper: f64) {
        self.inequalities.push((vec![(i, -1f64)], -lower));
        self.inequalities.push((vec![(i,  1f64)],  upper));
    }


    pub(crate) fn n_rows(&self) -> usize {
        self.equalities.len() + self.inequalities.len()
    }


    /// Build the constraint matrix in the 0-indexed CSC form.
    pub(crate) fn build_constraint_matrix(&self) -> CscMatrix::<f64> {
        let n_rows = self.n_rows();
        let n_cols = self.n_variables;

        let mut columns = vec![Vec::new(); n_cols];
        let rows = self.equalities.iter()
            .chain(&self.inequalities)
            .enumerate();
        for (r, (row, _)) in rows {
            for &(i, c) in row {
                if c != 0f64 {
                    columns[i].push((r, c));
                }
            }
        }

        let mut col_ptr = Vec::with_capacity(n_cols + 1);
        let mut row_idx = Vec::new();
        let mut nonzero = Vec::new();
        for column in columns {
            col_ptr.push(row_idx.len());
            for (r, c) in column {
                row_idx.push(r);
                nonzero.push(c);
            }
        }
        col_ptr.push(row_idx.len());

        CscMatrix::new(n_rows, n_cols, col_ptr, row_idx, nonzero)
    }


    /// Build the vector of constraint sense: `[=, ..., ≤, ...].`
    pub(crate) fn build_sense(&self) -> Vec<SupportedConeT<f64>> {
        let mut sense = Vec::with_capacity(2);
        if !self.equalities.is_empty() {
            sense.push(ZeroConeT(self.equalities.len()));
        }
        if !self.inequalities.is_empty() {
            sense.push(NonnegativeConeT(self.inequalities.len()));
        }
        sense
    }


    /// Build the right-hand-side of the constraints.
    pub(crate) fn build_rhs(&self) -> Vec<f64> {
        self.equalities.iter()
            .chain(&self.inequalities)
            .map(|(_, rhs)| *rhs)
            .collect()
    }


    /// Solves `min ½ xᵀPx + qᵀx` over these constraints
    /// and returns the optimal `x`.
    pub(crate) fn minimize(&self, quad: &CscMatrix::<f64>, linear: &[f64])
        -> Result<Vec<f64>, SolverError>
    {
        let constraint_matrix = self.build_constraint_matrix();
        let sense = self.build_sense();
        let rhs = self.build_rhs();

        let mut solver = DefaultSolver::new(
            quad,
            linear,
            &constraint_matrix,
            &rhs,
            &sense[..],
            settings()?,
        );
        solver.solve();

        interpret(&solver.solution.status)?;
        Ok(solver.solution.x.clone())
    }
}


/// Build the upper triangle of `P` such that `½ xᵀPx`
/// equals the quadratic part of `objective`.
pub(crate) fn build_quadratic_part_objective(objective: &QuadraticObjective)
    -> CscMatrix::<f64>
{
    let n = objective.n_variables();

    let mut columns = vec![Vec::new(); n];
    for ((i, j), q) in objective.quadratic_terms() {
        // `q x_i²` is `½ (2q) x_i²`, while `q x_i x_j` is split
        // into the two symmetric entries `P_ij = P_ji = q`.
        let entry = if i == j { 2f64 * q } else { q };
        columns[j].push((i, entry));
    }

    let mut col_ptr = Vec::with_capacity(n + 1);
    let mut row_idx = Vec::new();
    let mut nonzero = Vec::new();
    for mut column in columns {
        column.sort_by_key(|&(i, _)| i);
        col_ptr.push(row_idx.len());
        for (i, p) in column {
            row_idx.push(i);
            nonzero.push(p);
        }
    }
    col_ptr.push(row_idx.len());

    CscMatrix::new(n, n, col_ptr, row_idx, nonzero)
}


fn settings() -> Result<DefaultSettings<f64>, SolverError> {
    DefaultSettingsBuilder::<f64>::default()
        .equilibrate_enable(false)
        .tol_gap_abs(SOLVER_TOLERANCE)
        .tol_gap_rel(SOLVER_TOLERANCE)
        .tol_feas(SOLVER_TOLERANCE)
        .verbose(false)
        .build()
        .map_err(|e| SolverError::NumericalFailure(e.to_string()))
}


fn interpret(status: &SolverStatus) -> Result<(), SolverError> {
    match status {
        SolverStatus::Solved | SolverStatus::AlmostSolved => Ok(()),
        SolverStatus::PrimalInfeasible
            | SolverStatus::AlmostPrimalInfeasible => {
            Err(SolverError::Infeasible)
        },
        SolverStatus::DualInfeasible
            | SolverStatus::AlmostDualInfeasible => {
            Err(SolverError::Unbounded)
        },
        status => {
            Err(SolverError::NumericalFailure(
                format!("clarabel stopped with status {status}")
            ))
        },
    }
}
