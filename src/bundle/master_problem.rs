//! The master problem of the bundle method.
use super::hyperplane::Hyperplane;
use crate::error::{
    Error,
    Result,
    SolverError,
};
use crate::solver::{
    QuadraticObjective,
    QuadraticSolver,
};


/// The regularized quadratic program solved in every iteration:
/// ```txt
/// min  λ/2 |w|² + ξ
/// w,ξ
/// s.t. ⟨a_i, w⟩ + b_i ≤ ξ,   ∀i = 1, 2, ..., t
/// ```
/// The variables are `(w_1, ..., w_d, ξ)`.
/// The objective never changes;
/// each iteration appends one hyperplane to the bundle.
pub(super) struct MasterProblem<Q> {
    pub(self) solver: Q,
    pub(self) dims: usize,
    pub(self) hyperplanes: Vec<Hyperplane>,
}


impl<Q> MasterProblem<Q>
    where Q: QuadraticSolver,
{
    /// Sets up the quadratic program with an empty bundle.
    pub(super) fn init(dims: usize, lambda: f64) -> Result<Self> {
        let mut solver = Q::new(dims + 1)?;

        // w* = argmin λ/2 |w|² + ξ, s.t. <w,a_i> + b_i ≤ ξ ∀i
        let mut objective = QuadraticObjective::new(dims + 1);
        (0..dims).for_each(|i| {
            objective.set_quadratic_coefficient(i, i, 0.5 * lambda);
        });
        objective.set_coefficient(dims, 1f64);
        solver.set_objective(objective)?;

        Ok(Self {
            solver,
            dims,
            hyperplanes: Vec::new(),
        })
    }


    /// Adds a hyperplane to the bundle.
    pub(super) fn add_hyperplane(&mut self, hyperplane: Hyperplane)
        -> Result<()>
    {
        debug_assert_eq!(hyperplane.slope().len(), self.dims);
        self.solver.add_constraint(hyperplane.to_constraint())?;
        self.hyperplanes.push(hyperplane);
        Ok(())
    }


    /// Solves the master problem and returns
    /// the minimizer `w_t` and the minimal value `λ/2 |w_t|² + ℒ_t(w_t)`.
    pub(super) fn find_min_lower_bound(&mut self) -> Result<(Vec<f64>, f64)> {
        let solution = self.solver.solve()
            .map_err(|e| match e {
                SolverError::Infeasible => Error::MasterInfeasible,
                e => Error::Solver(e),
            })?;

        let mut x = solution.x;
        x.truncate(self.dims);
        Ok((x, solution.value))
    }


    /// Returns the number of hyperplanes in the bundle.
    #[inline(always)]
    pub(super) fn len(&self) -> usize {
        self.hyperplanes.len()
    }


    /// Consumes the master problem and returns its bundle.
    pub(super) fn into_hyperplanes(self) -> Vec<Hyperplane> {
        self.hyperplanes
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::ClarabelQpSolver;

    #[test]
    fn test_single_hyperplane() {
        // min 1/2 w² + ξ  s.t. ξ ≥ -2w + 1  ⇒  w = 2, value = 2 - 4 + 1.
        let mut master = MasterProblem::<ClarabelQpSolver>::init(1, 1f64)
            .unwrap();
        master.add_hyperplane(Hyperplane::new(vec![-2f64], 1f64)).unwrap();
        let (w, value) = master.find_min_lower_bound().unwrap();

        assert_eq!(master.len(), 1);
        assert_eq!(w.len(), 1);
        assert!((w[0] - 2f64).abs() < 1e-6);
        assert!((value + 1f64).abs() < 1e-6);
    }

    #[test]
    fn test_unbounded_without_regularizer() {
        let mut master = MasterProblem::<ClarabelQpSolver>::init(1, 0f64)
            .unwrap();
        master.add_hyperplane(Hyperplane::new(vec![-2f64], 1f64)).unwrap();
        assert!(master.find_min_lower_bound().is_err());
    }
}
