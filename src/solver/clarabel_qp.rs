//! A [`QuadraticSolver`] backed by the `clarabel` interior-point solver.
use clarabel::algebra::CscMatrix;

use super::conic::{
    ConicConstraints,
    build_quadratic_part_objective,
};
use super::model::{
    LinearConstraint,
    QuadraticObjective,
    Solution,
};
use super::QuadraticSolver;
use crate::error::SolverError;


/// A quadratic programming model solved by `clarabel`.
/// 
/// `clarabel` has no incremental interface,
/// so the accumulated constraints are handed over as a whole
/// on every call of [`QuadraticSolver::solve`].
/// The quadratic part of the objective is converted
/// into the CSC form once, when the objective is set.
pub struct ClarabelQpSolver {
    pub(self) n_variables: usize,
    pub(self) objective: QuadraticObjective,
    pub(self) quad: CscMatrix::<f64>,
    pub(self) constraints: ConicConstraints,
}


impl QuadraticSolver for ClarabelQpSolver {
    fn new(n_variables: usize) -> Result<Self, SolverError> {
        Ok(Self {
            n_variables,
            objective: QuadraticObjective::new(n_variables),
            quad: CscMatrix::zeros((n_variables, n_variables)),
            constraints: ConicConstraints::new(n_variables),
        })
    }


    fn n_variables(&self) -> usize {
        self.n_variables
    }


    fn set_objective(&mut self, objective: QuadraticObjective)
        -> Result<(), SolverError>
    {
        assert_eq!(objective.n_variables(), self.n_variables);
        self.quad = build_quadratic_part_objective(&objective);
        self.objective = objective;
        Ok(())
    }


    fn add_constraint(&mut self, constraint: LinearConstraint)
        -> Result<(), SolverError>
    {
        constraint.check_range(self.n_variables)?;
        self.constraints.push(&constraint);
        Ok(())
    }


    fn solve(&mut self) -> Result<Solution, SolverError> {
        let x = self.constraints
            .minimize(&self.quad, self.objective.linear())?;
        let value = self.objective.evaluate(&x[..]);
        Ok(Solution { value, x })
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::Relation;

    #[test]
    fn test_constraint_out_of_range() {
        let mut solver = ClarabelQpSolver::new(2).unwrap();
        let constraint = LinearConstraint::new(Relation::LessEqual, 1f64)
            .coefficient(0, 1f64)
            .coefficient(2, 1f64);

        let result = solver.add_constraint(constraint);
        assert!(matches!(
            result,
            Err(SolverError::VariableOutOfRange { index: 2, n_variables: 2 })
        ));
    }

    #[test]
    fn test_boxed_quadratic() {
        // min x_0² + x_1² - 2x_0  s.t. x_0 + x_1 ≥ 2  ⇒  x = (1.5, 0.5)
        let mut solver = ClarabelQpSolver::new(2).unwrap();
        let mut objective = QuadraticObjective::new(2);
        objective.set_quadratic_coefficient(0, 0, 1f64);
        objective.set_quadratic_coefficient(1, 1, 1f64);
        objective.set_coefficient(0, -2f64);
        solver.set_objective(objective).unwrap();
        solver.add_constraint(
            LinearConstraint::new(Relation::GreaterEqual, 2f64)
                .coefficient(0, 1f64)
                .coefficient(1, 1f64)
        ).unwrap();

        let solution = solver.solve().unwrap();
        assert!((solution[0] - 1.5).abs() < 1e-6);
        assert!((solution[1] - 0.5).abs() < 1e-6);
        assert!((solution.value + 0.5).abs() < 1e-6);
    }
}
