//! A [`LinearSolver`] for binary programs
//! based on branch-and-bound over LP relaxations.
use clarabel::algebra::CscMatrix;
use fixedbitset::FixedBitSet;

use super::conic::ConicConstraints;
use super::model::{
    LinearConstraints,
    LinearObjective,
    Sense,
    Solution,
};
use super::LinearSolver;
use crate::common::constants::{
    DEFAULT_MAX_NODES,
    FEASIBILITY_TOLERANCE,
    INTEGRALITY_TOLERANCE,
    PRUNING_TOLERANCE,
};
use crate::common::utils;
use crate::error::SolverError;


/// A node of the search tree.
/// Each variable is either fixed to `0`, fixed to `1`, or free.
#[derive(Clone, Debug)]
struct Node {
    fixed_zero: FixedBitSet,
    fixed_one: FixedBitSet,
}


impl Node {
    fn root(n_variables: usize) -> Self {
        Self {
            fixed_zero: FixedBitSet::with_capacity(n_variables),
            fixed_one: FixedBitSet::with_capacity(n_variables),
        }
    }


    #[inline(always)]
    fn is_free(&self, i: usize) -> bool {
        !self.fixed_zero.contains(i) && !self.fixed_one.contains(i)
    }


    /// Returns the two children `(x_i = 0, x_i = 1)`.
    fn split(self, i: usize) -> (Self, Self) {
        let mut zero = self.clone();
        zero.fixed_zero.insert(i);

        let mut one = self;
        one.fixed_one.insert(i);

        (zero, one)
    }
}


/// Solves
/// ```txt
/// max (or min) constant + Σ_i c_i y_i
///      y
/// s.t. linear constraints on y,
///      y_1, y_2, ..., y_n ∈ {0, 1}
/// ```
/// by depth-first branch-and-bound.
/// Each node relaxes the free variables to `0 ≤ y_i ≤ 1`
/// and solves the resulting LP with `clarabel`.
/// The search branches on the most fractional free variable
/// and visits the child the relaxed value rounds to first.
///
/// Incumbents are evaluated on the rounded assignment,
/// so the reported value is exact for the returned point.
///
/// # Example
/// ```
/// use structsvm::solver::*;
///
/// // choose exactly one of three items with the largest score.
/// let choose_one = (0..3).fold(
///     LinearConstraint::new(Relation::Equal, 1f64),
///     |constraint, i| constraint.coefficient(i, 1f64),
/// );
/// let mut solver = BranchAndBound::new(3).unwrap();
/// solver.set_constraints([choose_one].into_iter().collect()).unwrap();
///
/// let mut objective = LinearObjective::new(3, Sense::Maximize);
/// objective.set_coefficient(0, 0.5);
/// objective.set_coefficient(1, 2f64);
/// objective.set_coefficient(2, 1f64);
/// solver.set_objective(objective).unwrap();
///
/// let solution = solver.solve().unwrap();
/// assert_eq!(solution.x, vec![0f64, 1f64, 0f64]);
/// assert_eq!(solution.value, 2f64);
/// ```
pub struct BranchAndBound {
    pub(self) n_variables: usize,
    pub(self) constraints: LinearConstraints,
    pub(self) objective: LinearObjective,

    // Maximum number of nodes per call of `solve`
    pub(self) max_nodes: usize,

    // Tolerance for integer feasibility
    pub(self) int_tol: f64,

    // Relative tolerance for pruning
    pub(self) gap_tol: f64,

    // Number of nodes explored by the last call of `solve`
    pub(self) explored: usize,
}


impl BranchAndBound {
    /// Set the maximum number of nodes explored per call of `solve`.
    /// Default value is `10_000`.
    ///
    /// Time complexity: `O(1)`.
    #[inline(always)]
    pub fn max_nodes(mut self, max_nodes: usize) -> Self {
        assert!(max_nodes > 0, "at least one node must be explored.");
        self.max_nodes = max_nodes;
        self
    }


    /// Set the tolerance for treating a relaxed value as integral.
    /// Default value is `1e-6`.
    ///
    /// Time complexity: `O(1)`.
    #[inline(always)]
    pub fn integrality_tolerance(mut self, tolerance: f64) -> Self {
        assert!((0f64..0.5).contains(&tolerance));
        self.int_tol = tolerance;
        self
    }


    /// Returns the number of nodes explored by the last call of `solve`.
    #[inline(always)]
    pub fn explored_nodes(&self) -> usize {
        self.explored
    }


    /// Solves the LP relaxation of `node`
    /// and returns the relaxed point.
    fn relax(&self, node: &Node, quad: &CscMatrix::<f64>, linear: &[f64])
        -> Result<Vec<f64>, SolverError>
    {
        let mut constraints = ConicConstraints::new(self.n_variables);
        self.constraints.iter()
            .for_each(|c| { constraints.push(c); });

        for i in 0..self.n_variables {
            if node.fixed_one.contains(i) {
                constraints.push_fixing(i, 1f64);
            } else if node.fixed_zero.contains(i) {
                constraints.push_fixing(i, 0f64);
            } else {
                constraints.push_bounds(i, 0f64, 1f64);
            }
        }

        constraints.minimize(quad, linear)
    }


    /// Returns the most fractional free variable, if any.
    fn branching_variable(&self, node: &Node, y: &[f64]) -> Option<usize> {
        y.iter()
            .enumerate()
            .filter(|&(i, _)| node.is_free(i))
            .map(|(i, &yi)| (i, (yi - yi.round()).abs()))
            .filter(|&(_, frac)| frac > self.int_tol)
            .max_by(|(_, f1), (_, f2)| f1.total_cmp(f2))
            .map(|(i, _)| i)
    }
}


impl LinearSolver for BranchAndBound {
    fn new(n_variables: usize) -> Result<Self, SolverError> {
        Ok(Self {
            n_variables,
            constraints: LinearConstraints::new(),
            objective: LinearObjective::new(n_variables, Sense::Maximize),
            max_nodes: DEFAULT_MAX_NODES,
            int_tol: INTEGRALITY_TOLERANCE,
            gap_tol: PRUNING_TOLERANCE,
            explored: 0,
        })
    }


    fn n_variables(&self) -> usize {
        self.n_variables
    }


    fn set_constraints(&mut self, constraints: LinearConstraints)
        -> Result<(), SolverError>
    {
        for constraint in &constraints {
            constraint.check_range(self.n_variables)?;
        }
        self.constraints = constraints;
        Ok(())
    }


    fn set_objective(&mut self, objective: LinearObjective)
        -> Result<(), SolverError>
    {
        assert_eq!(objective.n_variables(), self.n_variables);
        self.objective = objective;
        Ok(())
    }


    fn solve(&mut self) -> Result<Solution, SolverError> {
        let n = self.n_variables;

        // Internally we always maximize `score · y`.
        let sign = match self.objective.sense() {
            Sense::Maximize => 1f64,
            Sense::Minimize => -1f64,
        };
        let score = self.objective.coefficients()
            .iter()
            .map(|c| sign * c)
            .collect::<Vec<_>>();

        // `clarabel` minimizes, so we negate the score.
        let linear = score.iter()
            .map(|s| -s)
            .collect::<Vec<_>>();
        let quad = CscMatrix::<f64>::zeros((n, n));

        let mut incumbent: Option<(f64, Vec<f64>)> = None;
        let mut stack = vec![Node::root(n)];
        let mut cut_off = false;
        self.explored = 0;

        while let Some(node) = stack.pop() {
            if self.explored >= self.max_nodes {
                cut_off = true;
                break;
            }
            self.explored += 1;

            let y = match self.relax(&node, &quad, &linear[..]) {
                Ok(y) => y,
                Err(SolverError::Infeasible) => continue,
                Err(e) => return Err(e),
            };

            // Prune the node if its relaxation cannot beat the incumbent.
            let bound = utils::inner_product(&score[..], &y[..]);
            if let Some((best, _)) = &incumbent {
                if bound <= best + self.gap_tol * best.abs().max(1f64) {
                    continue;
                }
            }

            match self.branching_variable(&node, &y[..]) {
                Some(i) => {
                    let (zero, one) = node.split(i);
                    if y[i] >= 0.5 {
                        stack.push(zero);
                        stack.push(one);
                    } else {
                        stack.push(one);
                        stack.push(zero);
                    }
                },
                None => {
                    let rounded = y.iter()
                        .map(|&yi| if yi >= 0.5 { 1f64 } else { 0f64 })
                        .collect::<Vec<_>>();
                    let feasible = self.constraints
                        .are_satisfied(&rounded[..], FEASIBILITY_TOLERANCE);
                    if !feasible { continue; }

                    let value = utils::inner_product(&score[..], &rounded[..]);
                    let improves = incumbent.as_ref()
                        .map_or(true, |(best, _)| value > *best);
                    if improves {
                        incumbent = Some((value, rounded));
                    }
                },
            }
        }

        match incumbent {
            Some((_, x)) => {
                if cut_off {
                    log::warn!(
                        "branch-and-bound stopped after {} nodes; \
                        returning the best solution found so far",
                        self.explored,
                    );
                }
                let value = self.objective.evaluate(&x[..]);
                Ok(Solution { value, x })
            },
            None if cut_off => {
                Err(SolverError::NumericalFailure(format!(
                    "no integral solution within {} nodes", self.max_nodes
                )))
            },
            None => Err(SolverError::Infeasible),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::{LinearConstraint, Relation};

    fn choose_one(n: usize) -> LinearConstraints {
        let constraint = (0..n).fold(
            LinearConstraint::new(Relation::Equal, 1f64),
            |c, i| c.coefficient(i, 1f64),
        );
        [constraint].into_iter().collect()
    }

    #[test]
    fn test_choose_one_with_ties() {
        let n = 5;
        let mut solver = BranchAndBound::new(n).unwrap();
        solver.set_constraints(choose_one(n)).unwrap();

        // every item but the first one has the same score,
        // so the LP relaxation is fractional at the root.
        let mut objective = LinearObjective::new(n, Sense::Maximize);
        objective.set_constant(1f64);
        objective.set_coefficient(0, -1f64);
        (1..n).for_each(|i| { objective.set_coefficient(i, 1f64); });
        solver.set_objective(objective).unwrap();

        let solution = solver.solve().unwrap();
        assert!((solution.value - 2f64).abs() < 1e-12);
        assert_eq!(solution.x[0], 0f64);
        assert_eq!(solution.x.iter().sum::<f64>(), 1f64);
    }

    #[test]
    fn test_knapsack_needs_branching() {
        // max 5 y0 + 4 y1 + 3 y2  s.t. 2 y0 + 3 y1 + y2 ≤ 4
        // The relaxation picks y0 = y2 = 1, y1 = 1/3.
        let capacity = LinearConstraint::new(Relation::LessEqual, 4f64)
            .coefficient(0, 2f64)
            .coefficient(1, 3f64)
            .coefficient(2, 1f64);
        let mut solver = BranchAndBound::new(3).unwrap();
        solver.set_constraints([capacity].into_iter().collect()).unwrap();

        let mut objective = LinearObjective::new(3, Sense::Maximize);
        objective.set_coefficient(0, 5f64);
        objective.set_coefficient(1, 4f64);
        objective.set_coefficient(2, 3f64);
        solver.set_objective(objective).unwrap();

        let solution = solver.solve().unwrap();
        assert_eq!(solution.x, vec![1f64, 0f64, 1f64]);
        assert_eq!(solution.value, 8f64);
        assert!(solver.explored_nodes() > 1);
    }

    #[test]
    fn test_minimize() {
        let mut solver = BranchAndBound::new(3).unwrap();
        solver.set_constraints(choose_one(3)).unwrap();

        let mut objective = LinearObjective::new(3, Sense::Minimize);
        objective.set_coefficient(0, 3f64);
        objective.set_coefficient(1, -2f64);
        objective.set_coefficient(2, 1f64);
        solver.set_objective(objective).unwrap();

        let solution = solver.solve().unwrap();
        assert_eq!(solution.x, vec![0f64, 1f64, 0f64]);
        assert_eq!(solution.value, -2f64);
    }

    #[test]
    fn test_infeasible() {
        // y0 + y1 ≥ 3 has no binary solution.
        let too_many = LinearConstraint::new(Relation::GreaterEqual, 3f64)
            .coefficient(0, 1f64)
            .coefficient(1, 1f64);
        let mut solver = BranchAndBound::new(2).unwrap();
        solver.set_constraints([too_many].into_iter().collect()).unwrap();
        solver.set_objective(LinearObjective::new(2, Sense::Maximize)).unwrap();

        assert!(matches!(solver.solve(), Err(SolverError::Infeasible)));
    }

    #[test]
    fn test_unconstrained() {
        let mut solver = BranchAndBound::new(4).unwrap();
        let mut objective = LinearObjective::new(4, Sense::Maximize);
        objective.set_coefficient(0, 1f64);
        objective.set_coefficient(1, -1f64);
        objective.set_coefficient(2, 2f64);
        objective.set_coefficient(3, -0.5);
        solver.set_objective(objective).unwrap();

        let solution = solver.solve().unwrap();
        assert_eq!(solution.x, vec![1f64, 0f64, 1f64, 0f64]);
        assert_eq!(solution.value, 3f64);
    }

    #[test]
    fn test_constraint_out_of_range() {
        let constraint = LinearConstraint::new(Relation::LessEqual, 1f64)
            .coefficient(5, 1f64);
        let mut solver = BranchAndBound::new(3).unwrap();
        let result = solver.set_constraints([constraint].into_iter().collect());

        assert!(matches!(
            result,
            Err(SolverError::VariableOutOfRange { index: 5, n_variables: 3 })
        ));
    }
}
