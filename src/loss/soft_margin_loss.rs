//! This file defines `SoftMarginLoss`, the structured hinge loss
//! of a linear model over binary outputs.
use fixedbitset::FixedBitSet;

use super::linear_cost::LinearCost;
use crate::common::{
    checker,
    utils,
};
use crate::error::{
    Error,
    Result,
    SolverError,
};
use crate::oracle::ValueGradient;
use crate::solver::{
    BranchAndBound,
    LinearConstraints,
    LinearObjective,
    LinearSolver,
    Sense,
};


/// The structured hinge loss
/// ```txt
/// L(w) = max_{y ∈ Y} Δ(y) + ⟨wφ, y'⟩ - ⟨wφ, y⟩
/// ```
/// of a linear energy `y ↦ ⟨wφ, y⟩` over binary outputs `y ∈ Y ⊆ {0, 1}^n`,
/// whose prediction is the feasible output of minimal energy.
/// Here
/// - `φ` is the `d × n` feature matrix (one row per feature),
/// - `y'` is the ground truth,
/// - `Δ(y) = ⟨g, y⟩ + b` is a [`LinearCost`] and
/// - `Y` is described by linear constraints.
/// 
/// Each call to [`ValueGradient::value_and_gradient`] solves
/// the loss-augmented inference
/// ```txt
/// y* = argmax  (⟨wφ, y'⟩ + b) + ⟨g - wφ, y⟩
///      y ∈ Y
/// ```
/// with a [`LinearSolver`] and returns the optimal value
/// together with the subgradient `φy' - φy*`.
/// 
/// # Example
/// ```
/// use structsvm::{SoftMarginLoss, ValueGradient};
/// use structsvm::solver::{LinearConstraint, LinearConstraints, Relation};
/// 
/// // Choose exactly one of three outputs.
/// let choose_one = (0..3).fold(
///     LinearConstraint::new(Relation::Equal, 1f64),
///     |c, i| c.coefficient(i, 1f64),
/// );
/// let features = vec![
///     vec![1f64, 0f64, 0f64],
///     vec![0f64, 1f64, 0f64],
///     vec![0f64, 0f64, 1f64],
/// ];
/// let mut loss = SoftMarginLoss::builder(features, vec![1f64, 0f64, 0f64])
///     .constraints(LinearConstraints::from_iter([choose_one]))
///     .build()
///     .unwrap();
/// 
/// // At w = 0, any wrong output costs 2.
/// let (value, gradient) = loss.value_and_gradient(&[0f64; 3]).unwrap();
/// assert!((value - 2f64).abs() < 1e-6);
/// assert_eq!(gradient.iter().sum::<f64>(), 0f64);
/// ```
pub struct SoftMarginLoss<S = BranchAndBound> {
    // Feature matrix `φ`, one row per feature.
    features: Vec<Vec<f64>>,

    // Ground truth `y'`
    ground_truth: Vec<f64>,

    // `φ y'`
    truth_features: Vec<f64>,

    costs: LinearCost,

    // Solver of the loss-augmented inference.
    // Its constraints are set once at construction.
    solver: S,
}


impl SoftMarginLoss {
    /// Starts building the loss for the feature matrix `features`
    /// (one row per feature, one column per output coordinate)
    /// and the binary ground truth `ground_truth`.
    pub fn builder(features: Vec<Vec<f64>>, ground_truth: Vec<f64>)
        -> SoftMarginLossBuilder
    {
        SoftMarginLossBuilder::new(features, ground_truth)
    }
}


impl<S> SoftMarginLoss<S> {
    /// Returns the number of features `d`,
    /// i.e., the dimension of `w`.
    #[inline(always)]
    pub fn dims(&self) -> usize {
        self.features.len()
    }


    /// Returns the number of output coordinates `n`.
    #[inline(always)]
    pub fn n_outputs(&self) -> usize {
        self.ground_truth.len()
    }


    /// Returns the ground truth `y'`.
    #[inline(always)]
    pub fn ground_truth(&self) -> &[f64] {
        &self.ground_truth[..]
    }


    /// Returns the cost function `Δ`.
    #[inline(always)]
    pub fn costs(&self) -> &LinearCost {
        &self.costs
    }


    /// Returns the solver of the loss-augmented inference.
    #[inline(always)]
    pub fn solver(&self) -> &S {
        &self.solver
    }
}


impl<S> ValueGradient for SoftMarginLoss<S>
    where S: LinearSolver,
{
    fn value_and_gradient(&mut self, w: &[f64]) -> Result<(f64, Vec<f64>)> {
        let dims = self.dims();
        let n = self.n_outputs();
        if w.len() != dims {
            return Err(Error::DimensionMismatch {
                context: "weights passed to the loss",
                expected: dims,
                got: w.len(),
            });
        }

        // f = wφ, a = <f, y'>
        let f = utils::vector_matrix(w, &self.features[..], n);
        let a = utils::inner_product(&f[..], &self.ground_truth[..]);
        let b = self.costs.offset();

        // max (a + b) + <g - f, y>
        let mut objective = LinearObjective::new(n, Sense::Maximize);
        self.costs.coefficients()
            .iter()
            .zip(&f)
            .enumerate()
            .for_each(|(i, (g, fi))| {
                objective.set_coefficient(i, g - fi);
            });
        objective.set_constant(a + b);
        self.solver.set_objective(objective)?;

        let solution = self.solver.solve()
            .map_err(|e| match e {
                SolverError::Infeasible => Error::OracleInfeasible,
                e => Error::Solver(e),
            })?;
        log::debug!("loss-augmented inference: y* = {:?}", solution.x);

        let y_star = solution.x;
        let gradient = utils::matrix_vector(&self.features[..], &y_star[..])
            .into_iter()
            .zip(&self.truth_features)
            .map(|(star, truth)| truth - star)
            .collect::<Vec<_>>();

        Ok((solution.value, gradient))
    }
}


/// A builder of [`SoftMarginLoss`].
/// 
/// Without [`costs`](SoftMarginLossBuilder::costs),
/// the loss uses the Hamming distance to the ground truth,
/// restricted to [`mask`](SoftMarginLossBuilder::mask) if given.
/// Without [`constraints`](SoftMarginLossBuilder::constraints),
/// every binary output is feasible.
pub struct SoftMarginLossBuilder {
    features: Vec<Vec<f64>>,
    ground_truth: Vec<f64>,
    constraints: LinearConstraints,
    costs: Option<LinearCost>,
    mask: Option<FixedBitSet>,
}


impl SoftMarginLossBuilder {
    fn new(features: Vec<Vec<f64>>, ground_truth: Vec<f64>) -> Self {
        Self {
            features,
            ground_truth,
            constraints: LinearConstraints::new(),
            costs: None,
            mask: None,
        }
    }


    /// Set the constraints that describe the feasible outputs.
    #[inline(always)]
    pub fn constraints(mut self, constraints: LinearConstraints) -> Self {
        self.constraints = constraints;
        self
    }


    /// Set the cost function `Δ`.
    #[inline(always)]
    pub fn costs(mut self, costs: LinearCost) -> Self {
        self.costs = Some(costs);
        self
    }


    /// Restrict the default Hamming cost to the coordinates in `mask`.
    /// Ignored if [`costs`](SoftMarginLossBuilder::costs) is set.
    #[inline(always)]
    pub fn mask(mut self, mask: FixedBitSet) -> Self {
        self.mask = Some(mask);
        self
    }


    /// Builds the loss with the [`BranchAndBound`] solver.
    pub fn build(self) -> Result<SoftMarginLoss<BranchAndBound>> {
        self.build_with_solver::<BranchAndBound>()
    }


    /// Builds the loss with the solver `S`.
    pub fn build_with_solver<S>(self) -> Result<SoftMarginLoss<S>>
        where S: LinearSolver,
    {
        self.validate()?;
        let n = self.ground_truth.len();

        let costs = match (self.costs, self.mask) {
            (Some(costs), _) => costs,
            (None, Some(mask)) => {
                LinearCost::hamming_masked(&self.ground_truth[..], &mask)
            },
            (None, None) => LinearCost::hamming(&self.ground_truth[..]),
        };
        if costs.len() != n {
            return Err(Error::DimensionMismatch {
                context: "cost coefficients",
                expected: n,
                got: costs.len(),
            });
        }

        let mut solver = S::new(n)?;
        solver.set_constraints(self.constraints)?;

        let truth_features = utils::matrix_vector(
            &self.features[..], &self.ground_truth[..]
        );

        Ok(SoftMarginLoss {
            features: self.features,
            ground_truth: self.ground_truth,
            truth_features,
            costs,
            solver,
        })
    }


    fn validate(&self) -> Result<()> {
        let n = self.ground_truth.len();
        if self.features.is_empty() || n == 0 {
            return Err(Error::Validation(
                "the feature matrix and the ground truth must not be empty"
                    .to_string()
            ));
        }
        if let Some(row) = self.features.iter().find(|row| row.len() != n) {
            return Err(Error::DimensionMismatch {
                context: "columns of the feature matrix",
                expected: n,
                got: row.len(),
            });
        }
        if !checker::is_binary(&self.ground_truth[..]) {
            return Err(Error::Validation(
                "the ground truth must consist of 0 and 1".to_string()
            ));
        }
        if let Some(i) = self.constraints.iter().filter_map(|c| c.max_index()).max() {
            if i >= n {
                return Err(Error::Validation(format!(
                    "a constraint refers to y[{i}], but there are {n} outputs"
                )));
            }
        }
        if let Some(i) = self.mask.as_ref().and_then(|m| m.ones().find(|&i| i >= n)) {
            return Err(Error::Validation(format!(
                "the mask contains {i}, but there are {n} outputs"
            )));
        }
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::{LinearConstraint, Relation};

    fn identity(n: usize) -> Vec<Vec<f64>> {
        (0..n).map(|i| {
                let mut row = vec![0f64; n];
                row[i] = 1f64;
                row
            })
            .collect()
    }

    #[test]
    fn test_unconstrained_hamming() {
        // With w = 0, flipping every coordinate maximizes the Hamming cost.
        let mut loss = SoftMarginLoss::builder(identity(3), vec![1f64, 0f64, 1f64])
            .build()
            .unwrap();
        let (value, gradient) = loss.value_and_gradient(&[0f64; 3]).unwrap();

        assert!((value - 3f64).abs() < 1e-6);
        assert_eq!(gradient, vec![1f64, -1f64, 1f64]);
    }

    #[test]
    fn test_zero_loss_at_large_margin() {
        // A low energy of the ground truth makes y* = y'.
        let mut loss = SoftMarginLoss::builder(identity(3), vec![1f64, 0f64, 1f64])
            .build()
            .unwrap();
        let (value, gradient) = loss.value_and_gradient(&[-5f64, 5f64, -5f64])
            .unwrap();

        assert!(value.abs() < 1e-6);
        assert_eq!(gradient, vec![0f64; 3]);
    }

    #[test]
    fn test_infeasible_region() {
        let constraints = LinearConstraints::from_iter([
            LinearConstraint::new(Relation::GreaterEqual, 3f64)
                .coefficient(0, 1f64)
                .coefficient(1, 1f64),
        ]);
        let mut loss = SoftMarginLoss::builder(identity(2), vec![1f64, 0f64])
            .constraints(constraints)
            .build()
            .unwrap();

        let result = loss.value_and_gradient(&[0f64; 2]);
        assert!(matches!(result, Err(Error::OracleInfeasible)));
    }

    #[test]
    fn test_validation() {
        let ragged = vec![vec![1f64, 0f64], vec![1f64]];
        assert!(matches!(
            SoftMarginLoss::builder(ragged, vec![0f64, 1f64]).build(),
            Err(Error::DimensionMismatch { .. })
        ));

        let non_binary = SoftMarginLoss::builder(identity(2), vec![0.5, 1f64])
            .build();
        assert!(matches!(non_binary, Err(Error::Validation(_))));

        let out_of_range = LinearConstraints::from_iter([
            LinearConstraint::new(Relation::LessEqual, 1f64)
                .coefficient(2, 1f64),
        ]);
        let result = SoftMarginLoss::builder(identity(2), vec![0f64, 1f64])
            .constraints(out_of_range)
            .build();
        assert!(matches!(result, Err(Error::Validation(_))));

        let costs = LinearCost::new(vec![1f64], 0f64);
        let result = SoftMarginLoss::builder(identity(2), vec![0f64, 1f64])
            .costs(costs)
            .build();
        assert!(matches!(result, Err(Error::DimensionMismatch { .. })));
    }

    #[test]
    fn test_wrong_weight_length() {
        let mut loss = SoftMarginLoss::builder(identity(2), vec![0f64, 1f64])
            .build()
            .unwrap();
        let result = loss.value_and_gradient(&[0f64; 3]);
        assert!(matches!(result, Err(Error::DimensionMismatch { .. })));
    }
}
