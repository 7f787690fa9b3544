//! Problem descriptions handed to the external solvers.
use serde::{Deserialize, Serialize};

use std::collections::BTreeMap;
use std::ops::Index;

use crate::common::utils;
use crate::error::SolverError;


/// The relation between the left- and right-hand side of a constraint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Relation {
    /// `Σ_i c_i x_i ≤ rhs`
    LessEqual,
    /// `Σ_i c_i x_i = rhs`
    Equal,
    /// `Σ_i c_i x_i ≥ rhs`
    GreaterEqual,
}


/// The direction of optimization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sense {
    /// Minimize the objective.
    Minimize,
    /// Maximize the objective.
    Maximize,
}


/// A linear constraint `Σ_i c_i x_i (≤|=|≥) rhs`.
/// Coefficients are stored sparsely.
///
/// # Example
/// ```
/// use structsvm::solver::{LinearConstraint, Relation};
///
/// // x_0 + x_1 + x_2 = 1
/// let choose_one = (0..3).fold(
///     LinearConstraint::new(Relation::Equal, 1f64),
///     |constraint, i| constraint.coefficient(i, 1f64),
/// );
/// assert!(choose_one.is_satisfied(&[0f64, 1f64, 0f64], 1e-9));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinearConstraint {
    /// Non-zero coefficients, indexed by variable.
    pub coefficients: BTreeMap<usize, f64>,
    /// The relation to the right-hand side.
    pub relation: Relation,
    /// The right-hand side.
    pub rhs: f64,
}


impl LinearConstraint {
    /// Constructs a constraint without coefficients.
    pub fn new(relation: Relation, rhs: f64) -> Self {
        Self {
            coefficients: BTreeMap::new(),
            relation,
            rhs,
        }
    }


    /// Sets the coefficient of the `i`-th variable.
    pub fn coefficient(mut self, i: usize, value: f64) -> Self {
        self.set_coefficient(i, value);
        self
    }


    /// Sets the coefficient of the `i`-th variable.
    /// A zero coefficient removes the variable from the constraint.
    pub fn set_coefficient(&mut self, i: usize, value: f64) {
        if value == 0f64 {
            self.coefficients.remove(&i);
        } else {
            self.coefficients.insert(i, value);
        }
    }


    /// Returns the left-hand side `Σ_i c_i x_i` at `x`.
    pub fn activity(&self, x: &[f64]) -> f64 {
        self.coefficients.iter()
            .map(|(&i, &c)| c * x[i])
            .sum::<f64>()
    }


    /// Returns `true` if `x` satisfies the constraint
    /// up to the absolute tolerance `tol`.
    pub fn is_satisfied(&self, x: &[f64], tol: f64) -> bool {
        let lhs = self.activity(x);
        match self.relation {
            Relation::LessEqual    => lhs <= self.rhs + tol,
            Relation::Equal        => (lhs - self.rhs).abs() <= tol,
            Relation::GreaterEqual => lhs >= self.rhs - tol,
        }
    }


    /// Returns the largest variable index used by this constraint.
    pub fn max_index(&self) -> Option<usize> {
        self.coefficients.keys()
            .next_back()
            .copied()
    }


    /// Checks that every variable index is below `n_variables`.
    pub fn check_range(&self, n_variables: usize) -> Result<(), SolverError> {
        match self.max_index() {
            Some(index) if index >= n_variables => {
                Err(SolverError::VariableOutOfRange { index, n_variables })
            },
            _ => Ok(()),
        }
    }
}


/// An ordered collection of [`LinearConstraint`]s.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearConstraints(Vec<LinearConstraint>);


impl LinearConstraints {
    /// Constructs an empty collection.
    pub fn new() -> Self {
        Self(Vec::new())
    }


    /// Appends a constraint.
    pub fn add(&mut self, constraint: LinearConstraint) {
        self.0.push(constraint);
    }


    /// Returns the number of constraints.
    pub fn len(&self) -> usize {
        self.0.len()
    }


    /// Returns `true` if there is no constraint.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }


    /// Iterates over the constraints.
    pub fn iter(&self) -> std::slice::Iter<'_, LinearConstraint> {
        self.0.iter()
    }


    /// Returns `true` if `x` satisfies every constraint.
    pub fn are_satisfied(&self, x: &[f64], tol: f64) -> bool {
        self.0.iter()
            .all(|c| c.is_satisfied(x, tol))
    }
}


impl FromIterator<LinearConstraint> for LinearConstraints {
    fn from_iter<I: IntoIterator<Item = LinearConstraint>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}


impl<'a> IntoIterator for &'a LinearConstraints {
    type Item = &'a LinearConstraint;
    type IntoIter = std::slice::Iter<'a, LinearConstraint>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}


/// A linear objective `constant + Σ_i c_i x_i`
/// together with the direction of optimization.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinearObjective {
    coefficients: Vec<f64>,
    constant: f64,
    sense: Sense,
}


impl LinearObjective {
    /// Constructs the zero objective over `n_variables` variables.
    pub fn new(n_variables: usize, sense: Sense) -> Self {
        Self {
            coefficients: vec![0f64; n_variables],
            constant: 0f64,
            sense,
        }
    }


    /// Sets the coefficient of the `i`-th variable.
    #[inline(always)]
    pub fn set_coefficient(&mut self, i: usize, value: f64) {
        self.coefficients[i] = value;
    }


    /// Sets the constant term.
    #[inline(always)]
    pub fn set_constant(&mut self, constant: f64) {
        self.constant = constant;
    }


    /// Returns the coefficients.
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients[..]
    }


    /// Returns the constant term.
    pub fn constant(&self) -> f64 {
        self.constant
    }


    /// Returns the direction of optimization.
    pub fn sense(&self) -> Sense {
        self.sense
    }


    /// Returns the number of variables.
    pub fn n_variables(&self) -> usize {
        self.coefficients.len()
    }


    /// Evaluates the objective at `x`.
    pub fn evaluate(&self, x: &[f64]) -> f64 {
        self.constant + utils::inner_product(&self.coefficients[..], x)
    }
}


/// A convex quadratic objective to be minimized:
/// ```txt
/// constant + Σ_i c_i x_i + Σ_{i ≤ j} q_ij x_i x_j
/// ```
/// The quadratic part is a symmetric matrix,
/// so `(i, j)` and `(j, i)` address the same term.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuadraticObjective {
    quadratic: BTreeMap<(usize, usize), f64>,
    linear: Vec<f64>,
    constant: f64,
}


impl QuadraticObjective {
    /// Constructs the zero objective over `n_variables` variables.
    pub fn new(n_variables: usize) -> Self {
        Self {
            quadratic: BTreeMap::new(),
            linear: vec![0f64; n_variables],
            constant: 0f64,
        }
    }


    /// Sets the coefficient of the term `x_i x_j`.
    pub fn set_quadratic_coefficient(&mut self, i: usize, j: usize, value: f64) {
        let key = if i <= j { (i, j) } else { (j, i) };
        if value == 0f64 {
            self.quadratic.remove(&key);
        } else {
            self.quadratic.insert(key, value);
        }
    }


    /// Sets the coefficient of the linear term `x_i`.
    #[inline(always)]
    pub fn set_coefficient(&mut self, i: usize, value: f64) {
        self.linear[i] = value;
    }


    /// Sets the constant term.
    #[inline(always)]
    pub fn set_constant(&mut self, constant: f64) {
        self.constant = constant;
    }


    /// Iterates over the quadratic terms `((i, j), q_ij)` with `i ≤ j`.
    pub fn quadratic_terms(&self) -> impl Iterator<Item = ((usize, usize), f64)> + '_ {
        self.quadratic.iter()
            .map(|(&key, &value)| (key, value))
    }


    /// Returns the coefficients of the linear part.
    pub fn linear(&self) -> &[f64] {
        &self.linear[..]
    }


    /// Returns the constant term.
    pub fn constant(&self) -> f64 {
        self.constant
    }


    /// Returns the number of variables.
    pub fn n_variables(&self) -> usize {
        self.linear.len()
    }


    /// Evaluates the objective at `x`.
    pub fn evaluate(&self, x: &[f64]) -> f64 {
        let quad = self.quadratic.iter()
            .map(|(&(i, j), &q)| q * x[i] * x[j])
            .sum::<f64>();
        self.constant + utils::inner_product(&self.linear[..], x) + quad
    }
}


/// An optimal point together with its objective value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    /// The objective value at `x`.
    pub value: f64,
    /// The assignment to all variables.
    pub x: Vec<f64>,
}


impl Index<usize> for Solution {
    type Output = f64;
    fn index(&self, i: usize) -> &f64 {
        &self.x[i]
    }
}
