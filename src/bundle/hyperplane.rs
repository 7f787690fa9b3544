//! A supporting hyperplane of the objective.
use serde::{Deserialize, Serialize};

use crate::common::utils;
use crate::solver::{LinearConstraint, Relation};


/// A hyperplane `w ↦ ⟨a, w⟩ + b` that lower-bounds a convex function `L`.
/// 
/// When `a` is a subgradient of `L` at `w'` and `b = L(w') - ⟨a, w'⟩`,
/// convexity gives `⟨a, w⟩ + b ≤ L(w)` for every `w`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Hyperplane {
    a: Vec<f64>,
    b: f64,
}


impl Hyperplane {
    /// Constructs the hyperplane `⟨a, w⟩ + b`.
    pub fn new(a: Vec<f64>, b: f64) -> Self {
        Self { a, b }
    }


    /// Constructs the hyperplane supporting `L` at `point`,
    /// given `value = L(point)` and a subgradient at `point`.
    /// 
    /// Time complexity: `O(d)`.
    pub fn at(point: &[f64], value: f64, subgradient: Vec<f64>) -> Self {
        let b = value - utils::inner_product(point, &subgradient[..]);
        Self { a: subgradient, b }
    }


    /// Returns the slope `a`.
    #[inline(always)]
    pub fn slope(&self) -> &[f64] {
        &self.a[..]
    }


    /// Returns the offset `b`.
    #[inline(always)]
    pub fn offset(&self) -> f64 {
        self.b
    }


    /// Evaluates `⟨a, w⟩ + b`.
    #[inline(always)]
    pub fn evaluate(&self, w: &[f64]) -> f64 {
        utils::inner_product(&self.a[..], w) + self.b
    }


    /// Returns the constraint `⟨a, w⟩ - ξ ≤ -b`
    /// over the variables `(w, ξ)`,
    /// i.e., `ξ` lies above this hyperplane.
    pub(crate) fn to_constraint(&self) -> LinearConstraint {
        let dims = self.a.len();
        let mut constraint = LinearConstraint::new(Relation::LessEqual, -self.b);
        self.a.iter()
            .enumerate()
            .for_each(|(i, &ai)| { constraint.set_coefficient(i, ai); });
        constraint.set_coefficient(dims, -1f64);
        constraint
    }
}
