//! The result of a bundle method run.
use serde::{Deserialize, Serialize};

use super::hyperplane::Hyperplane;


/// Why the bundle method stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// The gap `ε_t` dropped to `ε` or below
    /// without turning negative beyond the solver accuracy.
    Converged,
    /// The gap `ε_t` became negative beyond the solver accuracy
    /// (`1e-9` relative to the best observed value),
    /// i.e., the lower bound exceeded the best observed value.
    /// This only happens through numerical errors of the solvers.
    NumericalAnomaly,
    /// The iteration budget was used up before the gap reached `ε`.
    MaxIterations,
}


/// The outcome of [`BundleMethod::optimize`](crate::BundleMethod::optimize).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BundleOutcome {
    /// The last iterate `w_t`.
    pub weights: Vec<f64>,
    /// Why the iteration stopped.
    pub termination: Termination,
    /// Number of oracle calls.
    pub iterations: usize,
    /// The last gap `ε_t = min_value - min_lower`.
    pub gap: f64,
    /// The smallest observed value of `λ/2 |w_i|² + L(w_i)`.
    pub min_value: f64,
    /// The optimal value of the last master problem.
    pub min_lower: f64,
    /// The bundle, in the order the hyperplanes were added.
    pub hyperplanes: Vec<Hyperplane>,
}


impl BundleOutcome {
    /// Returns `true` if the gap reached the threshold
    /// without numerical anomalies.
    #[inline(always)]
    pub fn converged(&self) -> bool {
        self.termination == Termination::Converged
    }


    /// Evaluates the piecewise-linear lower bound
    /// `ℒ_t(w) = max_i ⟨a_i, w⟩ + b_i`.
    /// Returns `-∞` for an empty bundle.
    pub fn lower_bound(&self, w: &[f64]) -> f64 {
        self.hyperplanes.iter()
            .map(|h| h.evaluate(w))
            .fold(f64::NEG_INFINITY, f64::max)
    }
}
