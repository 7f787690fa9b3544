//! Provides the [`ValueGradient`] trait,
//! the first-order oracle consumed by the bundle method.
use crate::error::Result;


/// A first-order oracle of a convex, possibly non-smooth function `L`.
/// Given a point `w`, it returns the value `L(w)` and
/// a subgradient `a ∈ ∂L(w)`.
/// 
/// [`BundleMethod`](crate::BundleMethod) only talks to this trait,
/// so any convex function can be minimized,
/// not only the structured hinge loss of
/// [`SoftMarginLoss`](crate::SoftMarginLoss).
/// 
/// Closures of the form `FnMut(&[f64]) -> (f64, Vec<f64>)`
/// implement this trait.
/// 
/// # Example
/// ```
/// use structsvm::ValueGradient;
/// 
/// // f(x) = (x - 1)²
/// let mut oracle = |w: &[f64]| {
///     let value = (w[0] - 1f64).powi(2);
///     (value, vec![2f64 * (w[0] - 1f64)])
/// };
/// let (value, gradient) = oracle.value_and_gradient(&[0f64]).unwrap();
/// assert_eq!(value, 1f64);
/// assert_eq!(gradient, vec![-2f64]);
/// ```
pub trait ValueGradient {
    /// Returns `(L(w), ∂L(w)/∂w)`.
    /// The subgradient must have the same length as `w`.
    fn value_and_gradient(&mut self, w: &[f64]) -> Result<(f64, Vec<f64>)>;
}


impl<F> ValueGradient for F
    where F: FnMut(&[f64]) -> (f64, Vec<f64>)
{
    #[inline(always)]
    fn value_and_gradient(&mut self, w: &[f64]) -> Result<(f64, Vec<f64>)> {
        Ok(self(w))
    }
}
