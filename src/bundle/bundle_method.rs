//! This file defines `BundleMethod`, the bundle method for
//! regularized risk minimization of
//! ``Bundle Methods for Regularized Risk Minimization''
//! by Teo et al.
//! 
use crate::common::{
    checker,
    utils,
    constants::{
        DEFAULT_REGULARIZER,
        DEFAULT_TOLERANCE,
        NEGATIVE_GAP_TOLERANCE,
    },
};
use crate::error::{Error, Result};
use crate::oracle::ValueGradient;
use crate::research::{
    IterationRecord,
    Observer,
    Silent,
};
use crate::solver::{
    ClarabelQpSolver,
    QuadraticSolver,
};
use super::hyperplane::Hyperplane;
use super::master_problem::MasterProblem;
use super::outcome::{
    BundleOutcome,
    Termination,
};

use std::marker::PhantomData;
use std::ops::ControlFlow;
use std::time::Instant;


/// The bundle method minimizes
/// ```txt
/// min  λ/2 |w|² + L(w),    w ∈ ℝ^d
///  w
/// ```
/// for a convex, possibly non-smooth `L`
/// given by a [`ValueGradient`] oracle.
/// 
/// In each iteration `t = 1, 2, ...`,
/// 1. the oracle returns `L(w_{t-1})` and a subgradient `a_t`.
/// 2. the hyperplane `⟨a_t, w⟩ + b_t` with
///    `b_t = L(w_{t-1}) - ⟨a_t, w_{t-1}⟩` is added to the bundle.
/// 3. the master problem `min λ/2 |w|² + max_i ⟨a_i, w⟩ + b_i`
///    yields the next iterate `w_t` and the lower bound `min_lower`.
/// 
/// The iteration stops once the gap between
/// the best observed objective value and `min_lower`
/// drops below the tolerance `ε`.
/// 
/// The master problem is solved by `Q`,
/// [`ClarabelQpSolver`] by default.
/// 
/// # Example
/// ```
/// use structsvm::BundleMethod;
/// 
/// // L(w) = (w - 1)²
/// let oracle = |w: &[f64]| {
///     ((w[0] - 1f64).powi(2), vec![2f64 * (w[0] - 1f64)])
/// };
/// let mut bundle = BundleMethod::new(oracle, 1, 1e-4, 1e-6);
/// let outcome = bundle.optimize(Some(200)).unwrap();
/// 
/// assert!((outcome.weights[0] - 1f64).abs() < 1e-2);
/// ```
pub struct BundleMethod<O, Q = ClarabelQpSolver> {
    // First-order oracle of `L`
    oracle: O,

    // Number of dimensions of `w`
    dims: usize,

    // Regularizer weight `λ`
    lambda: f64,

    // Tolerance parameter `ε`
    eps: f64,

    // The master problem of the current run.
    master: Option<MasterProblem<Q>>,

    // Current iterate `w_t`
    weights: Vec<f64>,

    // Smallest observed `λ/2 |w|² + L(w)`
    min_value: f64,

    // Optimal value of the last master problem
    min_lower: f64,

    // `min_value - min_lower`
    gap: f64,

    // `L(w_{t-1})` of the last oracle call
    last_value: f64,

    _solver: PhantomData<Q>,
}


impl<O> BundleMethod<O, ClarabelQpSolver>
    where O: ValueGradient,
{
    /// Constructs a new instance of `BundleMethod`
    /// with regularizer weight `lambda` and tolerance `eps`.
    /// 
    /// Time complexity: `O(1)`.
    pub fn new(oracle: O, dims: usize, lambda: f64, eps: f64) -> Self {
        Self::init(oracle, dims)
            .regularizer(lambda)
            .tolerance(eps)
    }


    /// Constructs a new instance of `BundleMethod`
    /// with the default parameters `λ = 1` and `ε = 1e-3`.
    /// 
    /// Time complexity: `O(1)`.
    pub fn init(oracle: O, dims: usize) -> Self {
        checker::dimension(dims);

        Self {
            oracle,
            dims,
            lambda: DEFAULT_REGULARIZER,
            eps: DEFAULT_TOLERANCE,

            master: None,
            weights: vec![0f64; dims],
            min_value: f64::INFINITY,
            min_lower: f64::NEG_INFINITY,
            gap: f64::INFINITY,
            last_value: f64::NAN,

            _solver: PhantomData,
        }
    }
}


impl<O, Q> BundleMethod<O, Q> {
    /// Replaces the solver of the master problem.
    /// 
    /// ```no_run
    /// # #[cfg(feature = "extended")]
    /// # {
    /// use structsvm::BundleMethod;
    /// use structsvm::solver::GurobiQpSolver;
    /// 
    /// let oracle = |w: &[f64]| (w[0].abs(), vec![w[0].signum()]);
    /// let bundle = BundleMethod::init(oracle, 1)
    ///     .master_solver::<GurobiQpSolver>();
    /// # }
    /// ```
    /// 
    /// Time complexity: `O(1)`.
    pub fn master_solver<R>(self) -> BundleMethod<O, R>
        where R: QuadraticSolver,
    {
        BundleMethod {
            oracle: self.oracle,
            dims: self.dims,
            lambda: self.lambda,
            eps: self.eps,

            master: None,
            weights: self.weights,
            min_value: self.min_value,
            min_lower: self.min_lower,
            gap: self.gap,
            last_value: self.last_value,

            _solver: PhantomData,
        }
    }


    /// Set the regularizer weight `λ ≥ 0`.
    /// With `λ = 0` the master problem stays unbounded
    /// until the bundle bounds `L` from below in every direction.
    /// Default value is `1.0`.
    /// 
    /// Time complexity: `O(1)`.
    #[inline(always)]
    pub fn regularizer(mut self, lambda: f64) -> Self {
        checker::regularizer(lambda);
        self.lambda = lambda;
        self
    }


    /// Set the tolerance parameter `ε > 0`.
    /// Default value is `1e-3`.
    /// 
    /// Time complexity: `O(1)`.
    #[inline(always)]
    pub fn tolerance(mut self, eps: f64) -> Self {
        checker::tolerance(eps);
        self.eps = eps;
        self
    }


    /// Returns the number of dimensions of `w`.
    #[inline(always)]
    pub fn dims(&self) -> usize {
        self.dims
    }


    /// Returns the oracle.
    #[inline(always)]
    pub fn oracle(&self) -> &O {
        &self.oracle
    }


    /// Returns the oracle.
    #[inline(always)]
    pub fn oracle_mut(&mut self) -> &mut O {
        &mut self.oracle
    }


    /// Consumes `self` and returns the oracle.
    #[inline(always)]
    pub fn into_oracle(self) -> O {
        self.oracle
    }


    /// Returns the name of the algorithm.
    pub fn name(&self) -> &str {
        "Bundle Method"
    }


    /// Returns the current configuration.
    pub fn info(&self) -> Vec<(&str, String)> {
        let solver = std::any::type_name::<Q>()
            .rsplit("::")
            .next()
            .unwrap_or("-");
        Vec::from([
            ("# of dimensions", format!("{}", self.dims)),
            ("Regularizer (λ)", format!("{}", self.lambda)),
            ("Tolerance (ε)", format!("{}", self.eps)),
            ("Master solver", solver.to_string()),
        ])
    }
}


impl<O, Q> BundleMethod<O, Q>
    where O: ValueGradient,
          Q: QuadraticSolver,
{
    /// Minimizes `λ/2 |w|² + L(w)`.
    /// 
    /// `max_iterations = None` runs until the gap reaches `ε`.
    /// `Some(0)` returns the zero vector without calling the oracle.
    /// 
    /// Errors of the oracle or of the master problem abort the run;
    /// a [`Termination::NumericalAnomaly`] is not an error.
    pub fn optimize(&mut self, max_iterations: Option<usize>)
        -> Result<BundleOutcome>
    {
        self.optimize_with(max_iterations, &mut Silent)
    }


    /// Same as [`BundleMethod::optimize`],
    /// but reports every iteration to `observer`.
    pub fn optimize_with<B>(
        &mut self,
        max_iterations: Option<usize>,
        observer: &mut B,
    ) -> Result<BundleOutcome>
        where B: Observer + ?Sized,
    {
        self.preprocess()?;
        observer.start(self.name(), &self.info());

        let now = Instant::now();
        let mut iterations = 0;
        let termination = loop {
            if max_iterations.is_some_and(|max| iterations >= max) {
                log::info!(
                    "reached the maximal number of iterations ({iterations})"
                );
                break Termination::MaxIterations;
            }
            iterations += 1;

            let flow = self.step(iterations);
            let flow = match flow {
                Ok(flow) => flow,
                Err(e) => {
                    self.master = None;
                    return Err(e);
                },
            };

            let record = IterationRecord {
                iteration: iterations,
                value: self.last_value,
                min_value: self.min_value,
                min_lower: self.min_lower,
                gap: self.gap,
                elapsed_millis: now.elapsed().as_millis(),
                weights: &self.weights[..],
            };
            observer.observe(&record);

            if let ControlFlow::Break(termination) = flow {
                break termination;
            }
        };

        let outcome = self.postprocess(termination, iterations);
        observer.finish(&outcome);
        Ok(outcome)
    }


    /// Resets the state and sets up a fresh master problem.
    fn preprocess(&mut self) -> Result<()> {
        self.master = Some(MasterProblem::init(self.dims, self.lambda)?);
        self.weights = vec![0f64; self.dims];
        self.min_value = f64::INFINITY;
        self.min_lower = f64::NEG_INFINITY;
        self.gap = f64::INFINITY;
        self.last_value = f64::NAN;
        Ok(())
    }


    /// One iteration of the bundle method.
    fn step(&mut self, iteration: usize) -> Result<ControlFlow<Termination>> {
        log::info!("----------------- iteration {iteration}");
        log::debug!("current w is {:?}", self.weights);

        let (value, gradient) = self.oracle.value_and_gradient(&self.weights)?;
        self.check_oracle_output(value, &gradient[..])?;
        log::debug!("L(w)       = {value}");
        log::debug!("∂L(w)/∂w   = {gradient:?}");

        let norm = utils::squared_norm(&self.weights[..]);
        self.min_value = self.min_value.min(value + 0.5 * self.lambda * norm);
        log::debug!("min_value  = {}", self.min_value);

        let hyperplane = Hyperplane::at(&self.weights[..], value, gradient);
        log::debug!(
            "adding hyperplane a = {:?}, b = {}",
            hyperplane.slope(), hyperplane.offset(),
        );

        let master = self.master.as_mut()
            .ok_or_else(|| Error::NumericalFailure(
                "the master problem is not initialized".to_string()
            ))?;
        master.add_hyperplane(hyperplane)?;
        log::debug!("# of hyperplanes in the bundle: {}", master.len());
        let (weights, min_lower) = master.find_min_lower_bound()?;
        log::debug!("argmin of lower bound = {weights:?}");
        log::debug!("min of lower bound    = {min_lower}");

        self.weights = weights;
        self.last_value = value;
        self.min_lower = min_lower;
        self.gap = self.min_value - self.min_lower;
        log::info!("ε   = {}", self.gap);
        log::debug!("ε/2 = {}", self.gap / 2f64);

        if self.gap > self.eps {
            return Ok(ControlFlow::Continue(()));
        }

        // A lower bound above the best value by no more than
        // the solver accuracy counts as a zero gap.
        let slack = NEGATIVE_GAP_TOLERANCE * self.min_value.abs().max(1f64);
        if self.gap < -slack {
            log::warn!(
                "ε < 0 (ε = {}), i.e., the lower bound exceeds the \
                best observed value. This is a numerical issue \
                of the master problem or the oracle.",
                self.gap
            );
            return Ok(ControlFlow::Break(Termination::NumericalAnomaly));
        }

        log::info!("converged to ε = {} ≤ {}", self.gap, self.eps);
        Ok(ControlFlow::Break(Termination::Converged))
    }


    fn check_oracle_output(&self, value: f64, gradient: &[f64]) -> Result<()> {
        if gradient.len() != self.dims {
            return Err(Error::DimensionMismatch {
                context: "subgradient returned by the oracle",
                expected: self.dims,
                got: gradient.len(),
            });
        }
        if !value.is_finite() {
            return Err(Error::NumericalFailure(
                format!("the oracle returned L(w) = {value}")
            ));
        }
        if let Some(g) = gradient.iter().find(|g| !g.is_finite()) {
            return Err(Error::NumericalFailure(
                format!("the oracle returned a subgradient entry {g}")
            ));
        }
        Ok(())
    }


    fn postprocess(&mut self, termination: Termination, iterations: usize)
        -> BundleOutcome
    {
        let hyperplanes = self.master.take()
            .map(|master| master.into_hyperplanes())
            .unwrap_or_default();

        BundleOutcome {
            weights: self.weights.clone(),
            termination,
            iterations,
            gap: self.gap,
            min_value: self.min_value,
            min_lower: self.min_lower,
            hyperplanes,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_budget() {
        let oracle = |_: &[f64]| -> (f64, Vec<f64>) {
            panic!("the oracle must not be called")
        };
        let mut bundle = BundleMethod::init(oracle, 3);
        let outcome = bundle.optimize(Some(0)).unwrap();

        assert_eq!(outcome.weights, vec![0f64; 3]);
        assert_eq!(outcome.iterations, 0);
        assert_eq!(outcome.termination, Termination::MaxIterations);
        assert!(outcome.gap.is_infinite());
        assert!(outcome.hyperplanes.is_empty());
    }

    #[test]
    fn test_info() {
        let oracle = |w: &[f64]| (0f64, vec![0f64; w.len()]);
        let bundle = BundleMethod::new(oracle, 2, 0.5, 1e-4);
        let info = bundle.info();
        assert_eq!(info[0], ("# of dimensions", "2".to_string()));
        assert_eq!(info[1], ("Regularizer (λ)", "0.5".to_string()));
        assert_eq!(info[3], ("Master solver", "ClarabelQpSolver".to_string()));
    }

    #[test]
    #[should_panic]
    fn test_negative_regularizer() {
        let oracle = |w: &[f64]| (0f64, vec![0f64; w.len()]);
        let _ = BundleMethod::init(oracle, 2).regularizer(-1f64);
    }

    #[test]
    #[should_panic]
    fn test_zero_tolerance() {
        let oracle = |w: &[f64]| (0f64, vec![0f64; w.len()]);
        let _ = BundleMethod::init(oracle, 2).tolerance(0f64);
    }
}
