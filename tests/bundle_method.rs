use rand::prelude::*;
use rand_distr::Uniform;
use approx::assert_abs_diff_eq;

use structsvm::prelude::*;
use structsvm::Error;
use structsvm::research::History;


/// `L(w) = max_k <c_k, w> + d_k` with random `c_k, d_k`.
struct MaxAffine {
    slopes: Vec<Vec<f64>>,
    offsets: Vec<f64>,
}


impl MaxAffine {
    fn random(dims: usize, pieces: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let uni = Uniform::new(-1f64, 1f64);
        let slopes = (0..pieces)
            .map(|_| (0..dims).map(|_| uni.sample(&mut rng)).collect())
            .collect();
        let offsets = (0..pieces)
            .map(|_| uni.sample(&mut rng))
            .collect();
        Self { slopes, offsets }
    }


    fn value(&self, w: &[f64]) -> f64 {
        self.value_and_argmax(w).0
    }


    fn value_and_argmax(&self, w: &[f64]) -> (f64, usize) {
        self.slopes.iter()
            .zip(&self.offsets)
            .map(|(c, d)| c.iter().zip(w).map(|(ci, wi)| ci * wi).sum::<f64>() + d)
            .enumerate()
            .map(|(k, v)| (v, k))
            .fold((f64::NEG_INFINITY, 0), |best, cur| {
                if cur.0 > best.0 { cur } else { best }
            })
    }
}


impl ValueGradient for MaxAffine {
    fn value_and_gradient(&mut self, w: &[f64]) -> structsvm::Result<(f64, Vec<f64>)> {
        let (value, k) = self.value_and_argmax(w);
        Ok((value, self.slopes[k].clone()))
    }
}


fn shifted_quadratic(w: &[f64]) -> (f64, Vec<f64>) {
    ((w[0] - 1f64).powi(2), vec![2f64 * (w[0] - 1f64)])
}


/// Tests for `BundleMethod`.
#[cfg(test)]
pub mod bundle_method_tests {
    use super::*;

    #[test]
    fn quadratic_with_small_regularizer() {
        let mut bundle = BundleMethod::new(shifted_quadratic, 1, 1e-4, 1e-5);
        let outcome = bundle.optimize(Some(100)).unwrap();

        assert_eq!(outcome.termination, Termination::Converged);
        assert!((0f64..=1e-5).contains(&outcome.gap));
        assert_abs_diff_eq!(outcome.weights[0], 1f64, epsilon = 2e-3);
    }

    #[test]
    fn quadratic_analytic_minimizer() {
        // argmin λ/2 w² + (w - 1)² = 2 / (2 + λ)
        let lambda = 0.5;
        let mut bundle = BundleMethod::new(shifted_quadratic, 1, lambda, 1e-8);
        let outcome = bundle.optimize(Some(200)).unwrap();

        assert!(outcome.converged());
        assert_abs_diff_eq!(
            outcome.weights[0], 2f64 / (2f64 + lambda), epsilon = 1e-3
        );
        assert!(outcome.gap <= 1e-8);
    }

    #[test]
    fn zero_gap_on_constant_function() {
        let constant = |w: &[f64]| (3f64, vec![0f64; w.len()]);
        let mut bundle = BundleMethod::init(constant, 4);
        let outcome = bundle.optimize(None).unwrap();

        assert!(outcome.iterations <= 2);
        assert_eq!(outcome.termination, Termination::Converged);
        assert_abs_diff_eq!(outcome.gap, 0f64, epsilon = 1e-6);
        assert_abs_diff_eq!(outcome.min_value, 3f64, epsilon = 1e-9);
    }

    #[test]
    fn bounds_are_monotone() {
        for seed in 0..5 {
            let oracle = MaxAffine::random(3, 8, seed);
            let mut bundle = BundleMethod::new(oracle, 3, 1f64, 1e-6);
            let mut history = History::new();
            bundle.optimize_with(Some(50), &mut history).unwrap();

            let entries = history.entries();
            assert!(!entries.is_empty());
            for pair in entries.windows(2) {
                let (prev, next) = (&pair[0], &pair[1]);
                assert!(next.min_value <= prev.min_value);
                let slack = 1e-6 * (1f64 + prev.min_lower.abs());
                assert!(next.min_lower >= prev.min_lower - slack);
            }
        }
    }

    #[test]
    fn hyperplanes_bound_the_loss_from_below() {
        let oracle = MaxAffine::random(2, 6, 42);
        let mut bundle = BundleMethod::new(oracle, 2, 0.5, 1e-6);
        let outcome = bundle.optimize(Some(30)).unwrap();
        let oracle = bundle.into_oracle();

        let mut rng = StdRng::seed_from_u64(7);
        let uni = Uniform::new(-10f64, 10f64);
        for _ in 0..200 {
            let w = (0..2).map(|_| uni.sample(&mut rng)).collect::<Vec<_>>();
            let value = oracle.value(&w);
            for h in &outcome.hyperplanes {
                assert!(h.evaluate(&w) <= value + 1e-9);
            }
            assert!(outcome.lower_bound(&w) <= value + 1e-9);
        }
    }

    #[test]
    fn iteration_budget() {
        let oracle = MaxAffine::random(3, 8, 3);
        let mut bundle = BundleMethod::new(oracle, 3, 1f64, 1e-12);
        let outcome = bundle.optimize(Some(2)).unwrap();

        assert!(outcome.iterations <= 2);
        assert_eq!(outcome.hyperplanes.len(), outcome.iterations);
        assert_eq!(outcome.weights.len(), 3);
        if outcome.termination == Termination::MaxIterations {
            assert!(!outcome.converged());
        }
    }

    #[test]
    fn zero_budget_skips_the_oracle() {
        let mut calls = 0;
        let oracle = |w: &[f64]| {
            calls += 1;
            (0f64, vec![0f64; w.len()])
        };
        let mut bundle = BundleMethod::init(oracle, 2);
        let outcome = bundle.optimize(Some(0)).unwrap();
        drop(bundle);

        assert_eq!(calls, 0);
        assert_eq!(outcome.weights, vec![0f64; 2]);
        assert_eq!(outcome.termination, Termination::MaxIterations);
        assert!(outcome.gap.is_infinite());
    }

    #[test]
    fn subgradient_of_wrong_length() {
        let oracle = |_: &[f64]| (1f64, vec![0f64; 3]);
        let mut bundle = BundleMethod::init(oracle, 2);
        let result = bundle.optimize(Some(10));

        assert!(matches!(
            result,
            Err(Error::DimensionMismatch { expected: 2, got: 3, .. })
        ));
    }

    #[test]
    fn non_finite_value() {
        let oracle = |w: &[f64]| (f64::NAN, vec![0f64; w.len()]);
        let mut bundle = BundleMethod::init(oracle, 2);
        let result = bundle.optimize(Some(10));

        assert!(matches!(result, Err(Error::NumericalFailure(_))));
    }

    #[test]
    fn rerun_starts_from_scratch() {
        let mut bundle = BundleMethod::new(shifted_quadratic, 1, 0.5, 1e-6);
        let first = bundle.optimize(Some(50)).unwrap();
        let second = bundle.optimize(Some(50)).unwrap();

        assert_eq!(first.iterations, second.iterations);
        assert_eq!(first.hyperplanes.len(), second.hyperplanes.len());
    }
}
