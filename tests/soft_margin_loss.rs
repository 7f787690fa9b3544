use rand::prelude::*;
use fixedbitset::FixedBitSet;
use approx::assert_abs_diff_eq;

use structsvm::prelude::*;
use structsvm::Error;


fn choose_one(n_variables: usize) -> LinearConstraints {
    let constraint = (0..n_variables).fold(
        LinearConstraint::new(Relation::Equal, 1f64),
        |c, i| c.coefficient(i, 1f64),
    );
    LinearConstraints::from_iter([constraint])
}


fn random_features(n_features: usize, n_variables: usize, seed: u64)
    -> Vec<Vec<f64>>
{
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n_features)
        .map(|_| (0..n_variables).map(|_| rng.gen::<f64>()).collect())
        .collect()
}


fn energies(features: &[Vec<f64>], w: &[f64]) -> Vec<f64> {
    let n_variables = features[0].len();
    (0..n_variables)
        .map(|j| features.iter().zip(w).map(|(row, wi)| row[j] * wi).sum())
        .collect()
}


/// Tests for `SoftMarginLoss`.
#[cfg(test)]
pub mod soft_margin_loss_tests {
    use super::*;

    #[test]
    fn choose_one_of_ten() {
        let n_variables = 10;
        let n_features = 12;
        let mut ground_truth = vec![0f64; n_variables];
        ground_truth[0] = 1f64;

        for seed in 0..5 {
            let features = random_features(n_features, n_variables, seed);
            let loss = SoftMarginLoss::builder(features.clone(), ground_truth.clone())
                .constraints(choose_one(n_variables))
                .build()
                .unwrap();

            let mut bundle = BundleMethod::new(loss, n_features, 0.1, 1e-6);
            let outcome = bundle.optimize(Some(1000)).unwrap();
            assert_eq!(
                outcome.termination, Termination::Converged,
                "seed {seed}: gap = {}", outcome.gap
            );

            let costs = energies(&features, &outcome.weights);
            for i in 1..n_variables {
                assert!(
                    costs[i] > costs[0],
                    "seed {seed}: cost[{i}] = {} ≤ {}", costs[i], costs[0]
                );
            }
        }
    }

    #[test]
    fn loss_is_nonnegative_under_feasible_ground_truth() {
        let n_variables = 6;
        let features = random_features(4, n_variables, 99);
        let mut ground_truth = vec![0f64; n_variables];
        ground_truth[2] = 1f64;

        let mut loss = SoftMarginLoss::builder(features, ground_truth)
            .constraints(choose_one(n_variables))
            .build()
            .unwrap();

        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..10 {
            let w = (0..4).map(|_| rng.gen_range(-3f64..3f64)).collect::<Vec<_>>();
            let (value, gradient) = loss.value_and_gradient(&w).unwrap();
            assert!(value >= -1e-9);
            assert_eq!(gradient.len(), 4);
        }
    }

    #[test]
    fn masked_costs_ignore_coordinates() {
        // Only y[0] is counted, so w = 0 gives a loss of 1.
        let features = vec![vec![1f64, 1f64, 1f64]];
        let mut mask = FixedBitSet::with_capacity(3);
        mask.insert(0);

        let mut loss = SoftMarginLoss::builder(features, vec![1f64, 0f64, 0f64])
            .mask(mask)
            .build()
            .unwrap();
        let (value, _) = loss.value_and_gradient(&[0f64]).unwrap();

        assert_abs_diff_eq!(value, 1f64, epsilon = 1e-6);
        assert_eq!(loss.costs().coefficients(), &[-1f64, 0f64, 0f64]);
    }

    #[test]
    fn custom_costs() {
        let features = vec![vec![0f64, 0f64]];
        let costs = LinearCost::new(vec![5f64, 1f64], 0f64);

        let mut loss = SoftMarginLoss::builder(features, vec![0f64, 0f64])
            .costs(costs)
            .build()
            .unwrap();
        let (value, _) = loss.value_and_gradient(&[0f64]).unwrap();

        assert_abs_diff_eq!(value, 6f64, epsilon = 1e-6);
    }

    #[test]
    fn infeasible_inference_aborts_optimization() {
        let constraints = LinearConstraints::from_iter([
            LinearConstraint::new(Relation::GreaterEqual, 2f64)
                .coefficient(0, 1f64),
        ]);
        let loss = SoftMarginLoss::builder(vec![vec![1f64, 0f64]], vec![1f64, 0f64])
            .constraints(constraints)
            .build()
            .unwrap();

        let mut bundle = BundleMethod::init(loss, 1);
        let result = bundle.optimize(Some(10));
        assert!(matches!(result, Err(Error::OracleInfeasible)));
    }
}
