//! This file defines some functions that checks some pre-conditions
//! E.g., the sign of the regularization parameter.


/// Check whether the regularizer weight `λ` is valid or not.
#[inline(always)]
pub(crate) fn regularizer(lambda: f64) {
    assert!(
        lambda.is_finite() && lambda >= 0f64,
        "regularizer weight must be finite and non-negative. got {lambda}."
    );
}


/// Check whether the convergence threshold `ε` is valid or not.
#[inline(always)]
pub(crate) fn tolerance(eps: f64) {
    assert!(
        eps > 0f64,
        "convergence threshold must be positive. got {eps}."
    );
}


/// Check whether the number of variables is valid or not.
#[inline(always)]
pub(crate) fn dimension(dims: usize) {
    assert!(dims > 0, "the weight vector must have at least one entry.");
}


/// Returns `true` if every entry of `vector` is either `0` or `1`.
#[inline(always)]
pub(crate) fn is_binary(vector: &[f64]) -> bool {
    vector.iter()
        .all(|&v| v == 0f64 || v == 1f64)
}


#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_regularizer_success_01() {
        regularizer(0f64);
    }

    #[test]
    fn test_regularizer_success_02() {
        regularizer(1e-4);
    }

    #[test]
    #[should_panic]
    fn test_regularizer_failure_01() {
        regularizer(-0.0001);
    }

    #[test]
    #[should_panic]
    fn test_regularizer_failure_02() {
        regularizer(f64::NAN);
    }

    #[test]
    fn test_tolerance_success_01() {
        tolerance(1e-6);
    }

    #[test]
    #[should_panic]
    fn test_tolerance_failure_01() {
        tolerance(0f64);
    }

    #[test]
    #[should_panic]
    fn test_dimension_failure_01() {
        dimension(0);
    }

    #[test]
    fn test_is_binary() {
        assert!(is_binary(&[0f64, 1f64, 1f64]));
        assert!(!is_binary(&[0f64, 0.5, 1f64]));
        assert!(is_binary(&[]));
    }
}
