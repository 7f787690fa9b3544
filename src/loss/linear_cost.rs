//! Costs `Δ(y) = ⟨g, y⟩ + b` that are linear in a binary output `y`.
use fixedbitset::FixedBitSet;
use serde::{Deserialize, Serialize};

use crate::common::utils;


/// A cost function `Δ(y) = ⟨g, y⟩ + b` over binary outputs `y`.
/// 
/// The Hamming distance to a binary ground truth `y'` is linear in `y`:
/// ```txt
/// Σ_i |y'_i - y_i| = Σ_i (1 - 2y'_i) y_i + Σ_i y'_i
/// ```
/// since `y'_i` and `y_i` are `0` or `1`.
/// [`LinearCost::hamming`] builds exactly these coefficients,
/// [`LinearCost::hamming_masked`] restricts the sum to a subset
/// of coordinates.
/// 
/// # Example
/// ```
/// use structsvm::LinearCost;
/// 
/// let ground_truth = [1f64, 0f64, 1f64, 0f64];
/// let cost = LinearCost::hamming(&ground_truth);
/// 
/// assert_eq!(cost.coefficients(), &[-1f64, 1f64, -1f64, 1f64]);
/// assert_eq!(cost.offset(), 2f64);
/// assert_eq!(cost.evaluate(&ground_truth), 0f64);
/// assert_eq!(cost.evaluate(&[0f64, 1f64, 0f64, 1f64]), 4f64);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinearCost {
    coefficients: Vec<f64>,
    offset: f64,
}


impl LinearCost {
    /// Constructs the cost `⟨coefficients, y⟩ + offset`.
    /// 
    /// Time complexity: `O(1)`.
    pub fn new(coefficients: Vec<f64>, offset: f64) -> Self {
        Self { coefficients, offset }
    }


    /// Constructs the Hamming distance to `ground_truth`.
    /// 
    /// Time complexity: `O(n)`.
    pub fn hamming(ground_truth: &[f64]) -> Self {
        let coefficients = ground_truth.iter()
            .map(|y| 1f64 - 2f64 * y)
            .collect::<Vec<_>>();
        let offset = ground_truth.iter().sum::<f64>();

        Self { coefficients, offset }
    }


    /// Constructs the Hamming distance to `ground_truth`
    /// counted over the coordinates in `mask` only.
    /// Coordinates outside of `mask` cost nothing.
    /// 
    /// Time complexity: `O(n)`.
    pub fn hamming_masked(ground_truth: &[f64], mask: &FixedBitSet) -> Self {
        let coefficients = ground_truth.iter()
            .enumerate()
            .map(|(i, y)| {
                if mask.contains(i) { 1f64 - 2f64 * y } else { 0f64 }
            })
            .collect::<Vec<_>>();
        let offset = ground_truth.iter()
            .enumerate()
            .filter(|(i, _)| mask.contains(*i))
            .map(|(_, y)| y)
            .sum::<f64>();

        Self { coefficients, offset }
    }


    /// Returns the coefficients `g`.
    #[inline(always)]
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients[..]
    }


    /// Returns the offset `b`.
    #[inline(always)]
    pub fn offset(&self) -> f64 {
        self.offset
    }


    /// Returns the number of output coordinates.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.coefficients.len()
    }


    /// Returns `true` if the cost has no coordinate.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }


    /// Evaluates `Δ(y) = ⟨g, y⟩ + b`.
    /// 
    /// Time complexity: `O(n)`.
    #[inline(always)]
    pub fn evaluate(&self, y: &[f64]) -> f64 {
        utils::inner_product(&self.coefficients[..], y) + self.offset
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn mask_of(bits: &[usize], len: usize) -> FixedBitSet {
        let mut mask = FixedBitSet::with_capacity(len);
        bits.iter().for_each(|&i| mask.insert(i));
        mask
    }

    #[test]
    fn test_masked_hamming() {
        let ground_truth = [1f64, 0f64, 1f64, 0f64];
        let mask = mask_of(&[0, 1, 2], 4);
        let cost = LinearCost::hamming_masked(&ground_truth, &mask);

        assert_eq!(cost.coefficients(), &[-1f64, 1f64, -1f64, 0f64]);
        assert_eq!(cost.offset(), 2f64);

        // The distance to the ground truth itself vanishes,
        // and the last coordinate is ignored.
        assert_eq!(cost.evaluate(&ground_truth), 0f64);
        assert_eq!(cost.evaluate(&[1f64, 0f64, 1f64, 1f64]), 0f64);
        assert_eq!(cost.evaluate(&[0f64, 1f64, 1f64, 0f64]), 2f64);
    }

    #[test]
    fn test_full_mask_is_hamming() {
        let ground_truth = [0f64, 1f64, 1f64];
        let mask = mask_of(&[0, 1, 2], 3);
        assert_eq!(
            LinearCost::hamming_masked(&ground_truth, &mask),
            LinearCost::hamming(&ground_truth),
        );
    }

    #[test]
    fn test_idempotent_construction() {
        let ground_truth = [1f64, 0f64, 1f64, 0f64];
        let mask = mask_of(&[0, 1, 2], 4);
        let c1 = LinearCost::hamming_masked(&ground_truth, &mask);
        let c2 = LinearCost::hamming_masked(&ground_truth, &mask);
        assert_eq!(c1, c2);
    }

    #[test]
    fn test_serde() {
        let cost = LinearCost::new(vec![0.5, -1f64], 3f64);
        let json = serde_json::to_string(&cost).unwrap();
        let back: LinearCost = serde_json::from_str(&json).unwrap();
        assert_eq!(cost, back);
    }
}
