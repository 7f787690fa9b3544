//! This file provides some common functions
//! such as inner products and matrix-vector products.
use rayon::prelude::*;


/// Returns the inner product of two vectors of the same length.
/// 
/// Time complexity: `O(n)`.
#[inline(always)]
pub fn inner_product(v1: &[f64], v2: &[f64]) -> f64 {
    v1.iter()
        .zip(v2)
        .map(|(a, b)| a * b)
        .sum::<f64>()
}


/// Returns the squared Euclidean norm `‖v‖²`.
/// 
/// Time complexity: `O(n)`.
#[inline(always)]
pub fn squared_norm(v: &[f64]) -> f64 {
    inner_product(v, v)
}


/// Returns the product `φ y` of a row-major matrix `φ`
/// (one row per feature) with a vector `y` over the columns.
/// 
/// Time complexity: `O(d * n)`, where
/// - `d` is the number of rows and
/// - `n` is the number of columns.
#[inline(always)]
pub fn matrix_vector(rows: &[Vec<f64>], y: &[f64]) -> Vec<f64> {
    rows.par_iter()
        .map(|row| inner_product(&row[..], y))
        .collect()
}


/// Returns the product `w φ` of a vector `w` over the rows
/// with a row-major matrix `φ`, i.e., one entry per column.
/// 
/// Time complexity: `O(d * n)`.
#[inline(always)]
pub fn vector_matrix(w: &[f64], rows: &[Vec<f64>], n_cols: usize)
    -> Vec<f64>
{
    (0..n_cols).into_par_iter()
        .map(|j| {
            rows.iter()
                .zip(w)
                .map(|(row, wi)| wi * row[j])
                .sum::<f64>()
        })
        .collect()
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_products() {
        let rows = vec![
            vec![1f64, 2f64, 3f64],
            vec![4f64, 5f64, 6f64],
        ];
        assert_eq!(matrix_vector(&rows, &[1f64, 0f64, 1f64]), vec![4f64, 10f64]);
        assert_eq!(
            vector_matrix(&[1f64, -1f64], &rows, 3),
            vec![-3f64, -3f64, -3f64]
        );
        assert_eq!(squared_norm(&[3f64, 4f64]), 25f64);
    }
}
