//! L2 normalization for embedding vectors.
//!
//! Every vector stored in or produced by the system is unit-normalized, so
//! the dot product of a query against index rows is cosine similarity.

use ndarray::{Array1, Array2};

/// Norm floor used when normalizing, guarding division by zero for a
/// degenerate all-zero vector.
pub const NORM_EPSILON: f32 = 1e-8;

/// Normalizes a vector to unit Euclidean length in place.
///
/// A zero vector stays zero (the norm is clamped to [`NORM_EPSILON`]).
pub fn normalize(vector: &mut Array1<f32>) {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    *vector /= norm.max(NORM_EPSILON);
}

/// Normalizes each row of a matrix to unit length independently.
pub fn normalize_rows(matrix: &mut Array2<f32>) {
    for mut row in matrix.rows_mut() {
        let norm = row.iter().map(|v| v * v).sum::<f32>().sqrt();
        row /= norm.max(NORM_EPSILON);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn norm_of(v: &Array1<f32>) -> f32 {
        v.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    #[test]
    fn normalize_produces_unit_norm() {
        let mut v = array![3.0_f32, 4.0];
        normalize(&mut v);
        assert!((norm_of(&v) - 1.0).abs() < 1e-6);
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn zero_vector_stays_zero() {
        let mut v = array![0.0_f32, 0.0, 0.0];
        normalize(&mut v);
        assert!(v.iter().all(|x| *x == 0.0));
        assert!(v.iter().all(|x| x.is_finite()));
    }

    #[test]
    fn rows_are_normalized_independently() {
        let mut m = array![[2.0_f32, 0.0], [0.0, 5.0], [1.0, 1.0]];
        normalize_rows(&mut m);

        for row in m.rows() {
            let norm = row.iter().map(|x| x * x).sum::<f32>().sqrt();
            assert!((norm - 1.0).abs() < 1e-6);
        }
        assert!((m[[2, 0]] - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
    }

    #[test]
    fn normalizing_a_zero_row_does_not_poison_others() {
        let mut m = array![[0.0_f32, 0.0], [3.0, 4.0]];
        normalize_rows(&mut m);

        assert!(m.row(0).iter().all(|x| *x == 0.0));
        let norm = m.row(1).iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-6);
    }
}
