//! Closed-form eigendecomposition of symmetric 2x2 matrices.
//!
//! For `[[a, b], [b, d]]` the eigenvalues are
//! `(a + d) / 2 ± hypot((a - d) / 2, b)` and the dominant eigenvector lies at
//! the half angle `θ = atan2(2b, a - d) / 2`. Building both eigenvectors from
//! `θ` makes them orthonormal by construction and keeps the ascending order
//! without any sorting.

use crate::{ScalarField, StructureTensorField};
use nalgebra::{Matrix2, Vector2};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Eigenvalues in ascending order with their unit eigenvectors.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EigenPair {
    pub lambda_min: f64,
    pub lambda_max: f64,
    pub v_min: Vector2<f64>,
    pub v_max: Vector2<f64>,
}

impl EigenPair {
    /// `[λ_min, λ_max]`.
    pub fn eigenvalues(&self) -> Vector2<f64> {
        Vector2::new(self.lambda_min, self.lambda_max)
    }

    /// Column `i` is the eigenvector of eigenvalue `i`.
    pub fn eigenvectors(&self) -> Matrix2<f64> {
        Matrix2::from_columns(&[self.v_min, self.v_max])
    }
}

/// Decompose `[[a, b], [b, d]]`.
///
/// A zero matrix yields `(0, 0)` with the identity basis.
#[inline]
pub fn solve_symmetric_2x2(a: f64, b: f64, d: f64) -> EigenPair {
    let mean = 0.5 * (a + d);
    let radius = (0.5 * (a - d)).hypot(b);
    let theta = 0.5 * (2.0 * b).atan2(a - d);
    let (s, c) = theta.sin_cos();
    EigenPair {
        lambda_min: mean - radius,
        lambda_max: mean + radius,
        v_min: Vector2::new(-s, c),
        v_max: Vector2::new(c, s),
    }
}

/// Per-pixel eigen pairs of a structure tensor field.
#[derive(Clone, Debug)]
pub struct EigenField {
    width: usize,
    height: usize,
    pairs: Vec<EigenPair>,
}

impl EigenField {
    /// Decompose every pixel of `tensor`.
    ///
    /// The tensor is PSD by construction, so rounding residue below zero is
    /// clamped away.
    pub fn solve(tensor: &StructureTensorField) -> Self {
        let (w, h) = (tensor.width(), tensor.height());
        let zero = solve_symmetric_2x2(0.0, 0.0, 0.0);
        let mut pairs = vec![zero; w * h];

        let fill_row = |row: usize, out: &mut [EigenPair]| {
            let (jxx, jxy, jyy) = (
                tensor.jxx.row(row),
                tensor.jxy.row(row),
                tensor.jyy.row(row),
            );
            for (i, p) in out.iter_mut().enumerate() {
                let mut e = solve_symmetric_2x2(jxx[i], jxy[i], jyy[i]);
                e.lambda_min = e.lambda_min.max(0.0);
                e.lambda_max = e.lambda_max.max(0.0);
                *p = e;
            }
        };

        if w > 0 {
            #[cfg(feature = "rayon")]
            pairs
                .par_chunks_mut(w)
                .enumerate()
                .for_each(|(row, out)| fill_row(row, out));
            #[cfg(not(feature = "rayon"))]
            pairs
                .chunks_mut(w)
                .enumerate()
                .for_each(|(row, out)| fill_row(row, out));
        }

        Self {
            width: w,
            height: h,
            pairs,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn pair(&self, row: usize, col: usize) -> &EigenPair {
        &self.pairs[row * self.width + col]
    }

    pub fn pairs(&self) -> &[EigenPair] {
        &self.pairs
    }

    /// Project one scalar out of every pair.
    pub fn map(&self, f: impl Fn(&EigenPair) -> f64 + Sync) -> ScalarField {
        ScalarField::from_rows(self.width, self.height, |row, out| {
            let src = &self.pairs[row * self.width..(row + 1) * self.width];
            for (o, p) in out.iter_mut().zip(src) {
                *o = f(p);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::SymmetricEigen;

    fn assert_decomposes(a: f64, b: f64, d: f64) {
        let e = solve_symmetric_2x2(a, b, d);
        let m = Matrix2::new(a, b, b, d);
        assert!(e.lambda_min <= e.lambda_max);

        // Orthonormal columns.
        let v = e.eigenvectors();
        assert_relative_eq!(v.transpose() * v, Matrix2::identity(), epsilon = 1e-12);

        // M v = λ v for both columns.
        let scale = m.abs().max().max(1.0);
        assert_relative_eq!(m * e.v_min, e.v_min * e.lambda_min, epsilon = 1e-10 * scale);
        assert_relative_eq!(m * e.v_max, e.v_max * e.lambda_max, epsilon = 1e-10 * scale);

        // Same spectrum as the generic symmetric solver.
        let reference = SymmetricEigen::new(m);
        let mut ev = [reference.eigenvalues[0], reference.eigenvalues[1]];
        ev.sort_by(|x, y| x.partial_cmp(y).unwrap());
        assert_relative_eq!(e.lambda_min, ev[0], epsilon = 1e-10 * scale);
        assert_relative_eq!(e.lambda_max, ev[1], epsilon = 1e-10 * scale);
    }

    #[test]
    fn matches_generic_symmetric_solver() {
        for &(a, b, d) in &[
            (2.0, 0.0, 1.0),
            (1.0, 0.0, 2.0),
            (3.0, 1.0, 3.0),
            (5.0, -2.0, 1.0),
            (1e-3, 4e-4, 7e-4),
            (1e6, 1e6, 1e6),
            (0.0, 1.0, 0.0),
        ] {
            assert_decomposes(a, b, d);
        }
    }

    #[test]
    fn zero_tensor_has_identity_basis() {
        let e = solve_symmetric_2x2(0.0, 0.0, 0.0);
        assert_eq!(e.eigenvalues(), Vector2::zeros());
        assert_eq!(e.eigenvectors(), Matrix2::identity());
    }

    #[test]
    fn dominant_vector_follows_axis_energy() {
        let e = solve_symmetric_2x2(4.0, 0.0, 1.0);
        assert_relative_eq!(e.v_max, Vector2::new(1.0, 0.0));
        assert_relative_eq!(e.lambda_max, 4.0);
        assert_relative_eq!(e.lambda_min, 1.0);

        let e = solve_symmetric_2x2(1.0, 0.0, 4.0);
        assert_relative_eq!(e.v_max.x.abs(), 0.0, epsilon = 1e-15);
        assert_relative_eq!(e.v_max.y.abs(), 1.0);
    }
}
