//! Coherence, orientation and orientation-vector maps.
//!
//! Per pixel, from the eigen pairs `λ_min ≤ λ_max` and the tensor `J`:
//!
//! - vector field: unit eigenvector of `λ_max`, i.e. the dominant gradient
//!   direction. Fibers run perpendicular to it, see
//!   [`OrientationVectorField::fiber_directions`].
//! - raw coherence: `|(λ_min/tr − λ_max/tr) / (λ_min/tr + λ_max/tr)|` with
//!   `tr = Jxx + Jyy`, and 0 where `tr = 0`.
//! - raw orientation: `½·phase(Jyy − Jxx, 2·Jxy)` in degrees, where `phase`
//!   is the four-quadrant angle in `[0°, 360°)`. The result lives in
//!   `[0°, 180°)`; directions are identified modulo 180°.
//!
//! Both scalar maps are then stretched with a single image-wide min–max
//! rescale to `[min, upper]`.

use crate::{EigenField, EigenPair, OrientationParams, ScalarField, StructureTensorField};
use log::debug;
use serde::{Deserialize, Serialize};

/// Upper bound of the normalized coherence map.
pub const COHERENCE_UPPER: f64 = 1.0;
/// Upper bound of the normalized orientation map, in degrees.
pub const ORIENTATION_UPPER_DEG: f64 = 180.0;

/// Unit vectors `(vx, vy)` per pixel; `vx` along axis 0, `vy` along axis 1.
#[derive(Clone, Debug)]
pub struct OrientationVectorField {
    pub vx: ScalarField,
    pub vy: ScalarField,
}

/// One glyph anchor of a subsampled vector field.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct VectorSample {
    pub row: usize,
    pub col: usize,
    pub vx: f64,
    pub vy: f64,
}

impl OrientationVectorField {
    /// Dominant eigenvector of every pixel.
    pub fn from_eigen(eigen: &EigenField) -> Self {
        Self {
            vx: eigen.map(|p| p.v_max.x),
            vy: eigen.map(|p| p.v_max.y),
        }
    }

    /// The same field rotated by 90°: unit vectors along the fibers.
    pub fn fiber_directions(&self) -> Self {
        Self {
            vx: self.vy.map(|v| -v),
            vy: self.vx.clone(),
        }
    }

    /// Vectors on a regular lattice starting at `spacing / 2`.
    pub fn subsample(&self, spacing: usize) -> Vec<VectorSample> {
        let step = spacing.max(1);
        let start = step / 2;
        let mut out = Vec::new();
        for row in (start..self.vx.height()).step_by(step) {
            for col in (start..self.vx.width()).step_by(step) {
                out.push(VectorSample {
                    row,
                    col,
                    vx: self.vx.get(row, col),
                    vy: self.vy.get(row, col),
                });
            }
        }
        out
    }
}

/// Trace-normalized eigenvalue contrast of one pixel.
#[inline]
pub fn coherence_from_eigen(pair: &EigenPair, trace: f64) -> f64 {
    if trace <= 0.0 || !trace.is_finite() {
        return 0.0;
    }
    let small = pair.lambda_min / trace;
    let large = pair.lambda_max / trace;
    let sum = small + large;
    if sum > 0.0 {
        ((small - large) / sum).abs()
    } else {
        0.0
    }
}

/// Four-quadrant angle of `(x, y)` in degrees, folded into `[0, 360)`.
#[inline]
pub fn phase_deg(x: f64, y: f64) -> f64 {
    let mut a = y.atan2(x).to_degrees();
    if a < 0.0 {
        a += 360.0;
    }
    if a >= 360.0 {
        a -= 360.0;
    }
    a
}

/// Orientation of one tensor in degrees, in `[0, 180)`.
#[inline]
pub fn orientation_from_tensor(jxx: f64, jyy: f64, jxy: f64) -> f64 {
    0.5 * phase_deg(jyy - jxx, 2.0 * jxy)
}

pub fn raw_coherence(eigen: &EigenField, tensor: &StructureTensorField) -> ScalarField {
    let w = eigen.width();
    ScalarField::from_rows(w, eigen.height(), |row, out| {
        let pairs = &eigen.pairs()[row * w..(row + 1) * w];
        let (jxx, jyy) = (tensor.jxx.row(row), tensor.jyy.row(row));
        for (i, o) in out.iter_mut().enumerate() {
            *o = coherence_from_eigen(&pairs[i], jxx[i] + jyy[i]);
        }
    })
}

pub fn raw_orientation(tensor: &StructureTensorField) -> ScalarField {
    ScalarField::from_rows(tensor.width(), tensor.height(), |row, out| {
        let (jxx, jyy, jxy) = (
            tensor.jxx.row(row),
            tensor.jyy.row(row),
            tensor.jxy.row(row),
        );
        for (i, o) in out.iter_mut().enumerate() {
            *o = orientation_from_tensor(jxx[i], jyy[i], jxy[i]);
        }
    })
}

/// Linear min–max stretch of the whole field onto `[alpha, beta]`.
///
/// A constant field (span within `f64::EPSILON`) maps to the lower bound
/// everywhere.
pub fn normalize_min_max(field: &ScalarField, alpha: f64, beta: f64) -> ScalarField {
    let (lo_out, hi_out) = (alpha.min(beta), alpha.max(beta));
    let Some((lo, hi)) = field.min_max() else {
        return field.clone();
    };
    let span = hi - lo;
    if span <= f64::EPSILON {
        debug!("min-max normalization: constant field ({lo}), filling with {lo_out}");
        return ScalarField::filled(field.width(), field.height(), lo_out);
    }
    let scale = (hi_out - lo_out) / span;
    let shift = lo_out - lo * scale;
    field.map(|v| (v * scale + shift).clamp(lo_out, hi_out))
}

/// Visualization fold: orientations above 90° are shifted down by 90°.
pub fn fold_orientation(field: &ScalarField) -> ScalarField {
    field.map(|v| if v > 90.0 { v - 90.0 } else { v })
}

/// Maps produced by [`CoherenceOrientationExtractor::extract`].
#[derive(Clone, Debug)]
pub struct CoherenceOrientationMaps {
    /// Normalized to `[min_coherence, 1]`.
    pub coherence: ScalarField,
    /// Normalized to `[min_orientation, 180]` (optionally folded).
    pub orientation: ScalarField,
    pub vector_field: OrientationVectorField,
    pub raw_coherence: ScalarField,
    pub raw_orientation: ScalarField,
}

/// Derives the per-pixel scalar maps from an eigen-decomposed tensor field.
#[derive(Clone, Debug)]
pub struct CoherenceOrientationExtractor {
    min_coherence: f64,
    min_orientation: f64,
    fold_orientation: bool,
}

impl CoherenceOrientationExtractor {
    pub fn new(params: &OrientationParams) -> Self {
        Self {
            min_coherence: params.min_coherence,
            min_orientation: params.min_orientation,
            fold_orientation: params.fold_orientation,
        }
    }

    pub fn extract(
        &self,
        eigen: &EigenField,
        tensor: &StructureTensorField,
    ) -> CoherenceOrientationMaps {
        let vector_field = OrientationVectorField::from_eigen(eigen);
        let raw_coherence = raw_coherence(eigen, tensor);
        let raw_orientation = raw_orientation(tensor);

        let coherence = normalize_min_max(&raw_coherence, self.min_coherence, COHERENCE_UPPER);
        let mut orientation =
            normalize_min_max(&raw_orientation, self.min_orientation, ORIENTATION_UPPER_DEG);
        if self.fold_orientation {
            orientation = fold_orientation(&orientation);
        }

        CoherenceOrientationMaps {
            coherence,
            orientation,
            vector_field,
            raw_coherence,
            raw_orientation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solve_symmetric_2x2;
    use approx::assert_relative_eq;

    #[test]
    fn coherence_bounds() {
        // Isotropic.
        let p = solve_symmetric_2x2(2.0, 0.0, 2.0);
        assert_relative_eq!(coherence_from_eigen(&p, 4.0), 0.0);
        // Rank one.
        let p = solve_symmetric_2x2(3.0, 0.0, 0.0);
        assert_relative_eq!(coherence_from_eigen(&p, 3.0), 1.0);
        // No energy.
        let p = solve_symmetric_2x2(0.0, 0.0, 0.0);
        assert_eq!(coherence_from_eigen(&p, 0.0), 0.0);
        // Mixed: (λmax - λmin) / (λmax + λmin).
        let p = solve_symmetric_2x2(3.0, 0.0, 1.0);
        assert_relative_eq!(coherence_from_eigen(&p, 4.0), 0.5);
    }

    #[test]
    fn orientation_of_axis_aligned_gradients() {
        // Gradient along the columns (axis 1): 0°.
        assert_relative_eq!(orientation_from_tensor(0.0, 1.0, 0.0), 0.0);
        // Gradient down the rows (axis 0): 90°.
        assert_relative_eq!(orientation_from_tensor(1.0, 0.0, 0.0), 90.0);
        // Diagonal.
        assert_relative_eq!(orientation_from_tensor(0.5, 0.5, 0.5), 45.0);
        assert_relative_eq!(orientation_from_tensor(0.5, 0.5, -0.5), 135.0);
    }

    #[test]
    fn phase_stays_in_half_open_range() {
        assert_eq!(phase_deg(1.0, 0.0), 0.0);
        assert_relative_eq!(phase_deg(-1.0, -0.0), 180.0);
        assert_relative_eq!(phase_deg(0.0, -1.0), 270.0);
        let tiny = phase_deg(1.0, -1e-300);
        assert!((0.0..360.0).contains(&tiny));
    }

    #[test]
    fn min_max_rescale() {
        let f = ScalarField::new(4, 1, vec![0.0, 0.25, 0.5, 1.0]).unwrap();
        let n = normalize_min_max(&f, 0.2, 1.0);
        assert_relative_eq!(n.get(0, 0), 0.2);
        assert_relative_eq!(n.get(0, 1), 0.4);
        assert_relative_eq!(n.get(0, 3), 1.0);
    }

    #[test]
    fn constant_field_maps_to_lower_bound() {
        let f = ScalarField::filled(3, 3, 0.7);
        let n = normalize_min_max(&f, 1e-4, 1.0);
        assert!(n.as_slice().iter().all(|&v| v == 1e-4));
    }

    #[test]
    fn fold_only_touches_upper_half() {
        let f = ScalarField::new(3, 1, vec![10.0, 90.0, 150.0]).unwrap();
        assert_eq!(fold_orientation(&f).as_slice(), &[10.0, 90.0, 60.0]);
    }

    #[test]
    fn fiber_directions_are_perpendicular() {
        let vf = OrientationVectorField {
            vx: ScalarField::filled(2, 2, 0.6),
            vy: ScalarField::filled(2, 2, 0.8),
        };
        let fib = vf.fiber_directions();
        let dot = vf.vx.get(1, 1) * fib.vx.get(1, 1) + vf.vy.get(1, 1) * fib.vy.get(1, 1);
        assert_relative_eq!(dot, 0.0);
    }

    #[test]
    fn subsample_starts_at_half_spacing() {
        let vf = OrientationVectorField {
            vx: ScalarField::from_fn(10, 7, |r, _| r as f64),
            vy: ScalarField::from_fn(10, 7, |_, c| c as f64),
        };
        let s = vf.subsample(4);
        let anchors: Vec<(usize, usize)> = s.iter().map(|v| (v.row, v.col)).collect();
        assert_eq!(anchors, vec![(2, 2), (2, 6), (6, 2), (6, 6)]);
        assert_eq!(s[1].vy, 6.0);
        assert_eq!(s[2].vx, 6.0);
    }
}
