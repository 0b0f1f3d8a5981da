//! Locally averaged 2x2 structure tensor.
//!
//! ```text
//!     J = G_w * | gx*gx  gx*gy |
//!               | gx*gy  gy*gy |
//! ```
//!
//! `G_w` is a Gaussian of standard deviation `local_window_size`. The same
//! kernel and the same edge-replicate boundaries are used for all three
//! products, which keeps every pixel's tensor positive semi-definite.

use crate::error::require_positive;
use crate::filter::{correlate_separable, gaussian_kernel, DEFAULT_TRUNCATE};
use crate::{FibermapError, GradientField, ScalarField};
use nalgebra::Matrix2;

#[derive(Clone, Debug)]
pub struct StructureTensorField {
    pub jxx: ScalarField,
    pub jyy: ScalarField,
    pub jxy: ScalarField,
}

impl StructureTensorField {
    pub fn compute(
        gradients: &GradientField,
        local_window_size: f64,
    ) -> Result<Self, FibermapError> {
        require_positive("local_window_size", local_window_size)?;
        let GradientField { gx, gy } = gradients;
        if !gx.same_shape(gy) {
            return Err(FibermapError::input(format!(
                "gradient shapes differ: {:?} vs {:?}",
                gx.shape(),
                gy.shape()
            )));
        }

        let window = gaussian_kernel(local_window_size, DEFAULT_TRUNCATE);
        let average = |f: &ScalarField| correlate_separable(f, &window, &window);

        let jxx = average(&gx.map(|v| v * v));
        let jyy = average(&gy.map(|v| v * v));
        let jxy = average(&gx.zip_map(gy, |a, b| a * b));
        log::debug!(
            "structure tensor: window sigma={local_window_size}, {} taps",
            window.len()
        );

        Ok(Self { jxx, jyy, jxy })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.jxx.width()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.jxx.height()
    }

    /// Symmetric tensor at one pixel.
    pub fn tensor_at(&self, row: usize, col: usize) -> Matrix2<f64> {
        let xy = self.jxy.get(row, col);
        Matrix2::new(self.jxx.get(row, col), xy, xy, self.jyy.get(row, col))
    }

    /// Total local gradient energy, `trace(J) = Jxx + Jyy`.
    pub fn energy(&self) -> ScalarField {
        self.jxx.zip_map(&self.jyy, |a, b| a + b)
    }
}
