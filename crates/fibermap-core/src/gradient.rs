//! Smoothed image gradients.
//!
//! The image is Gaussian-filtered first to suppress pixel noise, then the
//! 3x3 Sobel operator is applied independently along each axis. Both passes
//! use edge replication at the borders.
//!
//! `gx` is the derivative along axis 0 (down the rows), `gy` along axis 1
//! (across the columns).

use crate::error::require_positive;
use crate::filter::{gaussian_blur, sobel, Axis};
use crate::{FibermapError, ScalarField};

#[derive(Clone, Debug)]
pub struct GradientField {
    pub gx: ScalarField,
    pub gy: ScalarField,
}

impl GradientField {
    pub fn compute(image: &ScalarField, filter_sigma: f64) -> Result<Self, FibermapError> {
        require_positive("filter_sigma", filter_sigma)?;
        image.ensure_valid_image()?;

        let smoothed = gaussian_blur(image, filter_sigma);
        let gx = sobel(&smoothed, Axis::Vertical);
        let gy = sobel(&smoothed, Axis::Horizontal);
        log::debug!(
            "gradients: {}x{} sigma={filter_sigma}",
            image.width(),
            image.height()
        );
        Ok(Self { gx, gy })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.gx.width()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.gx.height()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_matches_input() {
        let img = ScalarField::from_fn(13, 7, |r, c| ((r * c) % 5) as f64);
        let g = GradientField::compute(&img, 1.0).unwrap();
        assert_eq!(g.gx.shape(), img.shape());
        assert_eq!(g.gy.shape(), img.shape());
    }

    #[test]
    fn vertical_step_only_has_column_gradient() {
        let img = ScalarField::from_fn(32, 32, |_, c| if c < 16 { 0.0 } else { 1.0 });
        let g = GradientField::compute(&img, 1.5).unwrap();
        assert!(g.gx.as_slice().iter().all(|&v| v == 0.0));
        assert!(g.gy.get(10, 15) > 0.0);
        assert!(g.gy.get(10, 16) > 0.0);
    }

    #[test]
    fn rejects_bad_sigma_and_empty_image() {
        let img = ScalarField::zeros(4, 4);
        assert!(matches!(
            GradientField::compute(&img, 0.0),
            Err(FibermapError::InvalidParameter {
                name: "filter_sigma",
                ..
            })
        ));
        assert!(GradientField::compute(&img, f64::NAN).is_err());
        assert!(matches!(
            GradientField::compute(&ScalarField::zeros(0, 4), 1.0),
            Err(FibermapError::InvalidInput { .. })
        ));
    }
}
