use crate::error::require_positive;
use crate::FibermapError;
use serde::{Deserialize, Serialize};

/// Configuration of the orientation/coherence pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrientationParams {
    /// Gaussian sigma applied to the image before differentiation (pixels).
    pub filter_sigma: f64,
    /// Gaussian sigma of the tensor averaging window (pixels).
    pub local_window_size: f64,
    /// Lower bound of the normalized coherence map, in `(0, 1)`.
    pub min_coherence: f64,
    /// Lower bound of the normalized orientation map, in `(0, 180)` degrees.
    pub min_orientation: f64,
    /// Shift normalized orientations above 90° down by 90°.
    ///
    /// Display convenience only; off by default.
    pub fold_orientation: bool,
}

impl Default for OrientationParams {
    fn default() -> Self {
        Self {
            filter_sigma: 2.0,
            local_window_size: 10.0,
            min_coherence: 1e-4,
            min_orientation: 1e-4,
            fold_orientation: false,
        }
    }
}

impl OrientationParams {
    pub fn validate(&self) -> Result<(), FibermapError> {
        require_positive("filter_sigma", self.filter_sigma)?;
        require_positive("local_window_size", self.local_window_size)?;
        if !(self.min_coherence > 0.0 && self.min_coherence < 1.0) {
            return Err(FibermapError::parameter(
                "min_coherence",
                self.min_coherence,
                "must be in (0, 1)",
            ));
        }
        if !(self.min_orientation > 0.0 && self.min_orientation < 180.0) {
            return Err(FibermapError::parameter(
                "min_orientation",
                self.min_orientation,
                "must be in (0, 180)",
            ));
        }
        Ok(())
    }
}
