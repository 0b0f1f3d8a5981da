//! End-to-end orientation/coherence analysis.
//!
//! image -> gradients -> structure tensor -> eigen pairs -> maps.

use crate::coherence::{CoherenceOrientationExtractor, CoherenceOrientationMaps};
use crate::{
    EigenField, FibermapError, GradientField, OrientationParams, OrientationVectorField,
    ScalarField, StructureTensorField,
};
use log::debug;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Output of one analysis run. Every map has the input's shape.
#[derive(Clone, Debug)]
pub struct OrientationAnalysis {
    /// Coherence in `[min_coherence, 1]`.
    pub coherence: ScalarField,
    /// Orientation in degrees, `[min_orientation, 180]`.
    pub orientation: ScalarField,
    /// Dominant-eigenvector field (perpendicular to the fibers).
    pub vector_field: OrientationVectorField,
    /// Coherence before the global rescale, in `[0, 1]`.
    pub raw_coherence: ScalarField,
    /// Orientation before the global rescale, in `[0, 180)` degrees.
    pub raw_orientation: ScalarField,
    /// Tensor trace `Jxx + Jyy` in the input's intensity units. Saturates to
    /// `+inf` where the true value exceeds the `f64` range.
    pub energy: ScalarField,
}

impl OrientationAnalysis {
    fn assemble(maps: CoherenceOrientationMaps, energy: ScalarField) -> Self {
        let CoherenceOrientationMaps {
            coherence,
            orientation,
            vector_field,
            raw_coherence,
            raw_orientation,
        } = maps;
        Self {
            coherence,
            orientation,
            vector_field,
            raw_coherence,
            raw_orientation,
            energy,
        }
    }
}

/// Stateless analyzer holding one parameter set.
///
/// Cheap to clone; any number of analyzers with different parameters can
/// run side by side.
#[derive(Clone, Debug, Default)]
pub struct OrientationAnalyzer {
    params: OrientationParams,
}

impl OrientationAnalyzer {
    /// Validates `params` up front.
    pub fn new(params: OrientationParams) -> Result<Self, FibermapError> {
        params.validate()?;
        Ok(Self { params })
    }

    #[inline]
    pub fn params(&self) -> &OrientationParams {
        &self.params
    }

    pub fn analyze(&self, image: &ScalarField) -> Result<OrientationAnalysis, FibermapError> {
        compute_orientation_coherence(image, &self.params)
    }
}

/// Power-of-two factor that brings the peak magnitude of `image` into
/// `[1, 2)`.
///
/// Squared gradients of very large or very small samples leave the `f64`
/// range. Multiplying by a power of two is exact, and coherence and
/// orientation are invariant to intensity scale, so the stages run on the
/// rescaled image without changing those maps.
fn magnitude_scale(image: &ScalarField) -> f64 {
    let peak = image.as_slice().iter().fold(0.0f64, |m, v| m.max(v.abs()));
    if peak == 0.0 {
        return 1.0;
    }
    let exponent = (peak.log2().floor() as i32).clamp(-1022, 1022);
    2f64.powi(-exponent)
}

/// Run the full pipeline on `image`.
///
/// Fails before any computation on an empty or non-finite image and on
/// out-of-range parameters. Any finite intensity range is accepted.
#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "info",
        skip(image, params),
        fields(width = image.width(), height = image.height())
    )
)]
pub fn compute_orientation_coherence(
    image: &ScalarField,
    params: &OrientationParams,
) -> Result<OrientationAnalysis, FibermapError> {
    params.validate()?;
    image.ensure_valid_image()?;

    let scale = magnitude_scale(image);
    let rescaled;
    let input = if scale == 1.0 {
        image
    } else {
        rescaled = image.map(|v| v * scale);
        &rescaled
    };

    let gradients = GradientField::compute(input, params.filter_sigma)?;
    let tensor = StructureTensorField::compute(&gradients, params.local_window_size)?;
    drop(gradients);
    let eigen = EigenField::solve(&tensor);
    let maps = CoherenceOrientationExtractor::new(params).extract(&eigen, &tensor);

    debug!(
        "analysis done: {}x{}, sigma={}, window={}, intensity scale={scale:e}",
        image.width(),
        image.height(),
        params.filter_sigma,
        params.local_window_size
    );
    let energy = tensor.energy().map(|e| e / scale / scale);
    Ok(OrientationAnalysis::assemble(maps, energy))
}
