//! Structure-tensor orientation and coherence maps for 2D grayscale
//! micrographs.
//!
//! The pipeline is a chain of pure whole-field stages:
//!
//! 1. [`GradientField`]: Gaussian pre-smoothing followed by Sobel derivatives.
//! 2. [`StructureTensorField`]: gradient outer products averaged with a
//!    Gaussian window.
//! 3. [`EigenField`]: closed-form symmetric 2x2 eigendecomposition per pixel.
//! 4. [`CoherenceOrientationExtractor`]: coherence, orientation and the
//!    dominant-direction vector field, globally rescaled.
//!
//! [`density_heatmap`] is a side branch used for display context only.
//!
//! This crate does not read image files; see the `fibermap` facade for that.
//!
//! ## Conventions
//!
//! Fields are indexed `(row, col)`. `gx`/`Jxx`/`vx` refer to axis 0 (down
//! the rows) and `gy`/`Jyy`/`vy` to axis 1 (across the columns). Orientation
//! angles are measured from the column axis toward the row axis, in degrees,
//! and are identified modulo 180°.
//!
//! ```
//! use fibermap_core::{compute_orientation_coherence, OrientationParams, ScalarField};
//!
//! let img = ScalarField::from_fn(64, 64, |_, c| if c < 32 { 0.0 } else { 1.0 });
//! let out = compute_orientation_coherence(&img, &OrientationParams::default()).unwrap();
//! assert_eq!(out.coherence.shape(), (64, 64));
//! ```

mod coherence;
mod eigen;
mod error;
mod field;
pub mod filter;
mod gradient;
mod heatmap;
mod params;
mod pipeline;
mod stats;
mod synthetic;
mod tensor;

pub use coherence::{
    coherence_from_eigen, fold_orientation, normalize_min_max, orientation_from_tensor,
    phase_deg, raw_coherence, raw_orientation, CoherenceOrientationExtractor,
    CoherenceOrientationMaps, OrientationVectorField, VectorSample, COHERENCE_UPPER,
    ORIENTATION_UPPER_DEG,
};
pub use eigen::{solve_symmetric_2x2, EigenField, EigenPair};
pub use error::FibermapError;
pub use field::{pad_to_square, ScalarField};
pub use gradient::GradientField;
pub use heatmap::{density_heatmap, heatmap_window_size, HeatmapParams};
pub use params::OrientationParams;
pub use pipeline::{compute_orientation_coherence, OrientationAnalysis, OrientationAnalyzer};
pub use stats::{
    coherence_histogram, orientation_histogram, AnalysisSummary, FieldSummary, Histogram,
    DEFAULT_COHERENCE_BINS, DEFAULT_ORIENTATION_BIN_DEG, MAX_HISTOGRAM_BINS,
};
pub use synthetic::{draw_circle_perimeter_aa, ring_test_image};
pub use tensor::StructureTensorField;
