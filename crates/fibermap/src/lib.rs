//! Facade crate for fiber orientation and coherence analysis.
//!
//! This crate provides:
//! - re-exports of the [`fibermap_core`] pipeline types
//! - (feature `image`) helpers to load micrographs from disk and export maps
//!   as 16-bit PNGs
//! - (feature `cli`) the `fibermap` command-line tool
//!
//! ## Quickstart
//!
//! ```no_run
//! use fibermap::{compute_orientation_coherence, OrientationParams};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let img = fibermap::io::load_image("fibers.tif")?;
//! let out = compute_orientation_coherence(&img, &OrientationParams::default())?;
//! fibermap::io::save_map_png(&out.coherence, 0.0, 1.0, "coherence.png")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `fibermap::core`: the whole core crate (fields, filters, stages).
//! - `fibermap::io` (feature `image`): image decoding and map export.

pub use fibermap_core as core;

pub use fibermap_core::{
    compute_orientation_coherence, density_heatmap, pad_to_square, ring_test_image,
    AnalysisSummary, FibermapError, HeatmapParams, OrientationAnalysis, OrientationAnalyzer,
    OrientationParams, ScalarField,
};

mod error;

pub use error::AnalyzeError;

#[cfg(feature = "image")]
pub mod io;
