//! Summary statistics and histograms of the output maps.

use crate::coherence::{COHERENCE_UPPER, ORIENTATION_UPPER_DEG};
use crate::{FibermapError, ScalarField};
use serde::{Deserialize, Serialize};

/// Default orientation histogram bin width in degrees (10 bins over 180°).
pub const DEFAULT_ORIENTATION_BIN_DEG: f64 = 18.0;
/// Default number of coherence histogram bins (weak vs. strong alignment).
pub const DEFAULT_COHERENCE_BINS: usize = 2;
/// Upper limit on the bin count of either histogram.
pub const MAX_HISTOGRAM_BINS: usize = 1 << 16;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldSummary {
    pub mean: f64,
    /// Population standard deviation.
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

impl FieldSummary {
    /// `None` for an empty field.
    pub fn of(field: &ScalarField) -> Option<Self> {
        let (min, max) = field.min_max()?;
        let n = field.len() as f64;
        let mean = field.as_slice().iter().sum::<f64>() / n;
        let var = field
            .as_slice()
            .iter()
            .map(|v| (v - mean) * (v - mean))
            .sum::<f64>()
            / n;
        Some(Self {
            mean,
            std: var.sqrt(),
            min,
            max,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    /// `bins + 1` ascending edges.
    pub edges: Vec<f64>,
    pub bin_centers: Vec<f64>,
    pub values: Vec<f64>,
}

/// Count samples into equal bins over `[lo, hi]`; `hi` itself goes into the
/// last bin and samples outside the range are ignored.
fn bin_counts(field: &ScalarField, lo: f64, hi: f64, bins: usize) -> (Vec<f64>, Vec<f64>) {
    let width = (hi - lo) / bins as f64;
    let edges: Vec<f64> = (0..=bins).map(|i| lo + i as f64 * width).collect();
    let mut counts = vec![0.0; bins];
    for &v in field.as_slice() {
        if !(lo..=hi).contains(&v) {
            continue;
        }
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        counts[idx] += 1.0;
    }
    (edges, counts)
}

fn centers(edges: &[f64]) -> Vec<f64> {
    edges.windows(2).map(|e| 0.5 * (e[0] + e[1])).collect()
}

/// Orientation histogram over `[0, 180]` as a probability density
/// (`Σ value · width = 1` when any sample falls in range).
pub fn orientation_histogram(
    orientation: &ScalarField,
    bin_deg: f64,
) -> Result<Histogram, FibermapError> {
    let min_bin_deg = ORIENTATION_UPPER_DEG / MAX_HISTOGRAM_BINS as f64;
    if !(bin_deg.is_finite() && bin_deg >= min_bin_deg && bin_deg <= ORIENTATION_UPPER_DEG) {
        return Err(FibermapError::parameter(
            "bin_deg",
            bin_deg,
            "must be in [180 / 65536, 180]",
        ));
    }
    let bins = (ORIENTATION_UPPER_DEG / bin_deg).ceil() as usize;
    let hi = bins as f64 * bin_deg;
    let (edges, counts) = bin_counts(orientation, 0.0, hi, bins);
    let total: f64 = counts.iter().sum();
    let values = if total > 0.0 {
        counts.iter().map(|c| c / (total * bin_deg)).collect()
    } else {
        counts
    };
    Ok(Histogram {
        bin_centers: centers(&edges),
        edges,
        values,
    })
}

/// Coherence histogram over `[0, 1]` in percent of all pixels.
pub fn coherence_histogram(
    coherence: &ScalarField,
    bins: usize,
) -> Result<Histogram, FibermapError> {
    if bins == 0 || bins > MAX_HISTOGRAM_BINS {
        return Err(FibermapError::parameter(
            "bins",
            bins as f64,
            "must be in [1, 65536]",
        ));
    }
    let (edges, counts) = bin_counts(coherence, 0.0, COHERENCE_UPPER, bins);
    let n = coherence.len().max(1) as f64;
    Ok(Histogram {
        bin_centers: centers(&edges),
        edges,
        values: counts.iter().map(|c| 100.0 * c / n).collect(),
    })
}

/// Everything the report layer prints about one analysis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub orientation: FieldSummary,
    pub coherence: FieldSummary,
    pub orientation_histogram: Histogram,
    pub coherence_histogram: Histogram,
}

impl AnalysisSummary {
    pub fn new(
        orientation: &ScalarField,
        coherence: &ScalarField,
        orientation_bin_deg: f64,
        coherence_bins: usize,
    ) -> Result<Self, FibermapError> {
        let empty = || FibermapError::input("cannot summarize an empty map");
        Ok(Self {
            orientation: FieldSummary::of(orientation).ok_or_else(empty)?,
            coherence: FieldSummary::of(coherence).ok_or_else(empty)?,
            orientation_histogram: orientation_histogram(orientation, orientation_bin_deg)?,
            coherence_histogram: coherence_histogram(coherence, coherence_bins)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn summary_uses_population_std() {
        let f = ScalarField::new(4, 1, vec![1.0, 3.0, 1.0, 3.0]).unwrap();
        let s = FieldSummary::of(&f).unwrap();
        assert_relative_eq!(s.mean, 2.0);
        assert_relative_eq!(s.std, 1.0);
        assert_eq!((s.min, s.max), (1.0, 3.0));
    }

    #[test]
    fn orientation_density_integrates_to_one() {
        let f = ScalarField::new(5, 1, vec![0.0001, 10.0, 95.0, 170.0, 180.0]).unwrap();
        let h = orientation_histogram(&f, DEFAULT_ORIENTATION_BIN_DEG).unwrap();
        assert_eq!(h.values.len(), 10);
        assert_eq!(h.edges.len(), 11);
        assert_relative_eq!(h.bin_centers[0], 9.0);
        let area: f64 = h.values.iter().map(|v| v * 18.0).sum();
        assert_relative_eq!(area, 1.0, epsilon = 1e-12);
        // 170 and 180 both land in the last bin.
        assert_relative_eq!(h.values[9] * 18.0, 0.4, epsilon = 1e-12);
        assert_relative_eq!(h.values[5] * 18.0, 0.2, epsilon = 1e-12);
    }

    #[test]
    fn coherence_percentages() {
        let f = ScalarField::new(4, 1, vec![0.0001, 0.3, 0.8, 1.0]).unwrap();
        let h = coherence_histogram(&f, DEFAULT_COHERENCE_BINS).unwrap();
        assert_eq!(h.values, vec![50.0, 50.0]);
        assert_eq!(h.edges, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn rejects_bad_bins() {
        let f = ScalarField::filled(2, 2, 0.5);
        assert!(coherence_histogram(&f, 0).is_err());
        assert!(orientation_histogram(&f, 0.0).is_err());
        assert!(orientation_histogram(&f, 200.0).is_err());
    }

    #[test]
    fn bin_count_is_bounded() {
        let f = ScalarField::filled(2, 2, 0.5);
        assert!(matches!(
            orientation_histogram(&f, 1e-300),
            Err(FibermapError::InvalidParameter { name: "bin_deg", .. })
        ));
        assert!(matches!(
            coherence_histogram(&f, MAX_HISTOGRAM_BINS + 1),
            Err(FibermapError::InvalidParameter { name: "bins", .. })
        ));
        let finest = orientation_histogram(&f, 180.0 / MAX_HISTOGRAM_BINS as f64).unwrap();
        assert_eq!(finest.values.len(), MAX_HISTOGRAM_BINS);
        let widest = coherence_histogram(&f, MAX_HISTOGRAM_BINS).unwrap();
        assert_eq!(widest.values.len(), MAX_HISTOGRAM_BINS);
    }
}
