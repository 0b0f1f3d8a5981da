//! Local-mean density overlay.
//!
//! The image is normalized by its maximum and averaged over a square window
//! of side `max(height / windows, 1)`. Only in-bounds pixels enter a window's
//! mean, so borders are not darkened by padding. This map is for display
//! context only; the tensor pipeline never reads it.

use crate::{FibermapError, ScalarField};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatmapParams {
    /// Number of averaging windows that fit along the image height.
    pub windows: usize,
}

impl Default for HeatmapParams {
    fn default() -> Self {
        Self { windows: 20 }
    }
}

/// Side of the square averaging window for an image of `height` rows.
pub fn heatmap_window_size(height: usize, windows: usize) -> usize {
    (height / windows.max(1)).max(1)
}

/// Locally averaged intensity in `[0, 1]`.
pub fn density_heatmap(image: &ScalarField, windows: usize) -> Result<ScalarField, FibermapError> {
    image.ensure_valid_image()?;
    if windows == 0 {
        return Err(FibermapError::parameter(
            "windows",
            0.0,
            "must be at least 1",
        ));
    }

    let (w, h) = (image.width(), image.height());
    let n = heatmap_window_size(h, windows);
    let peak = image.min_max().map(|(_, hi)| hi).unwrap_or(0.0);
    let normalized = if peak > 0.0 {
        image.map(|v| (v / peak).clamp(0.0, 1.0))
    } else {
        ScalarField::zeros(w, h)
    };

    // Summed-area table with a zero guard row/column.
    let sw = w + 1;
    let mut sat = vec![0.0f64; sw * (h + 1)];
    for row in 0..h {
        let mut acc = 0.0;
        for (col, &v) in normalized.row(row).iter().enumerate() {
            acc += v;
            sat[(row + 1) * sw + col + 1] = sat[row * sw + col + 1] + acc;
        }
    }

    let half = (n / 2) as isize;
    let span = |center: usize, len: usize| {
        let lo = (center as isize - half).max(0) as usize;
        let hi = ((center as isize - half + n as isize).max(0) as usize).min(len);
        (lo, hi)
    };

    let out = ScalarField::from_rows(w, h, |row, out| {
        let (r0, r1) = span(row, h);
        for (col, o) in out.iter_mut().enumerate() {
            let (c0, c1) = span(col, w);
            let sum = sat[r1 * sw + c1] - sat[r0 * sw + c1] - sat[r1 * sw + c0] + sat[r0 * sw + c0];
            let count = ((r1 - r0) * (c1 - c0)) as f64;
            *o = sum / count;
        }
    });
    log::debug!("density heatmap: window {n}x{n} over {w}x{h}");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn window_size_has_floor_of_one() {
        assert_eq!(heatmap_window_size(600, 20), 30);
        assert_eq!(heatmap_window_size(10, 20), 1);
    }

    #[test]
    fn unit_window_is_normalized_image() {
        let img = ScalarField::new(3, 1, vec![0.0, 50.0, 200.0]).unwrap();
        let hm = density_heatmap(&img, 5).unwrap();
        assert_eq!(hm.as_slice(), &[0.0, 0.25, 1.0]);
    }

    #[test]
    fn averages_only_in_bounds_pixels() {
        // 4x4 image, windows = 2 -> 2x2 window anchored at offset -1.
        let img = ScalarField::from_fn(4, 4, |r, c| if r == 0 && c == 0 { 4.0 } else { 0.0 });
        let hm = density_heatmap(&img, 2).unwrap();
        // (0,0): window rows/cols clipped to {0}, single pixel.
        assert_relative_eq!(hm.get(0, 0), 1.0);
        // (1,1): rows {0,1} x cols {0,1}.
        assert_relative_eq!(hm.get(1, 1), 0.25);
        // (0,1): rows {0} x cols {0,1}.
        assert_relative_eq!(hm.get(0, 1), 0.5);
        assert_relative_eq!(hm.get(3, 3), 0.0);
    }

    #[test]
    fn uniform_image_is_flat() {
        let img = ScalarField::filled(12, 9, 7.0);
        let hm = density_heatmap(&img, 3).unwrap();
        for &v in hm.as_slice() {
            assert_relative_eq!(v, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn zero_windows_is_rejected() {
        let img = ScalarField::filled(4, 4, 1.0);
        assert!(matches!(
            density_heatmap(&img, 0),
            Err(FibermapError::InvalidParameter { name: "windows", .. })
        ));
    }
}
