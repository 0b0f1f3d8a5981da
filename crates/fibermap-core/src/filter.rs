//! Separable linear filters with edge-replicate ("nearest") boundaries.
//!
//! Every stage of the pipeline smooths through these helpers so that the
//! kernel shape and the boundary policy stay identical across stages.

use crate::ScalarField;

/// Gaussian support is cut at `truncate * sigma` on each side.
pub const DEFAULT_TRUNCATE: f64 = 4.0;

/// Central difference taps of the 3x3 Sobel operator.
pub const SOBEL_DERIVATIVE: [f64; 3] = [-1.0, 0.0, 1.0];
/// Cross-axis smoothing taps of the 3x3 Sobel operator.
pub const SOBEL_SMOOTHING: [f64; 3] = [1.0, 2.0, 1.0];

/// Direction of a 1D pass.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Axis {
    /// Axis 0: the kernel runs down the rows.
    Vertical,
    /// Axis 1: the kernel runs across the columns.
    Horizontal,
}

/// Normalized sampled Gaussian with radius `round(truncate * sigma)`.
///
/// The kernel always has odd length `2 * radius + 1` and sums to 1.
pub fn gaussian_kernel(sigma: f64, truncate: f64) -> Vec<f64> {
    let radius = (truncate * sigma + 0.5) as usize;
    let inv_two_var = 0.5 / (sigma * sigma);
    let mut k: Vec<f64> = (0..=2 * radius)
        .map(|i| {
            let x = i as f64 - radius as f64;
            (-x * x * inv_two_var).exp()
        })
        .collect();
    let sum: f64 = k.iter().sum();
    for v in &mut k {
        *v /= sum;
    }
    k
}

/// Correlate every line along `axis` with an odd-length kernel.
///
/// Out-of-range taps replicate the nearest edge sample.
pub fn correlate1d(field: &ScalarField, kernel: &[f64], axis: Axis) -> ScalarField {
    debug_assert!(kernel.len() % 2 == 1, "kernel length must be odd");
    let radius = (kernel.len() / 2) as isize;
    let (w, h) = (field.width(), field.height());

    match axis {
        Axis::Horizontal => ScalarField::from_rows(w, h, |row, out| {
            let src = field.row(row);
            let last = w as isize - 1;
            for (col, o) in out.iter_mut().enumerate() {
                let mut acc = 0.0;
                for (k, &wk) in kernel.iter().enumerate() {
                    let c = (col as isize + k as isize - radius).clamp(0, last) as usize;
                    acc += wk * src[c];
                }
                *o = acc;
            }
        }),
        Axis::Vertical => ScalarField::from_rows(w, h, |row, out| {
            let last = h as isize - 1;
            for (k, &wk) in kernel.iter().enumerate() {
                let r = (row as isize + k as isize - radius).clamp(0, last) as usize;
                for (o, &v) in out.iter_mut().zip(field.row(r)) {
                    *o += wk * v;
                }
            }
        }),
    }
}

/// Apply `kernel_v` along axis 0, then `kernel_h` along axis 1.
pub fn correlate_separable(field: &ScalarField, kernel_v: &[f64], kernel_h: &[f64]) -> ScalarField {
    let tmp = correlate1d(field, kernel_v, Axis::Vertical);
    correlate1d(&tmp, kernel_h, Axis::Horizontal)
}

/// Isotropic Gaussian smoothing.
pub fn gaussian_blur(field: &ScalarField, sigma: f64) -> ScalarField {
    let k = gaussian_kernel(sigma, DEFAULT_TRUNCATE);
    correlate_separable(field, &k, &k)
}

/// 3x3 Sobel derivative along `axis` (unnormalized, like the classic operator).
pub fn sobel(field: &ScalarField, axis: Axis) -> ScalarField {
    match axis {
        Axis::Vertical => correlate_separable(field, &SOBEL_DERIVATIVE, &SOBEL_SMOOTHING),
        Axis::Horizontal => correlate_separable(field, &SOBEL_SMOOTHING, &SOBEL_DERIVATIVE),
    }
}
