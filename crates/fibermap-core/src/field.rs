//! Owned single-channel f64 field in row-major layout.
//!
//! Used for the input image and for every derived map. Indexing is
//! `(row, col)`: axis 0 runs down the rows, axis 1 across the columns.

use crate::FibermapError;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

#[derive(Clone, Debug, PartialEq)]
pub struct ScalarField {
    width: usize,
    height: usize,
    data: Vec<f64>, // row-major, len = width * height
}

impl ScalarField {
    /// Wrap an existing buffer. Fails when `data.len() != width * height`.
    pub fn new(width: usize, height: usize, data: Vec<f64>) -> Result<Self, FibermapError> {
        let expected = width.checked_mul(height).ok_or_else(|| {
            FibermapError::input(format!("dimensions overflow ({width}x{height})"))
        })?;
        if data.len() != expected {
            return Err(FibermapError::input(format!(
                "buffer length {} does not match {width}x{height} = {expected}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn zeros(width: usize, height: usize) -> Self {
        Self::filled(width, height, 0.0)
    }

    pub fn filled(width: usize, height: usize, value: f64) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    /// Build a field by evaluating `f(row, col)` at every pixel.
    pub fn from_fn(width: usize, height: usize, f: impl Fn(usize, usize) -> f64 + Sync) -> Self {
        Self::from_rows(width, height, |row, out| {
            for (col, v) in out.iter_mut().enumerate() {
                *v = f(row, col);
            }
        })
    }

    /// Build a field row by row. `fill(row, out)` writes one full row.
    ///
    /// Rows are independent, so with the `rayon` feature they are filled in
    /// parallel.
    pub fn from_rows(
        width: usize,
        height: usize,
        fill: impl Fn(usize, &mut [f64]) + Sync,
    ) -> Self {
        let mut data = vec![0.0; width * height];
        if width > 0 {
            #[cfg(feature = "rayon")]
            data.par_chunks_mut(width)
                .enumerate()
                .for_each(|(row, out)| fill(row, out));
            #[cfg(not(feature = "rayon"))]
            data.chunks_mut(width)
                .enumerate()
                .for_each(|(row, out)| fill(row, out));
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn from_f32(width: usize, height: usize, data: &[f32]) -> Result<Self, FibermapError> {
        Self::new(width, height, data.iter().map(|&v| v as f64).collect())
    }

    pub fn from_u8(width: usize, height: usize, data: &[u8]) -> Result<Self, FibermapError> {
        Self::new(width, height, data.iter().map(|&v| v as f64).collect())
    }

    /// Number of columns.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// `(rows, cols)`, matching the array shape convention.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn same_shape(&self, other: &ScalarField) -> bool {
        self.shape() == other.shape()
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.width + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, v: f64) {
        self.data[row * self.width + col] = v;
    }

    /// Sample with edge replication for out-of-range coordinates.
    #[inline]
    pub fn get_clamped(&self, row: isize, col: isize) -> f64 {
        let r = row.clamp(0, self.height as isize - 1) as usize;
        let c = col.clamp(0, self.width as isize - 1) as usize;
        self.get(r, c)
    }

    #[inline]
    pub fn row(&self, row: usize) -> &[f64] {
        let start = row * self.width;
        &self.data[start..start + self.width]
    }

    #[inline]
    pub fn row_mut(&mut self, row: usize) -> &mut [f64] {
        let start = row * self.width;
        &mut self.data[start..start + self.width]
    }

    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Apply `f` to every sample.
    pub fn map(&self, f: impl Fn(f64) -> f64 + Sync) -> ScalarField {
        ScalarField::from_rows(self.width, self.height, |row, out| {
            for (o, &v) in out.iter_mut().zip(self.row(row)) {
                *o = f(v);
            }
        })
    }

    /// Combine two fields of identical shape sample by sample.
    pub fn zip_map(&self, other: &ScalarField, f: impl Fn(f64, f64) -> f64 + Sync) -> ScalarField {
        debug_assert!(self.same_shape(other));
        ScalarField::from_rows(self.width, self.height, |row, out| {
            for ((o, &a), &b) in out.iter_mut().zip(self.row(row)).zip(other.row(row)) {
                *o = f(a, b);
            }
        })
    }

    /// Global `(min, max)`; `None` for an empty field.
    pub fn min_max(&self) -> Option<(f64, f64)> {
        let first = *self.data.first()?;
        Some(
            self.data
                .iter()
                .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v))),
        )
    }

    /// Reject empty fields and non-finite samples.
    pub fn ensure_valid_image(&self) -> Result<(), FibermapError> {
        if self.width == 0 || self.height == 0 {
            return Err(FibermapError::input(format!(
                "zero area ({}x{})",
                self.width, self.height
            )));
        }
        if let Some(idx) = self.data.iter().position(|v| !v.is_finite()) {
            return Err(FibermapError::input(format!(
                "non-finite sample at (row {}, col {})",
                idx / self.width,
                idx % self.width
            )));
        }
        Ok(())
    }
}

/// Copy `field` into the top-left corner of a zero-filled square canvas
/// whose side is the larger of the two dimensions.
pub fn pad_to_square(field: &ScalarField) -> ScalarField {
    let side = field.width().max(field.height());
    let mut out = ScalarField::zeros(side, side);
    for row in 0..field.height() {
        out.row_mut(row)[..field.width()].copy_from_slice(field.row(row));
    }
    out
}
