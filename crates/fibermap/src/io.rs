//! Image decoding and map export on top of the `image` crate.

use std::path::Path;

use crate::{AnalyzeError, FibermapError, ScalarField};
use image::{GrayImage, ImageBuffer, ImageFormat, ImageReader, Luma};
use log::debug;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Single-channel 32-bit float image.
pub type GrayImage32F = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Single-channel 16-bit image, the export format of [`save_map_png`].
pub type GrayImage16 = ImageBuffer<Luma<u16>, Vec<u16>>;

/// Convert an 8-bit grayscale image into a field of raw intensities (0..=255).
pub fn field_from_luma8(img: &GrayImage) -> Result<ScalarField, AnalyzeError> {
    Ok(ScalarField::from_u8(
        img.width() as usize,
        img.height() as usize,
        img.as_raw(),
    )?)
}

/// Convert a float grayscale image into a field.
pub fn field_from_luma32f(img: &GrayImage32F) -> Result<ScalarField, AnalyzeError> {
    Ok(ScalarField::from_f32(
        img.width() as usize,
        img.height() as usize,
        img.as_raw(),
    )?)
}

/// Decode any format `image` understands and convert it to float luma.
///
/// Integer inputs are scaled to `[0, 1]` by the conversion; the pipeline is
/// invariant to that scale.
#[cfg_attr(feature = "tracing", instrument(level = "info", skip(path)))]
pub fn load_image(path: impl AsRef<Path>) -> Result<ScalarField, AnalyzeError> {
    let path = path.as_ref();
    let img = ImageReader::open(path)?.decode()?;
    debug!(
        "decoded {}: {}x{} {:?}",
        path.display(),
        img.width(),
        img.height(),
        img.color()
    );
    field_from_luma32f(&img.to_luma32f())
}

/// Linearly map `[lo, hi]` onto the full 16-bit range. Values outside are
/// clamped.
pub fn map_to_luma16(field: &ScalarField, lo: f64, hi: f64) -> Result<GrayImage16, AnalyzeError> {
    if !(lo.is_finite() && hi.is_finite() && hi > lo) {
        return Err(FibermapError::InvalidParameter {
            name: "hi",
            value: hi,
            reason: "must be finite and greater than lo",
        }
        .into());
    }
    let (w, h) = (field.width(), field.height());
    let invalid = || AnalyzeError::InvalidDimensions {
        width: w,
        height: h,
    };
    if field.is_empty() {
        return Err(invalid());
    }
    let (w32, h32) = (
        u32::try_from(w).map_err(|_| invalid())?,
        u32::try_from(h).map_err(|_| invalid())?,
    );

    let scale = f64::from(u16::MAX) / (hi - lo);
    let data = field
        .as_slice()
        .iter()
        .map(|&v| ((v - lo) * scale).round().clamp(0.0, f64::from(u16::MAX)) as u16)
        .collect();
    ImageBuffer::from_raw(w32, h32, data).ok_or_else(invalid)
}

/// Write `field` as a 16-bit grayscale PNG scaled from `[lo, hi]`.
pub fn save_map_png(
    field: &ScalarField,
    lo: f64,
    hi: f64,
    path: impl AsRef<Path>,
) -> Result<(), AnalyzeError> {
    let path = path.as_ref();
    map_to_luma16(field, lo, hi)?.save_with_format(path, ImageFormat::Png)?;
    debug!("wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn luma8_keeps_raw_intensities() {
        let img = GrayImage::from_raw(3, 2, vec![0, 10, 20, 30, 40, 255]).unwrap();
        let f = field_from_luma8(&img).unwrap();
        assert_eq!(f.shape(), (2, 3));
        assert_eq!(f.get(1, 0), 30.0);
        assert_eq!(f.get(1, 2), 255.0);
    }

    #[test]
    fn luma16_scaling_clamps() {
        let f = ScalarField::new(4, 1, vec![-1.0, 0.0, 0.5, 2.0]).unwrap();
        let img = map_to_luma16(&f, 0.0, 1.0).unwrap();
        let px: Vec<u16> = img.pixels().map(|p| p.0[0]).collect();
        assert_eq!(px, vec![0, 0, 32768, u16::MAX]);
    }

    #[test]
    fn rejects_empty_range() {
        let f = ScalarField::filled(2, 2, 1.0);
        assert!(matches!(
            map_to_luma16(&f, 1.0, 1.0),
            Err(AnalyzeError::Analysis(FibermapError::InvalidParameter { .. }))
        ));
    }

    #[test]
    fn png_roundtrip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.png");
        let f = ScalarField::from_fn(5, 4, |r, c| (r * 5 + c) as f64 / 19.0);
        save_map_png(&f, 0.0, 1.0, &path).unwrap();

        let back = load_image(&path).unwrap();
        assert_eq!(back.shape(), (4, 5));
        for (a, b) in f.as_slice().iter().zip(back.as_slice()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-4);
        }
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_image("/definitely/not/here.png").unwrap_err();
        assert!(matches!(err, AnalyzeError::Io(_)));
    }
}
