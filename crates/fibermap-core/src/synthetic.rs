//! Synthetic test images.

use crate::ScalarField;

/// Draw an anti-aliased circle outline (Xiaolin Wu's algorithm).
///
/// Each touched pixel receives `max(existing, value * coverage)`; pixels
/// outside the field are skipped.
pub fn draw_circle_perimeter_aa(
    field: &mut ScalarField,
    center_row: isize,
    center_col: isize,
    radius: usize,
    value: f64,
) {
    let mut plot = |dr: isize, dc: isize, coverage: f64| {
        let (r, c) = (center_row + dr, center_col + dc);
        if r < 0 || c < 0 || r >= field.height() as isize || c >= field.width() as isize {
            return;
        }
        let (r, c) = (r as usize, c as usize);
        let v = value * coverage;
        if v > field.get(r, c) {
            field.set(r, c, v);
        }
    };

    let radius_i = radius as isize;
    let mut r = 0isize;
    let mut c = radius_i;
    for (dr, dc) in [
        (c, r),
        (r, c),
        (r, -c),
        (-c, r),
        (-c, -r),
        (-r, c),
        (-r, -c),
        (c, -r),
    ] {
        plot(dr, dc, 1.0);
    }

    let r2 = (radius * radius) as f64;
    let mut frac_prev = 0.0;
    while c > r + 1 {
        r += 1;
        let exact = (r2 - (r * r) as f64).sqrt();
        let frac = exact.ceil() - exact;
        if frac < frac_prev {
            c -= 1;
        }
        // Inner/outer pixel pair in each of the eight octants.
        for (sr, sc) in [(1, 1), (1, -1), (-1, 1), (-1, -1)] {
            plot(sr * c, sc * r, 1.0 - frac);
            plot(sr * (c - 1), sc * r, frac);
            plot(sr * r, sc * c, 1.0 - frac);
            plot(sr * r, sc * (c - 1), frac);
        }
        frac_prev = frac;
    }
}

/// 600x600 black image with two bright ring outlines: radius 100 centered at
/// (150, 150) and radius 50 centered at (350, 300), peak value 255.
pub fn ring_test_image() -> ScalarField {
    let mut img = ScalarField::zeros(600, 600);
    draw_circle_perimeter_aa(&mut img, 150, 150, 100, 255.0);
    draw_circle_perimeter_aa(&mut img, 350, 300, 50, 255.0);
    img
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cardinal_points_are_fully_covered() {
        let mut img = ScalarField::zeros(41, 41);
        draw_circle_perimeter_aa(&mut img, 20, 20, 15, 1.0);
        assert_eq!(img.get(5, 20), 1.0);
        assert_eq!(img.get(35, 20), 1.0);
        assert_eq!(img.get(20, 5), 1.0);
        assert_eq!(img.get(20, 35), 1.0);
        assert_eq!(img.get(20, 20), 0.0);
    }

    #[test]
    fn outline_is_eightfold_symmetric() {
        let mut img = ScalarField::zeros(31, 31);
        draw_circle_perimeter_aa(&mut img, 15, 15, 11, 2.0);
        for r in 0..31 {
            for c in 0..31 {
                let v = img.get(r, c);
                assert_eq!(v, img.get(30 - r, c));
                assert_eq!(v, img.get(r, 30 - c));
                assert_eq!(v, img.get(c, r));
            }
        }
        assert!(img.as_slice().iter().all(|&v| (0.0..=2.0).contains(&v)));
    }

    #[test]
    fn clipped_circle_does_not_panic() {
        let mut img = ScalarField::zeros(10, 10);
        draw_circle_perimeter_aa(&mut img, 0, 0, 8, 1.0);
        assert!(img.get(0, 8) > 0.0);
    }

    #[test]
    fn ring_image_dimensions_and_peak() {
        let img = ring_test_image();
        assert_eq!(img.shape(), (600, 600));
        assert_eq!(img.get(50, 150), 255.0);
        assert_eq!(img.get(350, 350), 255.0);
        assert_eq!(img.get(150, 150), 0.0);
    }
}
