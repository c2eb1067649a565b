//! Radial intensity sampling helpers shared by the iris stages.

use image::GrayImage;

/// Mean intensity along a circle of radius `r`, sampled at `samples`
/// equally spaced angles with nearest-pixel rounding.
///
/// Samples falling outside the image are skipped; returns `None` when every
/// sample was out of bounds.
pub fn mean_along_circle(
    gray: &GrayImage,
    cx: f32,
    cy: f32,
    r: f32,
    samples: usize,
) -> Option<f32> {
    let (w, h) = gray.dimensions();
    let mut sum = 0.0f32;
    let mut count = 0usize;
    for t in 0..samples {
        let theta = t as f32 / samples as f32 * std::f32::consts::TAU;
        let x = (cx + r * theta.cos()).round();
        let y = (cy + r * theta.sin()).round();
        if x >= 0.0 && x < w as f32 && y >= 0.0 && y < h as f32 {
            sum += gray.get_pixel(x as u32, y as u32)[0] as f32;
            count += 1;
        }
    }
    if count > 0 {
        Some(sum / count as f32)
    } else {
        None
    }
}

/// Apply 3-point moving average smoothing to a curve in place.
///
/// Boundary values are left unchanged. No-op below 5 samples.
pub fn smooth_3point(d: &mut [f32]) {
    let n = d.len();
    if n < 5 {
        return;
    }

    let mut left = d[0];
    let mut mid = d[1];
    for i in 1..(n - 1) {
        let right = d[i + 1];
        d[i] = (left + mid + right) / 3.0;
        left = mid;
        mid = right;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_along_circle_on_uniform_image() {
        let img = GrayImage::from_pixel(40, 40, image::Luma([77]));
        let m = mean_along_circle(&img, 20.0, 20.0, 10.0, 360).unwrap();
        assert!((m - 77.0).abs() < 1e-3);
    }

    #[test]
    fn mean_along_circle_fully_outside_is_none() {
        let img = GrayImage::from_pixel(10, 10, image::Luma([50]));
        assert!(mean_along_circle(&img, 5.0, 5.0, 500.0, 90).is_none());
    }

    #[test]
    fn smooth_preserves_boundaries() {
        let mut d = vec![10.0, 0.0, 9.0, 0.0, 10.0];
        smooth_3point(&mut d);
        assert_eq!(d[0], 10.0);
        assert_eq!(d[4], 10.0);
        assert!((d[2] - 3.0).abs() < 1e-5);
    }
}
