//! Iris disc extraction onto a padded white square canvas.

use image::{Rgba, RgbaImage};

use crate::geometry::{Circle, GeometryError};

/// Padding reserved around the disc for later chart/label drawing, as a
/// fraction of the iris radius. Canvas side ends up at 2.8 * iris radius.
pub const PADDING_FRAC: f32 = 0.4;

/// Crop the iris disc into a square canvas with padding.
///
/// Every destination pixel inside the disc (small tolerance against rounding
/// gaps at the rim) receives the nearest source pixel, all channels copied
/// verbatim. Pixels outside the disc, or whose source position falls outside
/// the image, stay opaque white.
///
/// Fails only on invalid circle geometry.
pub fn extract(src: &RgbaImage, iris: &Circle, pupil: &Circle) -> Result<RgbaImage, GeometryError> {
    if !(iris.cx.is_finite() && iris.cy.is_finite() && iris.r.is_finite() && pupil.r.is_finite()) {
        return Err(GeometryError::NonFiniteInput);
    }
    if iris.r <= 0.0 || pupil.r <= 0.0 {
        return Err(GeometryError::NonPositiveRadius);
    }
    if pupil.r >= iris.r {
        return Err(GeometryError::RadiusOrder);
    }

    let (sw, sh) = src.dimensions();
    let padding = (iris.r * PADDING_FRAC).round();
    let size = (iris.r * 2.0 + padding * 2.0).round() as u32;
    let mut out = RgbaImage::from_pixel(size, size, Rgba([255, 255, 255, 255]));

    let half = size as f32 / 2.0;
    let r_sq = iris.r * iris.r + 4.0;

    for y in 0..size {
        let rel_y = y as f32 - half;
        for x in 0..size {
            let rel_x = x as f32 - half;
            if rel_x * rel_x + rel_y * rel_y > r_sq {
                continue;
            }
            let sx = (iris.cx + rel_x).round();
            let sy = (iris.cy + rel_y).round();
            if sx >= 0.0 && sx < sw as f32 && sy >= 0.0 && sy < sh as f32 {
                out.put_pixel(x, y, *src.get_pixel(sx as u32, sy as u32));
            }
        }
    }

    Ok(out)
}
