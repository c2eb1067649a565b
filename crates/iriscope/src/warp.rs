//! Radial warp engine: piecewise-linear polar remapping.
//!
//! A reference chart is authored with pupil/middle boundaries at fixed
//! fractions of the half-canvas. A detected subject has different true
//! fractions. For every destination pixel the engine maps its radius
//! through a three-segment piecewise-linear function (the outer boundary
//! never moves), then samples the source at the mapped radius along the
//! same angle with bilinear interpolation. Backward mapping avoids the
//! holes a forward scatter would leave when stretching.

use image::{Rgba, RgbaImage};

use crate::geometry::GeometryError;

/// Inner (pupil) boundary fraction assumed by stock reference charts.
pub const DEFAULT_SRC_INNER: f32 = 0.19;
/// Middle boundary fraction assumed by stock reference charts.
pub const DEFAULT_SRC_MIDDLE: f32 = 0.45;

/// Breakpoint ratios for [`warp`], all fractions of the half-canvas in
/// `(0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RadialMapping {
    /// Source inner (pupil) boundary ratio.
    pub src_inner: f32,
    /// Source middle boundary ratio.
    pub src_middle: f32,
    /// Destination inner boundary ratio (typically `pupil.r / iris.r`).
    pub dst_inner: f32,
    /// Destination middle boundary ratio (typically `middle.r / iris.r`).
    pub dst_middle: f32,
}

impl RadialMapping {
    /// Mapping with the stock source breakpoints.
    pub fn new(dst_inner: f32, dst_middle: f32) -> Self {
        Self {
            src_inner: DEFAULT_SRC_INNER,
            src_middle: DEFAULT_SRC_MIDDLE,
            dst_inner,
            dst_middle,
        }
    }

    /// Replace the source breakpoints (for charts authored with other
    /// proportions).
    pub fn with_source(mut self, src_inner: f32, src_middle: f32) -> Self {
        self.src_inner = src_inner;
        self.src_middle = src_middle;
        self
    }

    /// Reject non-finite, out-of-range, or mis-ordered breakpoints.
    pub fn validate(&self) -> Result<(), GeometryError> {
        let ratios = [self.src_inner, self.src_middle, self.dst_inner, self.dst_middle];
        if ratios.iter().any(|v| !v.is_finite()) {
            return Err(GeometryError::NonFiniteInput);
        }
        if ratios.iter().any(|&v| v <= 0.0 || v > 1.0) {
            return Err(GeometryError::RatioOutOfRange);
        }
        if self.src_inner >= self.src_middle || self.dst_inner >= self.dst_middle {
            return Err(GeometryError::RatioOrder);
        }
        Ok(())
    }

    /// Map a destination radius to its source radius.
    ///
    /// Continuous and monotonic; exact at every breakpoint. `outer` is the
    /// shared outer radius (half of the canvas short side).
    pub fn map_r(&self, r: f32, outer: f32) -> f32 {
        let src_inner_r = self.src_inner * outer;
        let src_middle_r = self.src_middle * outer;
        let dst_inner_r = self.dst_inner * outer;
        let dst_middle_r = self.dst_middle * outer;

        if r <= dst_inner_r {
            return r / dst_inner_r * src_inner_r;
        }
        if r <= dst_middle_r {
            return src_inner_r
                + (r - dst_inner_r) * (src_middle_r - src_inner_r) / (dst_middle_r - dst_inner_r);
        }
        src_middle_r + (r - dst_middle_r) * (outer - src_middle_r) / (outer - dst_middle_r)
    }
}

/// Warp a square reference image so its fixed radial breakpoints land on the
/// mapping's destination breakpoints.
///
/// Output has the source dimensions. Destination pixels whose mapped source
/// position leaves `[0, w-1) x [0, h-1)` stay transparent.
pub fn warp(src: &RgbaImage, mapping: &RadialMapping) -> Result<RgbaImage, GeometryError> {
    mapping.validate()?;

    let (w, h) = src.dimensions();
    let mut out = RgbaImage::new(w, h);
    if w < 2 || h < 2 {
        return Ok(out);
    }

    let cx = w as f32 / 2.0;
    let cy = h as f32 / 2.0;
    let outer = w.min(h) as f32 / 2.0;
    let x_limit = (w - 1) as f32;
    let y_limit = (h - 1) as f32;

    for y in 0..h {
        let dy = y as f32 - cy;
        for x in 0..w {
            let dx = x as f32 - cx;
            let r = dx.hypot(dy);
            let mapped = mapping.map_r(r, outer);

            // Same angle, rescaled radius.
            let (sx, sy) = if r > f32::EPSILON {
                let scale = mapped / r;
                (cx + dx * scale, cy + dy * scale)
            } else {
                (cx, cy)
            };

            if sx >= 0.0 && sx < x_limit && sy >= 0.0 && sy < y_limit {
                out.put_pixel(x, y, bilinear_rgba(src, sx, sy));
            }
        }
    }

    Ok(out)
}

/// Bilinear sample of the four nearest pixels, per channel including alpha.
fn bilinear_rgba(img: &RgbaImage, x: f32, y: f32) -> Rgba<u8> {
    let (w, h) = img.dimensions();
    let x0 = x.floor() as u32;
    let y0 = y.floor() as u32;
    let x1 = (x0 + 1).min(w - 1);
    let y1 = (y0 + 1).min(h - 1);
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let p00 = img.get_pixel(x0, y0).0;
    let p10 = img.get_pixel(x1, y0).0;
    let p01 = img.get_pixel(x0, y1).0;
    let p11 = img.get_pixel(x1, y1).0;

    let mut px = [0u8; 4];
    for c in 0..4 {
        let top = p00[c] as f32 + (p10[c] as f32 - p00[c] as f32) * fx;
        let bot = p01[c] as f32 + (p11[c] as f32 - p01[c] as f32) * fx;
        px[c] = (top + (bot - top) * fy).round() as u8;
    }
    Rgba(px)
}
