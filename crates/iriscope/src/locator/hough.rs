//! Gradient-voting circle transform (Hough-style).
//!
//! For each pixel with a strong gradient, votes are cast along the gradient
//! direction at distances in [r_min, r_max]. Circular boundaries produce
//! accumulator peaks at their centers because gradient vectors from the
//! boundary converge radially. The radius of each surviving center is then
//! recovered from a histogram of strong-pixel distances; a radius counts
//! only if its supporting pixels cover enough of the angular range around
//! the center, so a short arc seen from an off-center peak never passes as
//! a circle.

use image::GrayImage;

use super::config::HoughParams;
use super::profile::smooth_3point;

/// A detected circle candidate with its accumulator score.
#[derive(Debug, Clone, Copy)]
pub struct CircleCandidate {
    /// Center x (pixels).
    pub cx: f32,
    /// Center y (pixels).
    pub cy: f32,
    /// Radius (pixels).
    pub r: f32,
    /// Accumulator peak score weighted by the angular coverage of the
    /// recovered radius.
    pub score: f32,
}

/// Deposit a weighted vote into the accumulator using bilinear interpolation.
#[inline]
fn bilinear_add_in_bounds(accum: &mut [f32], stride: usize, x: f32, y: f32, weight: f32) {
    let x0 = x as usize;
    let y0 = y as usize;
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;
    let base = y0 * stride + x0;
    accum[base] += weight * (1.0 - fx) * (1.0 - fy);
    accum[base + 1] += weight * fx * (1.0 - fy);
    accum[base + stride] += weight * (1.0 - fx) * fy;
    accum[base + stride + 1] += weight * fx * fy;
}

struct StrongPixel {
    x: f32,
    y: f32,
    mag: f32,
}

/// Detect circles in `[r_min, r_max]` via gradient-based radial symmetry
/// voting. `min_sep` is the minimum separation between returned centers.
///
/// Returns candidates sorted by score (highest first).
pub fn find_circles(
    gray: &GrayImage,
    r_min: f32,
    r_max: f32,
    min_sep: f32,
    params: &HoughParams,
) -> Vec<CircleCandidate> {
    let (w, h) = gray.dimensions();
    if w < 4 || h < 4 || r_max < r_min || r_min < 0.0 {
        return Vec::new();
    }

    let gx = imageproc::gradients::horizontal_scharr(gray);
    let gy = imageproc::gradients::vertical_scharr(gray);
    let gx_raw = gx.as_raw();
    let gy_raw = gy.as_raw();

    let mut max_mag_sq: f32 = 0.0;
    for (&gxv, &gyv) in gx_raw.iter().zip(gy_raw.iter()) {
        let gxv = gxv as f32;
        let gyv = gyv as f32;
        let mag_sq = gxv * gxv + gyv * gyv;
        if mag_sq > max_mag_sq {
            max_mag_sq = mag_sq;
        }
    }
    let max_mag = max_mag_sq.sqrt();
    if max_mag < 1e-6 {
        return Vec::new();
    }
    let threshold_sq = (params.grad_threshold * max_mag).powi(2);

    // Vote accumulation along +/- gradient directions.
    let stride = w as usize;
    let n = stride * h as usize;
    let mut accum = vec![0.0f32; n];
    let mut strong = Vec::new();
    let x_limit = (w - 1) as f32;
    let y_limit = (h - 1) as f32;
    let n_radii = ((r_max - r_min).floor() as usize) + 1;

    for y in 0..h as usize {
        let y_base = y * stride;
        let yf = y as f32;
        for x in 0..stride {
            let idx = y_base + x;
            let gxv = gx_raw[idx] as f32;
            let gyv = gy_raw[idx] as f32;
            let mag_sq = gxv * gxv + gyv * gyv;
            if mag_sq < threshold_sq {
                continue;
            }

            let mag = mag_sq.sqrt();
            let inv_mag = 1.0 / mag;
            let dx = gxv * inv_mag;
            let dy = gyv * inv_mag;
            let xf = x as f32;
            strong.push(StrongPixel { x: xf, y: yf, mag });

            for ri in 0..n_radii {
                let r = r_min + ri as f32;
                let vx_pos = xf + dx * r;
                let vy_pos = yf + dy * r;
                if vx_pos >= 0.0 && vx_pos < x_limit && vy_pos >= 0.0 && vy_pos < y_limit {
                    bilinear_add_in_bounds(&mut accum, stride, vx_pos, vy_pos, mag);
                }

                let vx_neg = xf - dx * r;
                let vy_neg = yf - dy * r;
                if vx_neg >= 0.0 && vx_neg < x_limit && vy_neg >= 0.0 && vy_neg < y_limit {
                    bilinear_add_in_bounds(&mut accum, stride, vx_neg, vy_neg, mag);
                }
            }
        }
    }

    // Smooth the accumulator before peak extraction.
    let accum_img = image::ImageBuffer::<image::Luma<f32>, Vec<f32>>::from_raw(w, h, accum)
        .expect("accumulator dimensions match");
    let smoothed = imageproc::filter::gaussian_blur_f32(&accum_img, params.accum_sigma);
    let smoothed_data = smoothed.as_raw();

    let max_val = smoothed_data.iter().cloned().fold(0.0f32, f32::max);
    if max_val < 1e-6 {
        return Vec::new();
    }
    let vote_threshold = params.min_vote_frac * max_val;

    // Non-maximum suppression with `min_sep` as the exclusion radius.
    let nms_r = (min_sep.max(1.0).ceil() as i32).min(w.min(h) as i32 / 2 - 1);
    if nms_r < 1 {
        return Vec::new();
    }
    let nms_r_sq = (nms_r * nms_r) as f32;
    let mut nms_offsets = Vec::new();
    for dy in -nms_r..=nms_r {
        for dx in -nms_r..=nms_r {
            if dx == 0 && dy == 0 {
                continue;
            }
            if (dx * dx + dy * dy) as f32 > nms_r_sq {
                continue;
            }
            nms_offsets.push(dy as isize * stride as isize + dx as isize);
        }
    }

    let mut peaks = Vec::new();
    for y in nms_r..(h as i32 - nms_r) {
        for x in nms_r..(w as i32 - nms_r) {
            let idx = y as usize * stride + x as usize;
            let val = smoothed_data[idx];
            if val < vote_threshold {
                continue;
            }
            let mut is_max = true;
            for &off in &nms_offsets {
                let nidx = idx.wrapping_add_signed(off);
                if smoothed_data[nidx] > val || (smoothed_data[nidx] == val && nidx < idx) {
                    is_max = false;
                    break;
                }
            }
            if is_max {
                peaks.push((x as f32, y as f32, val));
            }
        }
    }
    peaks.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap());
    peaks.truncate(params.max_candidates.max(1) * 2);

    // Recover a radius per peak from the strong-pixel distance histogram.
    // Weighting the vote score by angular coverage ranks a true center
    // (full ring visible) above a displaced peak that only sees arcs.
    let mut candidates = Vec::new();
    for &(px, py, score) in &peaks {
        if let Some((r, coverage)) =
            estimate_radius(&strong, px, py, r_min, r_max, params.min_arc_support)
        {
            candidates.push(CircleCandidate {
                cx: px,
                cy: py,
                r,
                score: score * coverage,
            });
        }
    }

    candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap());
    candidates.truncate(params.max_candidates.max(1));
    candidates
}

const ANGLE_BINS: u32 = 64;

/// Histogram strong-pixel distances from `(px, py)` in 1 px bins and return
/// the best-supported radius with its angular coverage, or `None` when no
/// radius reaches `min_arc_support` coverage.
///
/// Bin weights are gradient magnitudes normalized by distance so larger
/// annuli get no head start. Per candidate radius, the pixels within
/// +/-2 px are binned by angle around the center; occupied angular sectors
/// below `min_arc_support` of the full turn mean the support is a short arc
/// rather than a circle, and the radius is dropped.
fn estimate_radius(
    strong: &[StrongPixel],
    px: f32,
    py: f32,
    r_min: f32,
    r_max: f32,
    min_arc_support: f32,
) -> Option<(f32, f32)> {
    let n_bins = r_max.ceil() as usize + 2;
    let mut weights = vec![0.0f32; n_bins];
    let mut sectors = vec![0u64; n_bins];
    for p in strong {
        let dx = p.x - px;
        let dy = p.y - py;
        let d = dx.hypot(dy);
        if d < r_min - 1.0 || d > r_max + 1.0 {
            continue;
        }
        let bin = d.round() as usize;
        if bin >= n_bins {
            continue;
        }
        weights[bin] += p.mag / d.max(1.0);
        let turn = dy.atan2(dx) / std::f32::consts::TAU + 0.5;
        let sector = ((turn * ANGLE_BINS as f32) as u32).min(ANGLE_BINS - 1);
        sectors[bin] |= 1u64 << sector;
    }

    smooth_3point(&mut weights);

    let lo = (r_min.floor() as usize).min(n_bins - 1);
    let mut best: Option<(usize, f32, f32)> = None;
    for r in lo..n_bins {
        if weights[r] <= 0.0 {
            continue;
        }
        let win_lo = r.saturating_sub(2);
        let win_hi = (r + 2).min(n_bins - 1);
        let mut occupied = 0u64;
        for s in &sectors[win_lo..=win_hi] {
            occupied |= s;
        }
        let coverage = occupied.count_ones() as f32 / ANGLE_BINS as f32;
        if coverage < min_arc_support {
            continue;
        }
        let score = weights[r] * coverage;
        if best.map_or(true, |(_, _, s)| score > s) {
            best = Some((r, coverage, score));
        }
    }

    best.map(|(r, coverage, _)| (r as f32, coverage))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Dark disc on a bright background.
    fn make_disc_image(w: u32, h: u32, cx: f32, cy: f32, radius: f32) -> GrayImage {
        let mut img = GrayImage::new(w, h);
        for y in 0..h {
            for x in 0..w {
                let dx = x as f32 - cx;
                let dy = y as f32 - cy;
                let dist = (dx * dx + dy * dy).sqrt();
                let val = if dist <= radius { 20u8 } else { 220u8 };
                img.put_pixel(x, y, image::Luma([val]));
            }
        }
        img
    }

    #[test]
    fn finds_disc_center_and_radius() {
        let (cx, cy, r) = (60.0f32, 55.0f32, 18.0f32);
        let img = make_disc_image(120, 120, cx, cy, r);
        let params = HoughParams::default();

        let found = find_circles(&img, 5.0, 40.0, 15.0, &params);
        assert!(!found.is_empty(), "should find the disc");
        let best = &found[0];
        let err = (best.cx - cx).hypot(best.cy - cy);
        assert!(err < 3.0, "center error {err}");
        assert!((best.r - r).abs() < 3.0, "radius {} vs {}", best.r, r);
    }

    #[test]
    fn no_candidates_on_uniform_image() {
        let img = GrayImage::from_pixel(80, 80, image::Luma([200]));
        let found = find_circles(&img, 5.0, 30.0, 10.0, &HoughParams::default());
        assert!(found.is_empty());
    }

    #[test]
    fn radius_range_excludes_disc_edge() {
        // The disc edge sits at r = 15; searching [25, 50] must not
        // fabricate a supported radius. Any vote peak far enough from the
        // disc center to put the edge in range only sees it as an arc.
        let img = make_disc_image(120, 120, 60.0, 60.0, 15.0);
        let found = find_circles(&img, 25.0, 50.0, 12.0, &HoughParams::default());
        assert!(found.is_empty(), "got {:?}", found.first().map(|c| c.r));
    }

    #[test]
    fn short_arc_is_rejected() {
        // A quarter arc covers too little of the angular range to count as
        // a circle from any center.
        let mut img = GrayImage::from_pixel(120, 120, image::Luma([220]));
        for step in 0..360 {
            let t = (step as f32 / 4.0).to_radians();
            for rr in 18..=21 {
                let x = (60.0 + rr as f32 * t.cos()).round() as u32;
                let y = (60.0 + rr as f32 * t.sin()).round() as u32;
                img.put_pixel(x, y, image::Luma([20]));
            }
        }
        let found = find_circles(&img, 5.0, 40.0, 10.0, &HoughParams::default());
        assert!(
            found.is_empty(),
            "got {:?}",
            found.first().map(|c| (c.cx, c.cy, c.r))
        );
    }

    #[test]
    fn ring_outline_radius_is_unbiased() {
        // Thin bright ring on black, like a Canny edge map.
        let mut img = GrayImage::new(160, 160);
        for step in 0..1440 {
            let t = (step as f32 / 4.0).to_radians();
            let x = (80.0 + 30.0 * t.cos()).round() as u32;
            let y = (80.0 + 30.0 * t.sin()).round() as u32;
            img.put_pixel(x, y, image::Luma([255]));
        }
        let found = find_circles(&img, 10.0, 60.0, 20.0, &HoughParams::default());
        assert!(!found.is_empty(), "should find the ring");
        let best = &found[0];
        let err = (best.cx - 80.0).hypot(best.cy - 80.0);
        assert!(err < 3.0, "center error {err}");
        assert!((best.r - 30.0).abs() <= 3.0, "r = {}", best.r);
    }

    #[test]
    fn inner_ring_votes_do_not_displace_outer_circle() {
        // Concentric edge rings like a Canny map of an eye. The inner
        // ring's votes land in an off-center annulus inside the search
        // range; the best candidate must still be the outer circle at the
        // shared center.
        let mut img = GrayImage::new(200, 200);
        for step in 0..2880 {
            let t = (step as f32 / 8.0).to_radians();
            for rr in [24.0f32, 70.0] {
                let x = (100.0 + rr * t.cos()).round() as u32;
                let y = (100.0 + rr * t.sin()).round() as u32;
                img.put_pixel(x, y, image::Luma([255]));
            }
        }
        let found = find_circles(&img, 34.0, 95.0, 24.0, &HoughParams::default());
        assert!(!found.is_empty(), "should find the outer ring");
        let best = &found[0];
        let err = (best.cx - 100.0).hypot(best.cy - 100.0);
        assert!(err <= 3.0, "center ({}, {})", best.cx, best.cy);
        assert!((best.r - 70.0).abs() <= 3.0, "r = {}", best.r);
    }
}
