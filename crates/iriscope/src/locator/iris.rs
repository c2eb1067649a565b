//! Iris outer-boundary detection, given a located pupil.
//!
//! Primary path runs the gradient-voting circle transform on a Canny edge
//! map and gates candidates on pupil containment. Fallback is a radial
//! intensity-derivative scan around the pupil center: the radius with the
//! strongest mean-intensity transition wins.

use image::GrayImage;

use super::config::LocateConfig;
use super::hough;
use super::profile::mean_along_circle;
use super::IrisSource;
use crate::geometry::Circle;

pub(super) fn detect(
    blurred: &GrayImage,
    pupil: &Circle,
    config: &LocateConfig,
) -> Option<(Circle, IrisSource)> {
    if let Some(circle) = detect_by_edges(blurred, pupil, config) {
        return Some((circle, IrisSource::EdgeHough));
    }
    tracing::debug!("iris edge voting found nothing, trying radial scan");
    radial_scan(blurred, pupil, config).map(|c| (c, IrisSource::RadialScan))
}

fn detect_by_edges(blurred: &GrayImage, pupil: &Circle, config: &LocateConfig) -> Option<Circle> {
    let (w, h) = blurred.dimensions();
    let edges = imageproc::edges::canny(blurred, config.iris.canny_low, config.iris.canny_high);

    let r_min = (pupil.r * config.iris.min_radius_factor).max(config.iris.min_radius_floor);
    let r_max = (w.min(h) as f32 / 2.0).round();
    if r_max <= r_min {
        return None;
    }
    let min_sep = pupil.r.max(1.0);
    let candidates = hough::find_circles(&edges, r_min, r_max, min_sep, &config.hough);
    if candidates.is_empty() {
        return None;
    }

    // Prefer the strongest candidate that is plausibly an iris around this
    // pupil: clearly larger than the pupil and containing it.
    let radius_gate = pupil.r * config.iris.radius_gate_factor;
    for c in &candidates {
        let circle = Circle::new(c.cx, c.cy, c.r);
        let d = circle.center_distance(pupil);
        if c.r > radius_gate && d + pupil.r <= c.r + config.iris.containment_margin {
            return Some(Circle::rounded(c.cx, c.cy, c.r));
        }
    }

    // None satisfied containment: take the candidate whose center is closest
    // to the pupil center and enlarge it until it contains the pupil.
    let nearest = candidates
        .iter()
        .min_by(|a, b| {
            let da = (a.cx - pupil.cx).hypot(a.cy - pupil.cy);
            let db = (b.cx - pupil.cx).hypot(b.cy - pupil.cy);
            da.partial_cmp(&db).unwrap()
        })
        .expect("candidates is non-empty");
    let mut iris = Circle::rounded(nearest.cx, nearest.cy, nearest.r);
    let d = iris.center_distance(pupil);
    if d + pupil.r > iris.r {
        iris.r = (d + pupil.r + config.iris.containment_pad).round();
    }
    Some(iris)
}

/// Sweep concentric circles outward from the pupil center and return the
/// radius with the strongest mean-intensity derivative.
fn radial_scan(blurred: &GrayImage, pupil: &Circle, config: &LocateConfig) -> Option<Circle> {
    let (w, h) = blurred.dimensions();
    let r_start = (pupil.r * config.iris.min_radius_factor)
        .max(pupil.r + 6.0)
        .round() as u32;
    let r_end = (w.min(h) / 2).min(r_start + config.iris.scan_span);
    if r_end <= r_start {
        return None;
    }

    let samples = config.iris.scan_samples;
    let mut prev = mean_along_circle(blurred, pupil.cx, pupil.cy, r_start as f32, samples)?;
    let mut best_r = None;
    let mut best_resp = 0.0f32;
    for r in (r_start + 1)..=r_end {
        let cur = mean_along_circle(blurred, pupil.cx, pupil.cy, r as f32, samples).unwrap_or(prev);
        let resp = (cur - prev).abs();
        if resp > best_resp {
            best_resp = resp;
            best_r = Some(r);
        }
        prev = cur;
    }

    best_r.map(|r| Circle::new(pupil.cx, pupil.cy, r as f32))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Dark pupil disc inside a mid-gray iris disc on a bright background.
    fn make_eye_image(w: u32, h: u32, cx: f32, cy: f32, pupil_r: f32, iris_r: f32) -> GrayImage {
        let mut img = GrayImage::new(w, h);
        for y in 0..h {
            for x in 0..w {
                let d = (x as f32 - cx).hypot(y as f32 - cy);
                let val = if d <= pupil_r {
                    10u8
                } else if d <= iris_r {
                    110u8
                } else {
                    235u8
                };
                img.put_pixel(x, y, image::Luma([val]));
            }
        }
        img
    }

    #[test]
    fn edge_voting_finds_iris_boundary() {
        let img = make_eye_image(220, 220, 110.0, 110.0, 22.0, 70.0);
        let blurred = imageproc::filter::median_filter(&img, 2, 2);
        let pupil = Circle::new(110.0, 110.0, 22.0);
        let (iris, source) = detect(&blurred, &pupil, &LocateConfig::default()).expect("iris");
        assert_eq!(source, IrisSource::EdgeHough);
        assert!((iris.cx - 110.0).abs() <= 4.0, "cx = {}", iris.cx);
        assert!((iris.cy - 110.0).abs() <= 4.0, "cy = {}", iris.cy);
        assert!((iris.r - 70.0).abs() <= 5.0, "r = {}", iris.r);
    }

    #[test]
    fn radial_scan_finds_intensity_step() {
        let img = make_eye_image(200, 200, 100.0, 100.0, 20.0, 60.0);
        let pupil = Circle::new(100.0, 100.0, 20.0);
        let iris = radial_scan(&img, &pupil, &LocateConfig::default()).expect("scan result");
        assert_eq!(iris.cx, 100.0);
        assert_eq!(iris.cy, 100.0);
        assert!((iris.r - 60.0).abs() <= 2.0, "r = {}", iris.r);
    }

    #[test]
    fn radial_scan_flat_background_yields_nothing() {
        // Lone dark disc: every swept circle lies in uniform background.
        let mut img = GrayImage::from_pixel(200, 200, image::Luma([255]));
        for y in 0..200u32 {
            for x in 0..200u32 {
                if (x as f32 - 100.0).hypot(y as f32 - 100.0) <= 20.0 {
                    img.put_pixel(x, y, image::Luma([10]));
                }
            }
        }
        let pupil = Circle::new(100.0, 100.0, 20.0);
        assert!(radial_scan(&img, &pupil, &LocateConfig::default()).is_none());
    }
}
