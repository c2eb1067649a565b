//! Pupil detection: darkest compact blob.
//!
//! Primary path inverts the grayscale image so the pupil becomes the
//! brightest region, erodes away specular highlights, thresholds high, and
//! takes the minimum enclosing circle of the largest external contour.
//! Fallback is the gradient-voting circle transform on the inverted blurred
//! image.

use image::GrayImage;
use imageproc::contours::BorderType;
use imageproc::contrast::ThresholdType;
use imageproc::distance_transform::Norm;

use super::config::LocateConfig;
use super::hough;
use super::PupilSource;
use crate::geometry::{min_enclosing_circle, Circle};

pub(super) fn detect(
    gray: &GrayImage,
    blurred: &GrayImage,
    config: &LocateConfig,
) -> Option<(Circle, PupilSource)> {
    if let Some(circle) = detect_by_contour(gray, config) {
        return Some((circle, PupilSource::Contour));
    }
    tracing::debug!("pupil contour stage found nothing, trying voting fallback");
    detect_by_voting(blurred, config).map(|c| (c, PupilSource::HoughVoting))
}

fn detect_by_contour(gray: &GrayImage, config: &LocateConfig) -> Option<Circle> {
    let mut inv = gray.clone();
    image::imageops::invert(&mut inv);
    // A grayscale min-filter commutes with a fixed threshold, so threshold
    // first and erode the binary mask instead.
    let binary =
        imageproc::contrast::threshold(&inv, config.pupil.threshold, ThresholdType::Binary);
    let eroded = imageproc::morphology::erode(&binary, Norm::L1, config.pupil.erode_steps);

    let contours = imageproc::contours::find_contours::<i32>(&eroded);
    let mut best_area = 0.0f32;
    let mut best: Option<&imageproc::contours::Contour<i32>> = None;
    for contour in &contours {
        if contour.border_type != BorderType::Outer {
            continue;
        }
        let area = contour_area(&contour.points);
        if area > best_area {
            best_area = area;
            best = Some(contour);
        }
    }

    let contour = best?;
    if best_area <= config.pupil.min_contour_area {
        return None;
    }
    let points: Vec<[f32; 2]> = contour
        .points
        .iter()
        .map(|p| [p.x as f32, p.y as f32])
        .collect();
    let c = min_enclosing_circle(&points)?;
    if c.r <= 0.0 {
        return None;
    }
    Some(Circle::rounded(c.cx, c.cy, c.r))
}

fn detect_by_voting(blurred: &GrayImage, config: &LocateConfig) -> Option<Circle> {
    let (w, h) = blurred.dimensions();
    let min_dim = w.min(h) as f32;
    let mut inv = blurred.clone();
    image::imageops::invert(&mut inv);

    let r_min = config.pupil.fallback_r_min;
    let r_max = (min_dim * config.pupil.fallback_r_max_frac).round();
    let min_sep = (min_dim * config.pupil.fallback_min_sep_frac).round();
    let candidates = hough::find_circles(&inv, r_min, r_max, min_sep, &config.hough);
    candidates
        .first()
        .map(|c| Circle::rounded(c.cx, c.cy, c.r))
}

/// Signed shoelace area of a closed contour, returned as a magnitude.
fn contour_area(points: &[imageproc::point::Point<i32>]) -> f32 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut twice_area = 0i64;
    for i in 0..points.len() {
        let p = points[i];
        let q = points[(i + 1) % points.len()];
        twice_area += p.x as i64 * q.y as i64 - q.x as i64 * p.y as i64;
    }
    (twice_area.abs() as f32) / 2.0
}
