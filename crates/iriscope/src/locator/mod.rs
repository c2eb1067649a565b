//! Circle localization pipeline: pupil, iris, and the derived middle circle.
//!
//! Stages run as an ordered cascade with graceful degradation. Losing the
//! pupil is the only fatal outcome; every later stage falls back to an
//! estimate instead of failing, and the chosen path is reported through
//! [`PupilSource`] / [`IrisSource`].

mod config;
mod hough;
mod iris;
mod profile;
mod pupil;

pub use config::{HoughParams, IrisParams, LocateConfig, PupilParams};

use image::{DynamicImage, GrayImage};

use crate::geometry::Circle;

/// Which pipeline stage produced the pupil circle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PupilSource {
    /// Largest thresholded contour, minimum enclosing circle.
    Contour,
    /// Gradient-voting circle transform on the inverted blurred image.
    HoughVoting,
}

/// Which pipeline stage produced the iris circle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IrisSource {
    /// Gradient-voting circle transform on the Canny edge map.
    EdgeHough,
    /// Radial intensity-derivative scan around the pupil center.
    RadialScan,
    /// Geometric last resort: pupil center, radius = 1.8 * pupil radius.
    Synthesized,
}

impl IrisSource {
    /// `true` when the iris was not detected from image evidence but
    /// synthesized from the pupil geometry.
    pub fn is_estimated(&self) -> bool {
        matches!(self, IrisSource::Synthesized)
    }
}

/// Localization result for one eye image.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct EyeCircles {
    pub pupil: Circle,
    pub iris: Circle,
    /// Interpolated boundary between pupil and iris, sharing the iris center.
    pub middle_circle: Circle,
    /// Stage that produced the pupil.
    pub pupil_source: PupilSource,
    /// Stage that produced the iris.
    pub iris_source: IrisSource,
}

/// Errors returned by [`locate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocateError {
    /// No dark compact blob was found by any pupil stage.
    NoPupilFound,
}

impl std::fmt::Display for LocateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoPupilFound => write!(f, "no pupil found"),
        }
    }
}

impl std::error::Error for LocateError {}

/// Derive the middle circle from pupil and iris.
///
/// Fixed interpolation at the iris center; not a detected boundary.
pub fn middle_circle(pupil: &Circle, iris: &Circle, ratio: f32) -> Circle {
    Circle {
        cx: iris.cx,
        cy: iris.cy,
        r: (pupil.r + ratio * (iris.r - pupil.r)).round(),
    }
}

/// Locate pupil, iris, and middle circle in a grayscale image.
///
/// The only failure is [`LocateError::NoPupilFound`]; once a pupil exists an
/// iris is always returned, synthesized if necessary.
pub fn locate(gray: &GrayImage, config: &LocateConfig) -> Result<EyeCircles, LocateError> {
    let (w, h) = gray.dimensions();
    if w < 8 || h < 8 {
        return Err(LocateError::NoPupilFound);
    }

    let blurred =
        imageproc::filter::median_filter(gray, config.pupil.blur_radius, config.pupil.blur_radius);

    let (pupil, pupil_source) =
        pupil::detect(gray, &blurred, config).ok_or(LocateError::NoPupilFound)?;
    tracing::debug!(
        cx = pupil.cx,
        cy = pupil.cy,
        r = pupil.r,
        source = ?pupil_source,
        "pupil located"
    );

    let (mut iris, iris_source) = iris::detect(&blurred, &pupil, config).unwrap_or_else(|| {
        let synthesized = Circle::new(
            pupil.cx,
            pupil.cy,
            (pupil.r * config.iris.synth_factor).round(),
        );
        tracing::warn!(r = synthesized.r, "iris not detected, synthesizing from pupil");
        (synthesized, IrisSource::Synthesized)
    });

    // Force containment, then clamp to the image half-dimension.
    let d = iris.center_distance(&pupil);
    if d + pupil.r > iris.r {
        iris.r = (d + pupil.r + config.iris.containment_pad).round();
    }
    let half = (w.min(h) as f32 / 2.0).round();
    if iris.r > half {
        iris.r = half;
    }

    tracing::debug!(
        cx = iris.cx,
        cy = iris.cy,
        r = iris.r,
        source = ?iris_source,
        "iris located"
    );

    let middle = middle_circle(&pupil, &iris, config.middle_ratio);

    Ok(EyeCircles {
        pupil,
        iris,
        middle_circle: middle,
        pupil_source,
        iris_source,
    })
}

/// Convenience wrapper converting any decoded image to grayscale first.
pub fn locate_image(img: &DynamicImage, config: &LocateConfig) -> Result<EyeCircles, LocateError> {
    locate(&img.to_luma8(), config)
}
