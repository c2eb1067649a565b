//! Configuration for the circle localization pipeline.

/// Pupil-stage parameters (darkest compact blob).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PupilParams {
    /// Median blur radius in pixels (window side = 2 * radius + 1).
    pub blur_radius: u32,
    /// Erosion steps applied to the inverted image before thresholding.
    ///
    /// Shrinks specular highlights inside the pupil so they do not split
    /// the blob.
    pub erode_steps: u8,
    /// Binary threshold applied to the inverted, eroded image.
    pub threshold: u8,
    /// Minimum contour area (px^2) for a pupil candidate.
    pub min_contour_area: f32,
    /// Minimum center separation in the voting fallback, as a fraction of
    /// min(width, height).
    pub fallback_min_sep_frac: f32,
    /// Minimum voting radius (pixels) in the fallback.
    pub fallback_r_min: f32,
    /// Maximum voting radius in the fallback, as a fraction of
    /// min(width, height).
    pub fallback_r_max_frac: f32,
}

impl Default for PupilParams {
    fn default() -> Self {
        Self {
            blur_radius: 2,
            erode_steps: 2,
            threshold: 220,
            min_contour_area: 30.0,
            fallback_min_sep_frac: 0.125,
            fallback_r_min: 3.0,
            fallback_r_max_frac: 0.25,
        }
    }
}

/// Iris-stage parameters.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct IrisParams {
    /// Canny low threshold for the edge map.
    pub canny_low: f32,
    /// Canny high threshold for the edge map.
    pub canny_high: f32,
    /// Minimum iris radius as a multiple of the pupil radius.
    pub min_radius_factor: f32,
    /// Absolute floor (pixels) for the minimum iris radius.
    pub min_radius_floor: f32,
    /// Accepted candidates must exceed the pupil radius times this factor.
    pub radius_gate_factor: f32,
    /// Containment slack (pixels) when gating voting candidates.
    pub containment_margin: f32,
    /// Pad (pixels) added when enlarging a candidate to contain the pupil.
    pub containment_pad: f32,
    /// Angular samples per circle in the radial-derivative scan.
    pub scan_samples: usize,
    /// Maximum radial span (pixels) covered by the scan.
    pub scan_span: u32,
    /// Synthesized iris radius as a multiple of the pupil radius.
    pub synth_factor: f32,
}

impl Default for IrisParams {
    fn default() -> Self {
        Self {
            canny_low: 50.0,
            canny_high: 150.0,
            min_radius_factor: 1.4,
            min_radius_floor: 10.0,
            radius_gate_factor: 1.2,
            containment_margin: 4.0,
            containment_pad: 2.0,
            scan_samples: 360,
            scan_span: 150,
            synth_factor: 1.8,
        }
    }
}

/// Gradient-voting circle transform parameters.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct HoughParams {
    /// Gradient magnitude threshold (fraction of max gradient).
    pub grad_threshold: f32,
    /// Gaussian sigma for accumulator smoothing.
    pub accum_sigma: f32,
    /// Minimum accumulator value for a center peak (fraction of max).
    pub min_vote_frac: f32,
    /// Minimum fraction of angular sectors around a candidate center that
    /// must contain supporting pixels near the recovered radius.
    pub min_arc_support: f32,
    /// Cap on the number of candidates returned (after score sorting).
    pub max_candidates: usize,
}

impl Default for HoughParams {
    fn default() -> Self {
        Self {
            grad_threshold: 0.05,
            accum_sigma: 2.0,
            min_vote_frac: 0.1,
            min_arc_support: 0.3,
            max_candidates: 8,
        }
    }
}

/// Top-level configuration for [`locate`](super::locate).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LocateConfig {
    pub pupil: PupilParams,
    pub iris: IrisParams,
    pub hough: HoughParams,
    /// Middle-circle interpolation weight between pupil and iris radii.
    ///
    /// A fixed-ratio placeholder rather than a detected boundary; kept as a
    /// knob so a derivative-based middle-boundary pass can replace it.
    pub middle_ratio: f32,
}

impl Default for LocateConfig {
    fn default() -> Self {
        Self {
            pupil: PupilParams::default(),
            iris: IrisParams::default(),
            hough: HoughParams::default(),
            middle_ratio: 0.3,
        }
    }
}
