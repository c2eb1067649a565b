//! iriscope — pupil/iris localization and radial chart normalization.
//!
//! Locates two concentric circular features in an eye photograph — the dark
//! pupil disc and the outer iris boundary — and re-projects the annular
//! region between them so a fixed-proportion reference chart overlays
//! consistently regardless of the subject's actual pupil/iris proportions.
//! The pipeline stages are:
//!
//! 1. **Pupil** – invert/erode/threshold the grayscale image, take the
//!    largest external contour and its minimum enclosing circle; fall back
//!    to gradient-voting circle detection.
//! 2. **Iris** – Canny edges + gradient-voting circle transform gated on
//!    pupil containment; fall back to a radial intensity-derivative scan;
//!    last resort is a geometric estimate from the pupil radius.
//! 3. **Extract** – crop the iris disc onto a padded white square canvas.
//! 4. **Warp** – piecewise-linear radial remapping (backward polar lookup
//!    with bilinear sampling) that moves the chart's fixed radius
//!    breakpoints onto the detected ones.
//!
//! # Public API
//! - [`locate`] / [`locate_image`] with [`LocateConfig`] produce
//!   [`EyeCircles`] or [`LocateError`].
//! - [`extract`] crops the iris disc; [`warp`] with [`RadialMapping`]
//!   rescales a reference diagram.
//! - [`chart`] holds the embedded zone/sector tables and the point-to-region
//!   query used by outer surfaces for hover-style lookups.

pub mod chart;
pub mod extract;
pub mod geometry;
pub mod locator;
pub mod warp;

pub use chart::{EyeSide, RadialZone, Region, Sector};
pub use extract::extract;
pub use geometry::{Circle, GeometryError};
pub use locator::{
    locate, locate_image, EyeCircles, IrisSource, LocateConfig, LocateError, PupilSource,
};
pub use warp::{warp, RadialMapping};
