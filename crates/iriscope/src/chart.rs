//! Embedded iridology chart model: radial zones and per-eye sector tables.
//!
//! Angular positions use clock units in 60ths of a turn, 0 at 12 o'clock,
//! increasing clockwise. Radial zone ratios are fractions of the
//! pupil-to-iris band, not of the full iris radius.

use crate::geometry::Circle;

/// Left or right eye; the sector tables differ between the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EyeSide {
    Left,
    Right,
}

impl std::fmt::Display for EyeSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Left => write!(f, "left"),
            Self::Right => write!(f, "right"),
        }
    }
}

/// A named annular zone between pupil and iris.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadialZone {
    pub name: &'static str,
    /// Inner boundary as a fraction of the pupil-to-iris band.
    pub inner_ratio: f32,
    /// Outer boundary as a fraction of the pupil-to-iris band.
    pub outer_ratio: f32,
}

/// A named angular sector in clock units (60ths of a turn).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sector {
    pub name: &'static str,
    pub start_clock: f32,
    pub end_clock: f32,
}

/// The five radial zones, innermost first.
pub const RADIAL_ZONES: [RadialZone; 5] = [
    RadialZone { name: "Stomach", inner_ratio: 0.0, outer_ratio: 0.35 },
    RadialZone { name: "Intestines", inner_ratio: 0.35, outer_ratio: 0.65 },
    RadialZone { name: "Organs/Glands", inner_ratio: 0.65, outer_ratio: 0.85 },
    RadialZone { name: "Circulation/Lymph", inner_ratio: 0.85, outer_ratio: 0.95 },
    RadialZone { name: "Skin/Elimination", inner_ratio: 0.95, outer_ratio: 1.0 },
];

const LEFT_SECTORS: [Sector; 18] = [
    Sector { name: "Throat", start_clock: 0.0, end_clock: 3.0 },
    Sector { name: "Bronchi", start_clock: 3.0, end_clock: 7.0 },
    Sector { name: "Thyroid", start_clock: 7.0, end_clock: 10.0 },
    Sector { name: "Shoulder (L)", start_clock: 10.0, end_clock: 13.0 },
    Sector { name: "Arm (L)", start_clock: 13.0, end_clock: 17.0 },
    Sector { name: "Spleen", start_clock: 17.0, end_clock: 21.0 },
    Sector { name: "Stomach", start_clock: 21.0, end_clock: 25.0 },
    Sector { name: "Kidney (L)", start_clock: 25.0, end_clock: 29.0 },
    Sector { name: "Pancreas", start_clock: 29.0, end_clock: 31.0 },
    Sector { name: "Adrenal (L)", start_clock: 31.0, end_clock: 33.0 },
    Sector { name: "Descending Colon", start_clock: 33.0, end_clock: 38.0 },
    Sector { name: "Transverse Colon", start_clock: 38.0, end_clock: 40.0 },
    Sector { name: "Hip/Leg (L)", start_clock: 40.0, end_clock: 45.0 },
    Sector { name: "Lower Back", start_clock: 45.0, end_clock: 48.0 },
    Sector { name: "Sacral/Coccyx", start_clock: 48.0, end_clock: 50.0 },
    Sector { name: "Prostate/Uterus", start_clock: 50.0, end_clock: 53.0 },
    Sector { name: "Bladder", start_clock: 53.0, end_clock: 55.0 },
    Sector { name: "Lung (L)", start_clock: 55.0, end_clock: 60.0 },
];

const RIGHT_SECTORS: [Sector; 18] = [
    Sector { name: "Throat", start_clock: 0.0, end_clock: 3.0 },
    Sector { name: "Bronchi", start_clock: 3.0, end_clock: 7.0 },
    Sector { name: "Thyroid", start_clock: 7.0, end_clock: 10.0 },
    Sector { name: "Shoulder (R)", start_clock: 10.0, end_clock: 13.0 },
    Sector { name: "Arm (R)", start_clock: 13.0, end_clock: 17.0 },
    Sector { name: "Gallbladder", start_clock: 17.0, end_clock: 19.0 },
    Sector { name: "Liver", start_clock: 19.0, end_clock: 25.0 },
    Sector { name: "Kidney (R)", start_clock: 25.0, end_clock: 29.0 },
    Sector { name: "Appendix", start_clock: 29.0, end_clock: 31.0 },
    Sector { name: "Ileocecal Valve", start_clock: 31.0, end_clock: 33.0 },
    Sector { name: "Ascending Colon", start_clock: 33.0, end_clock: 38.0 },
    Sector { name: "Transverse Colon", start_clock: 38.0, end_clock: 40.0 },
    Sector { name: "Hip/Leg (R)", start_clock: 40.0, end_clock: 45.0 },
    Sector { name: "Lower Back", start_clock: 45.0, end_clock: 48.0 },
    Sector { name: "Sacral/Coccyx", start_clock: 48.0, end_clock: 50.0 },
    Sector { name: "Prostate/Uterus", start_clock: 50.0, end_clock: 53.0 },
    Sector { name: "Bladder", start_clock: 53.0, end_clock: 55.0 },
    Sector { name: "Lung (R)", start_clock: 55.0, end_clock: 60.0 },
];

/// Sector table for one eye.
pub fn sectors(side: EyeSide) -> &'static [Sector] {
    match side {
        EyeSide::Left => &LEFT_SECTORS,
        EyeSide::Right => &RIGHT_SECTORS,
    }
}

/// Chart region an image point falls into.
#[derive(Debug, Clone, Copy)]
pub struct Region {
    pub sector: Option<&'static Sector>,
    pub zone: Option<&'static RadialZone>,
    /// Angular position in clock units.
    pub clock: f32,
    /// Radial position as a fraction of the pupil-to-iris band.
    pub band_ratio: f32,
}

/// Look up the chart region for an image point, or `None` when the point
/// lies inside the pupil or outside the iris.
pub fn region_at(pupil: &Circle, iris: &Circle, x: f32, y: f32, side: EyeSide) -> Option<Region> {
    let dx = x - iris.cx;
    let dy = y - iris.cy;
    let distance = dx.hypot(dy);
    if distance < pupil.r || distance > iris.r {
        return None;
    }

    let mut angle = dy.atan2(dx).to_degrees() + 90.0;
    if angle < 0.0 {
        angle += 360.0;
    }
    let clock = angle / 360.0 * 60.0;

    let band_ratio = (distance - pupil.r) / (iris.r - pupil.r);
    let sector = sectors(side)
        .iter()
        .find(|s| clock >= s.start_clock && clock < s.end_clock);
    let zone = RADIAL_ZONES
        .iter()
        .find(|z| band_ratio >= z.inner_ratio && band_ratio < z.outer_ratio);

    if sector.is_none() && zone.is_none() {
        return None;
    }
    Some(Region {
        sector,
        zone,
        clock,
        band_ratio,
    })
}
