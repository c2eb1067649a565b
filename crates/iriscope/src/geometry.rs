//! Circle primitives and geometric validation shared by all pipeline stages.

/// A circle in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Circle {
    /// Center x (pixels).
    pub cx: f32,
    /// Center y (pixels).
    pub cy: f32,
    /// Radius (pixels).
    pub r: f32,
}

impl Circle {
    pub fn new(cx: f32, cy: f32, r: f32) -> Self {
        Self { cx, cy, r }
    }

    /// Construct with all three components rounded to whole pixels.
    pub fn rounded(cx: f32, cy: f32, r: f32) -> Self {
        Self {
            cx: cx.round(),
            cy: cy.round(),
            r: r.round(),
        }
    }

    /// Euclidean distance between the two centers.
    pub fn center_distance(&self, other: &Circle) -> f32 {
        (self.cx - other.cx).hypot(self.cy - other.cy)
    }

    /// `true` when `inner` lies entirely within this circle, up to `margin`
    /// pixels of slack.
    pub fn contains_circle(&self, inner: &Circle, margin: f32) -> bool {
        self.center_distance(inner) + inner.r <= self.r + margin
    }

    /// `true` when all components are finite and the radius is positive.
    pub fn is_valid(&self) -> bool {
        self.cx.is_finite() && self.cy.is_finite() && self.r.is_finite() && self.r > 0.0
    }
}

/// Errors raised when geometric parameters are rejected at component entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryError {
    /// A coordinate, radius, or ratio is NaN or infinite.
    NonFiniteInput,
    /// A circle radius is zero or negative.
    NonPositiveRadius,
    /// A breakpoint ratio falls outside `(0, 1]`.
    RatioOutOfRange,
    /// An inner breakpoint ratio is not strictly below its middle ratio.
    RatioOrder,
    /// The pupil radius is not strictly below the iris radius.
    RadiusOrder,
}

impl std::fmt::Display for GeometryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonFiniteInput => write!(f, "non-finite geometric input"),
            Self::NonPositiveRadius => write!(f, "radius must be positive"),
            Self::RatioOutOfRange => write!(f, "breakpoint ratio outside (0, 1]"),
            Self::RatioOrder => write!(f, "inner ratio must be below middle ratio"),
            Self::RadiusOrder => write!(f, "pupil radius must be below iris radius"),
        }
    }
}

impl std::error::Error for GeometryError {}

const MEC_EPS: f64 = 1e-4;

/// Minimum enclosing circle of a point set (Welzl, randomized incremental).
///
/// Runs in expected linear time after a deterministic shuffle. Returns
/// `None` for an empty input.
pub fn min_enclosing_circle(points: &[[f32; 2]]) -> Option<Circle> {
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    if points.is_empty() {
        return None;
    }

    let mut pts: Vec<[f64; 2]> = points.iter().map(|p| [p[0] as f64, p[1] as f64]).collect();
    let mut rng = rand::rngs::StdRng::seed_from_u64(17);
    pts.shuffle(&mut rng);

    let mut c = (pts[0], 0.0f64);
    for i in 1..pts.len() {
        if in_circle(&c, pts[i]) {
            continue;
        }
        c = (pts[i], 0.0);
        for j in 0..i {
            if in_circle(&c, pts[j]) {
                continue;
            }
            c = circle_two(pts[i], pts[j]);
            for k in 0..j {
                if !in_circle(&c, pts[k]) {
                    c = circle_three(pts[i], pts[j], pts[k]);
                }
            }
        }
    }

    Some(Circle::new(c.0[0] as f32, c.0[1] as f32, c.1 as f32))
}

fn in_circle(c: &([f64; 2], f64), p: [f64; 2]) -> bool {
    let dx = p[0] - c.0[0];
    let dy = p[1] - c.0[1];
    (dx * dx + dy * dy).sqrt() <= c.1 + MEC_EPS
}

fn circle_two(a: [f64; 2], b: [f64; 2]) -> ([f64; 2], f64) {
    let center = [(a[0] + b[0]) / 2.0, (a[1] + b[1]) / 2.0];
    let r = ((a[0] - b[0]).hypot(a[1] - b[1])) / 2.0;
    (center, r)
}

/// Circumcircle of three points; degenerates to the widest two-point circle
/// when the points are (near-)collinear.
fn circle_three(a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> ([f64; 2], f64) {
    let d = 2.0 * (a[0] * (b[1] - c[1]) + b[0] * (c[1] - a[1]) + c[0] * (a[1] - b[1]));
    if d.abs() < 1e-12 {
        let ab = circle_two(a, b);
        let ac = circle_two(a, c);
        let bc = circle_two(b, c);
        let mut best = ab;
        if ac.1 > best.1 {
            best = ac;
        }
        if bc.1 > best.1 {
            best = bc;
        }
        return best;
    }
    let a2 = a[0] * a[0] + a[1] * a[1];
    let b2 = b[0] * b[0] + b[1] * b[1];
    let c2 = c[0] * c[0] + c[1] * c[1];
    let ux = (a2 * (b[1] - c[1]) + b2 * (c[1] - a[1]) + c2 * (a[1] - b[1])) / d;
    let uy = (a2 * (c[0] - b[0]) + b2 * (a[0] - c[0]) + c2 * (b[0] - a[0])) / d;
    let r = (a[0] - ux).hypot(a[1] - uy);
    ([ux, uy], r)
}
