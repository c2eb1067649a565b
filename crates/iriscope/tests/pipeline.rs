//! End-to-end pipeline checks on synthetic eye images.

use image::{GrayImage, Luma, Rgba, RgbaImage};
use iriscope::{extract, locate, warp, Circle, IrisSource, LocateConfig, RadialMapping};

/// Dark pupil disc inside a mid-gray iris disc on a bright background.
fn make_eye(w: u32, h: u32, cx: f32, cy: f32, pupil_r: f32, iris_r: f32) -> GrayImage {
    let mut img = GrayImage::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let d = (x as f32 - cx).hypot(y as f32 - cy);
            let val = if d <= pupil_r {
                12u8
            } else if d <= iris_r {
                115u8
            } else {
                235u8
            };
            img.put_pixel(x, y, Luma([val]));
        }
    }
    img
}

#[test]
fn locate_satisfies_invariants_on_synthetic_eye() {
    let (cx, cy, pupil_r, iris_r) = (128.0, 120.0, 24.0, 75.0);
    let gray = make_eye(256, 256, cx, cy, pupil_r, iris_r);
    let result = locate(&gray, &LocateConfig::default()).expect("detection");

    // Localization accuracy.
    assert!((result.pupil.cx - cx).abs() <= 3.0, "pupil cx {}", result.pupil.cx);
    assert!((result.pupil.cy - cy).abs() <= 3.0, "pupil cy {}", result.pupil.cy);
    assert!((result.pupil.r - pupil_r).abs() <= 4.0, "pupil r {}", result.pupil.r);
    assert!((result.iris.r - iris_r).abs() <= 6.0, "iris r {}", result.iris.r);
    assert!(!result.iris_source.is_estimated());

    // Ordering invariant.
    assert!(result.pupil.r < result.middle_circle.r);
    assert!(result.middle_circle.r < result.iris.r);

    // Containment invariant with tolerance.
    let d = result.iris.center_distance(&result.pupil);
    assert!(d + result.pupil.r <= result.iris.r + 4.0);

    // Middle circle shares the iris center and the interpolation formula.
    assert_eq!(result.middle_circle.cx, result.iris.cx);
    assert_eq!(result.middle_circle.cy, result.iris.cy);
    let expected = (result.pupil.r + 0.3 * (result.iris.r - result.pupil.r)).round();
    assert_eq!(result.middle_circle.r, expected);
}

#[test]
fn iris_radius_is_clamped_to_image_half_dimension() {
    // Large pupil near the frame so the synthesized iris would overflow.
    let gray = make_eye(120, 120, 60.0, 60.0, 30.0, 58.0);
    let result = locate(&gray, &LocateConfig::default()).expect("detection");
    assert!(result.iris.r <= 60.0);
}

#[test]
fn extract_then_warp_roundtrip() {
    let gray = make_eye(256, 256, 128.0, 128.0, 24.0, 75.0);
    let result = locate(&gray, &LocateConfig::default()).expect("detection");

    let rgba = RgbaImage::from_fn(256, 256, |x, y| {
        let v = gray.get_pixel(x, y)[0];
        Rgba([v, v, v, 255])
    });
    let disc = extract(&rgba, &result.iris, &result.pupil).expect("extract");
    let pad = (result.iris.r * 0.4).round();
    let expected_side = (result.iris.r * 2.0 + pad * 2.0).round() as u32;
    assert_eq!(disc.width(), expected_side);
    assert_eq!(disc.height(), disc.width());

    // Corners are padding.
    assert_eq!(disc.get_pixel(0, 0).0, [255, 255, 255, 255]);
    // Canvas center holds the pupil.
    let c = disc.width() / 2;
    assert_eq!(disc.get_pixel(c, c).0[0], 12);

    // Warp a same-size diagram to the detected proportions.
    let diagram = RgbaImage::from_pixel(disc.width(), disc.height(), Rgba([10, 200, 10, 255]));
    let mapping = RadialMapping::new(
        result.pupil.r / result.iris.r,
        result.middle_circle.r / result.iris.r,
    );
    let warped = warp(&diagram, &mapping).expect("warp");
    assert_eq!(warped.dimensions(), diagram.dimensions());
    // Interior stays opaque; the mapping only redistributes radii.
    assert_eq!(warped.get_pixel(c, c).0[3], 255);
}

#[test]
fn detection_result_serializes() {
    let gray = make_eye(256, 256, 128.0, 128.0, 24.0, 75.0);
    let result = locate(&gray, &LocateConfig::default()).expect("detection");
    let json = serde_json::to_string(&result).expect("serialize");
    let back: iriscope::EyeCircles = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back.pupil.r, result.pupil.r);
    assert_eq!(back.iris_source, result.iris_source);
}

#[test]
fn off_center_pupil_keeps_containment() {
    // Pupil displaced from the iris center; the containment pass must hold.
    let mut gray = GrayImage::from_pixel(256, 256, Luma([235]));
    for y in 0..256u32 {
        for x in 0..256u32 {
            let d_iris = (x as f32 - 128.0).hypot(y as f32 - 128.0);
            if d_iris <= 75.0 {
                gray.put_pixel(x, y, Luma([115]));
            }
            let d_pupil = (x as f32 - 138.0).hypot(y as f32 - 124.0);
            if d_pupil <= 22.0 {
                gray.put_pixel(x, y, Luma([12]));
            }
        }
    }
    let result = locate(&gray, &LocateConfig::default()).expect("detection");
    let d = result.iris.center_distance(&result.pupil);
    assert!(
        d + result.pupil.r <= result.iris.r + 4.0,
        "containment violated: d = {d}, pupil r = {}, iris r = {}",
        result.pupil.r,
        result.iris.r
    );
}

#[test]
fn synthesized_iris_scenario() {
    let mut gray = GrayImage::from_pixel(300, 300, Luma([255]));
    for y in 0..300u32 {
        for x in 0..300u32 {
            if (x as f32 - 150.0).hypot(y as f32 - 150.0) <= 25.0 {
                gray.put_pixel(x, y, Luma([8]));
            }
        }
    }
    let result = locate(&gray, &LocateConfig::default()).expect("pupil must be found");
    assert_eq!(result.iris_source, IrisSource::Synthesized);
    assert_eq!(result.iris.r, (result.pupil.r * 1.8).round());
    assert_eq!(result.iris.cx, result.pupil.cx);
}

#[test]
fn region_lookup_uses_detected_circles() {
    let pupil = Circle::new(128.0, 128.0, 24.0);
    let iris = Circle::new(128.0, 128.0, 75.0);
    let region = iriscope::chart::region_at(&pupil, &iris, 128.0, 80.0, iriscope::EyeSide::Right)
        .expect("inside annulus");
    assert_eq!(region.sector.unwrap().name, "Throat");
}
