//! KML export serializer.
//!
//! Each polyline becomes one `<Placemark>` carrying the feature's label,
//! a `<LineStyle>` colored from the feature's RGB, and a `<LineString>`
//! of geocoded coordinates. KML colors use the format's reversed
//! byte order: `aabbggrr` hex with the alpha channel first.
//!
//! Built by manual string assembly with XML escaping -- the document
//! structure is small and fixed, and this keeps the serializer a pure
//! function with no XML dependency.

use std::fmt::Write;

use maptrace_core::{Calibration, Feature, FeatureCollection, GrayImage, Point, Rgb};

use crate::MIN_EXPORT_POINTS;

/// Line width for placemark styles, in pixels.
const LINE_WIDTH: u32 = 2;

/// Point stride for the elevation-annotated export. Sampling every 5th
/// boundary point bounds the output size for large traced regions.
const ELEVATION_STRIDE: usize = 5;

/// Serialize a feature collection into a KML document.
///
/// Polylines shorter than [`MIN_EXPORT_POINTS`] are dropped as noise.
/// Coordinates are emitted at ground level (`alt` 0, `altitudeMode`
/// omitted). An empty collection produces a valid document with an empty
/// `<Document>` element.
#[must_use]
pub fn to_kml(features: &FeatureCollection, calibration: &Calibration) -> String {
    build_kml(features, calibration, None)
}

/// Serialize a feature collection into KML with synthetic elevation.
///
/// Altitude is sampled from `elevation` (typically the source image's
/// grayscale rendition) at each emitted point and scaled by
/// `vertical_scale` meters per intensity step, with
/// `altitudeMode relativeToGround`. Only every
/// [`ELEVATION_STRIDE`]th boundary point is emitted (plus the final
/// point) to bound output size.
#[must_use]
pub fn to_kml_with_elevation(
    features: &FeatureCollection,
    calibration: &Calibration,
    elevation: &GrayImage,
    vertical_scale: f64,
) -> String {
    build_kml(features, calibration, Some((elevation, vertical_scale)))
}

fn build_kml(
    features: &FeatureCollection,
    calibration: &Calibration,
    elevation: Option<(&GrayImage, f64)>,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    let _ = writeln!(out, r#"<kml xmlns="http://www.opengis.net/kml/2.2">"#);
    let _ = writeln!(out, "<Document>");

    for feature in features {
        write_feature_placemarks(&mut out, feature, calibration, elevation);
    }

    let _ = writeln!(out, "</Document>");
    let _ = writeln!(out, "</kml>");
    out
}

/// Write one `<Placemark>` per exportable polyline of `feature`.
fn write_feature_placemarks(
    out: &mut String,
    feature: &Feature,
    calibration: &Calibration,
    elevation: Option<(&GrayImage, f64)>,
) {
    let color = kml_color(feature.color());
    let name = xml_escape(feature.label());

    for polyline in feature.contours() {
        if polyline.len() < MIN_EXPORT_POINTS {
            continue;
        }

        let _ = writeln!(out, "<Placemark>");
        let _ = writeln!(out, "<name>{name}</name>");
        let _ = writeln!(out, "<Style><LineStyle>");
        let _ = writeln!(out, "<color>{color}</color><width>{LINE_WIDTH}</width>");
        let _ = writeln!(out, "</LineStyle></Style>");
        let _ = writeln!(out, "<LineString><tessellate>1</tessellate>");
        if elevation.is_some() {
            let _ = writeln!(out, "<altitudeMode>relativeToGround</altitudeMode>");
        }
        let _ = writeln!(out, "<coordinates>");

        let coords: Vec<String> = match elevation {
            None => polyline
                .points()
                .iter()
                .map(|p| {
                    let (lon, lat) = calibration.pixel_to_geo(p.x, p.y);
                    format!("{lon:.6},{lat:.6},0")
                })
                .collect(),
            Some((gray, scale)) => strided_points(polyline.points())
                .map(|p| {
                    let (lon, lat) = calibration.pixel_to_geo(p.x, p.y);
                    let alt = f64::from(sample_intensity(gray, p)) * scale;
                    format!("{lon:.6},{lat:.6},{alt:.1}")
                })
                .collect(),
        };
        let _ = writeln!(out, "{}", coords.join(" "));

        let _ = writeln!(out, "</coordinates></LineString>");
        let _ = writeln!(out, "</Placemark>");
    }
}

/// Every [`ELEVATION_STRIDE`]th point, always including the last.
fn strided_points(points: &[Point]) -> impl Iterator<Item = &Point> {
    let last_index = points.len().saturating_sub(1);
    points.iter().enumerate().filter_map(move |(i, p)| {
        (i % ELEVATION_STRIDE == 0 || i == last_index).then_some(p)
    })
}

/// Sample grayscale intensity at the pixel nearest to `p`, clamped to the
/// image borders.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn sample_intensity(gray: &GrayImage, p: &Point) -> u8 {
    let x = (p.x.round().max(0.0) as u32).min(gray.width().saturating_sub(1));
    let y = (p.y.round().max(0.0) as u32).min(gray.height().saturating_sub(1));
    gray.get_pixel(x, y).0[0]
}

/// Convert an RGB color to KML's `aabbggrr` hex convention, fully opaque.
fn kml_color(color: Rgb) -> String {
    format!("ff{:02x}{:02x}{:02x}", color.b, color.g, color.r)
}

/// Escape the five XML special characters for safe embedding in element
/// text content.
///
/// Handles `&` (must be first), `<`, `>`, `"`, and `'`.
fn xml_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}
