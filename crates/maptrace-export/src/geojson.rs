//! GeoJSON export serializer.
//!
//! Each polyline becomes one GeoJSON `Feature` with a `LineString`
//! geometry of `[lon, lat]` positions and properties carrying the source
//! feature's label and RGB color. Polylines shorter than
//! [`MIN_EXPORT_POINTS`](crate::MIN_EXPORT_POINTS) are dropped as noise;
//! otherwise every geocoded point is emitted.
//!
//! An empty feature collection serializes to a valid, empty
//! `FeatureCollection` document.

use serde::Serialize;

use maptrace_core::{Calibration, FeatureCollection};

use crate::{ExportError, MIN_EXPORT_POINTS};

/// Top-level GeoJSON document.
#[derive(Serialize)]
struct GeoJsonDocument {
    #[serde(rename = "type")]
    kind: &'static str,
    features: Vec<GeoJsonFeature>,
}

#[derive(Serialize)]
struct GeoJsonFeature {
    #[serde(rename = "type")]
    kind: &'static str,
    geometry: GeoJsonGeometry,
    properties: GeoJsonProperties,
}

#[derive(Serialize)]
struct GeoJsonGeometry {
    #[serde(rename = "type")]
    kind: &'static str,
    coordinates: Vec<[f64; 2]>,
}

#[derive(Serialize)]
struct GeoJsonProperties {
    label: String,
    color: [u8; 3],
}

/// Serialize a feature collection into pretty-printed GeoJSON.
///
/// Every polyline point is geocoded through `calibration`; the exported
/// coordinate count equals the polyline's point count (no resampling).
///
/// # Errors
///
/// Returns [`ExportError::Json`] if JSON serialization fails.
pub fn to_geojson(
    features: &FeatureCollection,
    calibration: &Calibration,
) -> Result<String, ExportError> {
    let geojson_features = features
        .iter()
        .flat_map(|feature| {
            feature
                .contours()
                .iter()
                .filter(|pl| pl.len() >= MIN_EXPORT_POINTS)
                .map(move |polyline| {
                    let coordinates = polyline
                        .points()
                        .iter()
                        .map(|p| {
                            let (lon, lat) = calibration.pixel_to_geo(p.x, p.y);
                            [lon, lat]
                        })
                        .collect();
                    GeoJsonFeature {
                        kind: "Feature",
                        geometry: GeoJsonGeometry {
                            kind: "LineString",
                            coordinates,
                        },
                        properties: GeoJsonProperties {
                            label: feature.label().to_owned(),
                            color: feature.color().channels(),
                        },
                    }
                })
        })
        .collect();

    let document = GeoJsonDocument {
        kind: "FeatureCollection",
        features: geojson_features,
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use maptrace_core::{Feature, GeoBox, PixelBox, Point, Polyline, Rgb};

    fn andes_calibration() -> Calibration {
        Calibration::new(
            PixelBox::try_new(0, 0, 100, 100).unwrap(),
            GeoBox::try_new(-71.0, -66.8, -15.0, -17.5).unwrap(),
        )
    }

    fn five_point_polyline() -> Polyline {
        Polyline::new(vec![
            Point::new(0.0, 0.0),
            Point::new(25.0, 0.0),
            Point::new(50.0, 50.0),
            Point::new(75.0, 75.0),
            Point::new(100.0, 100.0),
        ])
    }

    fn collection_with(contours: Vec<Polyline>) -> FeatureCollection {
        let mut collection = FeatureCollection::new();
        collection.add(Feature::new(
            Rgb::new(120, 80, 40),
            "terrain".to_owned(),
            contours,
        ));
        collection
    }

    #[test]
    fn empty_collection_is_valid_empty_document() {
        let geojson = to_geojson(&FeatureCollection::new(), &andes_calibration()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&geojson).unwrap();
        assert_eq!(parsed["type"], "FeatureCollection");
        assert_eq!(parsed["features"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn one_feature_per_polyline() {
        let collection = collection_with(vec![five_point_polyline(), five_point_polyline()]);
        let geojson = to_geojson(&collection, &andes_calibration()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&geojson).unwrap();
        assert_eq!(parsed["features"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn coordinate_count_matches_point_count() {
        let collection = collection_with(vec![five_point_polyline()]);
        let geojson = to_geojson(&collection, &andes_calibration()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&geojson).unwrap();
        let coords = parsed["features"][0]["geometry"]["coordinates"]
            .as_array()
            .unwrap();
        assert_eq!(coords.len(), 5);
    }

    #[test]
    fn short_polylines_are_dropped() {
        let collection = collection_with(vec![
            Polyline::new(vec![
                Point::new(0.0, 0.0),
                Point::new(1.0, 1.0),
                Point::new(2.0, 2.0),
                Point::new(3.0, 3.0),
            ]),
            five_point_polyline(),
        ]);
        let geojson = to_geojson(&collection, &andes_calibration()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&geojson).unwrap();
        assert_eq!(parsed["features"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn coordinates_are_geocoded() {
        let collection = collection_with(vec![five_point_polyline()]);
        let geojson = to_geojson(&collection, &andes_calibration()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&geojson).unwrap();
        let coords = parsed["features"][0]["geometry"]["coordinates"]
            .as_array()
            .unwrap();

        // First point (0, 0) is the NW corner.
        assert!((coords[0][0].as_f64().unwrap() - -71.0).abs() < 1e-9);
        assert!((coords[0][1].as_f64().unwrap() - -15.0).abs() < 1e-9);
        // Third point (50, 50) is the center of the Andes extent.
        assert!((coords[2][0].as_f64().unwrap() - -68.9).abs() < 1e-9);
        assert!((coords[2][1].as_f64().unwrap() - -16.25).abs() < 1e-9);
    }

    #[test]
    fn properties_carry_label_and_color() {
        let collection = collection_with(vec![five_point_polyline()]);
        let geojson = to_geojson(&collection, &andes_calibration()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&geojson).unwrap();
        let props = &parsed["features"][0]["properties"];
        assert_eq!(props["label"], "terrain");
        assert_eq!(props["color"], serde_json::json!([120, 80, 40]));
    }

    #[test]
    fn geometry_type_is_line_string() {
        let collection = collection_with(vec![five_point_polyline()]);
        let geojson = to_geojson(&collection, &andes_calibration()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&geojson).unwrap();
        assert_eq!(parsed["features"][0]["type"], "Feature");
        assert_eq!(parsed["features"][0]["geometry"]["type"], "LineString");
    }

    #[test]
    fn output_is_pretty_printed() {
        let geojson = to_geojson(&FeatureCollection::new(), &andes_calibration()).unwrap();
        assert!(geojson.contains('\n'), "expected indented output");
    }
}
