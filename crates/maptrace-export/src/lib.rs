//! maptrace-export: pure format serializers (sans-IO).
//!
//! Converts a geocoded [`FeatureCollection`](maptrace_core::FeatureCollection)
//! into GeoJSON or KML text. Both serializers are pure functions: features
//! and a calibration in, a `String` out.

pub mod geojson;
pub mod kml;

pub use geojson::to_geojson;
pub use kml::{to_kml, to_kml_with_elevation};

/// Minimum point count for an exported polyline.
///
/// Shorter boundaries are pixel-scale noise from the tracer and are
/// dropped by both serializers.
pub const MIN_EXPORT_POINTS: usize = 5;

/// Errors that can occur during export serialization.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// JSON serialization failed.
    #[error("failed to serialize GeoJSON: {0}")]
    Json(#[from] serde_json::Error),
}
