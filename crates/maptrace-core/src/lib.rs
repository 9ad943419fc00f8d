//! maptrace-core: color-threshold segmentation and affine geocoding (sans-IO).
//!
//! The kernel behind an interactive map-digitizing tool: load a raster
//! map, calibrate a pixel rectangle against a geographic extent, pick
//! colors, trace same-colored regions into boundary polylines, and hand
//! the labeled results to the export crate as geo-referenced features.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! byte slices and `image` buffers and returns structured data. File and
//! terminal interaction live in the `maptrace` binary; serialization to
//! GeoJSON/KML lives in `maptrace-export`.
//!
//! # Coordinate conventions
//!
//! Pixel coordinates have their origin at the top-left corner with `y`
//! increasing downward. A [`Calibration`] maps the top edge of its pixel
//! rectangle to the northern latitude bound, so latitude decreases as
//! `y` grows. Longitude increases with `x`.

pub mod geocode;
pub mod interact;
pub mod palette;
pub mod raster;
pub mod segment;
pub mod session;
pub mod smooth;
pub mod store;
pub mod types;

pub use geocode::{Calibration, GeoBox, PixelBox};
pub use interact::{Interaction, UiEvent};
pub use session::Session;
pub use store::{Feature, FeatureCollection};
pub use types::{
    CoreError, Dimensions, GrayImage, MAX_RGB_DISTANCE, Point, Polyline, Rgb, RgbImage,
    SegmentConfig,
};
