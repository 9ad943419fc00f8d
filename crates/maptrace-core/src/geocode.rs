//! Affine geocoding: map pixel coordinates inside a calibrated rectangle
//! to geographic (longitude, latitude) pairs.
//!
//! The mapping is two independent linear interpolations. The image origin
//! is the top-left corner and `y` increases downward, so `north` maps to
//! the rectangle's top edge and latitude decreases as `y` grows.
//!
//! Coordinates outside the calibrated rectangle extrapolate along the same
//! affine transform; that is accepted, not an error.

use serde::{Deserialize, Serialize};

use crate::types::CoreError;

/// Geographic bounding rectangle in degrees.
///
/// Invariants `west < east` and `south < north` (and all values finite)
/// are enforced at construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBox {
    west: f64,
    east: f64,
    north: f64,
    south: f64,
}

impl GeoBox {
    /// Create a validated geographic bounding box.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidGeoBox`] when any bound is not finite,
    /// when `west >= east`, or when `south >= north`.
    pub fn try_new(west: f64, east: f64, north: f64, south: f64) -> Result<Self, CoreError> {
        if !(west.is_finite() && east.is_finite() && north.is_finite() && south.is_finite()) {
            return Err(CoreError::InvalidGeoBox(format!(
                "non-finite bound in west={west} east={east} north={north} south={south}"
            )));
        }
        if west >= east {
            return Err(CoreError::InvalidGeoBox(format!(
                "west ({west}) must be less than east ({east})"
            )));
        }
        if south >= north {
            return Err(CoreError::InvalidGeoBox(format!(
                "south ({south}) must be less than north ({north})"
            )));
        }
        Ok(Self {
            west,
            east,
            north,
            south,
        })
    }

    /// Western longitude bound.
    #[must_use]
    pub const fn west(&self) -> f64 {
        self.west
    }

    /// Eastern longitude bound.
    #[must_use]
    pub const fn east(&self) -> f64 {
        self.east
    }

    /// Northern latitude bound.
    #[must_use]
    pub const fn north(&self) -> f64 {
        self.north
    }

    /// Southern latitude bound.
    #[must_use]
    pub const fn south(&self) -> f64 {
        self.south
    }

    /// The (longitude, latitude) center of the box.
    #[must_use]
    pub fn center(&self) -> (f64, f64) {
        (
            f64::midpoint(self.west, self.east),
            f64::midpoint(self.south, self.north),
        )
    }
}

/// Pixel-space bounding rectangle.
///
/// Invariants `x0 < x1` and `y0 < y1` are enforced at construction, which
/// guarantees the geocoder never divides by zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelBox {
    x0: u32,
    y0: u32,
    x1: u32,
    y1: u32,
}

impl PixelBox {
    /// Create a validated pixel rectangle.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidPixelBox`] when `x0 >= x1` or `y0 >= y1`.
    pub fn try_new(x0: u32, y0: u32, x1: u32, y1: u32) -> Result<Self, CoreError> {
        if x0 >= x1 || y0 >= y1 {
            return Err(CoreError::InvalidPixelBox(format!(
                "({x0}, {y0})..({x1}, {y1}) has zero width or height"
            )));
        }
        Ok(Self { x0, y0, x1, y1 })
    }

    /// Create a pixel rectangle from two opposite corners in any order.
    ///
    /// Coordinates are normalized so the result satisfies `x0 < x1` and
    /// `y0 < y1`. Useful for drag rectangles, where the anchor corner may
    /// be on any side of the release corner.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidPixelBox`] when the corners share a row
    /// or column (degenerate rectangle).
    pub fn from_corners(a: (u32, u32), b: (u32, u32)) -> Result<Self, CoreError> {
        Self::try_new(a.0.min(b.0), a.1.min(b.1), a.0.max(b.0), a.1.max(b.1))
    }

    /// Left edge.
    #[must_use]
    pub const fn x0(&self) -> u32 {
        self.x0
    }

    /// Top edge.
    #[must_use]
    pub const fn y0(&self) -> u32 {
        self.y0
    }

    /// Right edge (exclusive of the rectangle's interior width).
    #[must_use]
    pub const fn x1(&self) -> u32 {
        self.x1
    }

    /// Bottom edge.
    #[must_use]
    pub const fn y1(&self) -> u32 {
        self.y1
    }

    /// Rectangle width in pixels. Always at least 1.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.x1 - self.x0
    }

    /// Rectangle height in pixels. Always at least 1.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.y1 - self.y0
    }

    /// Whether a pixel lies within the rectangle (edges inclusive).
    #[must_use]
    pub const fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x0 && x <= self.x1 && y >= self.y0 && y <= self.y1
    }
}

/// Pairs one [`PixelBox`] with one [`GeoBox`].
///
/// Owned by the session and replaced wholesale whenever the user redraws
/// bounds or loads a new image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    pixel: PixelBox,
    geo: GeoBox,
}

impl Calibration {
    /// Pair a pixel rectangle with its geographic extent.
    ///
    /// Both arguments carry their invariants from construction, so the
    /// pairing itself cannot fail.
    #[must_use]
    pub const fn new(pixel: PixelBox, geo: GeoBox) -> Self {
        Self { pixel, geo }
    }

    /// The calibrated pixel rectangle.
    #[must_use]
    pub const fn pixel_box(&self) -> PixelBox {
        self.pixel
    }

    /// The geographic extent of the pixel rectangle.
    #[must_use]
    pub const fn geo_box(&self) -> GeoBox {
        self.geo
    }

    /// Map a pixel coordinate to (longitude, latitude).
    ///
    /// `rx = (x − x0)/(x1 − x0)`, `ry = (y − y0)/(y1 − y0)`, then
    /// `lon = west + rx·(east − west)` and
    /// `lat = north − ry·(north − south)` (latitude decreases downward).
    ///
    /// Points outside the pixel rectangle extrapolate; no clamping.
    #[must_use]
    pub fn pixel_to_geo(&self, x: f64, y: f64) -> (f64, f64) {
        let rx = (x - f64::from(self.pixel.x0)) / f64::from(self.pixel.width());
        let ry = (y - f64::from(self.pixel.y0)) / f64::from(self.pixel.height());
        let lon = rx.mul_add(self.geo.east - self.geo.west, self.geo.west);
        let lat = (-ry).mul_add(self.geo.north - self.geo.south, self.geo.north);
        (lon, lat)
    }

    /// Derive the geographic extent of a sub-rectangle drawn inside an
    /// already-calibrated image.
    ///
    /// Geocodes the sub-rectangle's NW and SE corners through this
    /// calibration. Because the transform is monotonic, the derived bounds
    /// always satisfy the [`GeoBox`] invariants.
    #[must_use]
    pub fn geo_for_sub_box(&self, sub: PixelBox) -> GeoBox {
        let (west, north) = self.pixel_to_geo(f64::from(sub.x0), f64::from(sub.y0));
        let (east, south) = self.pixel_to_geo(f64::from(sub.x1), f64::from(sub.y1));
        GeoBox {
            west,
            east,
            north,
            south,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// The Andes test extent used throughout the original prototypes.
    fn andes() -> GeoBox {
        GeoBox::try_new(-71.0, -66.8, -15.0, -17.5).unwrap()
    }

    fn calibration_100() -> Calibration {
        Calibration::new(PixelBox::try_new(0, 0, 100, 100).unwrap(), andes())
    }

    // --- GeoBox validation ---

    #[test]
    fn geo_box_accepts_valid_bounds() {
        assert!(GeoBox::try_new(-71.0, -66.8, -15.0, -17.5).is_ok());
    }

    #[test]
    fn geo_box_rejects_west_not_less_than_east() {
        assert!(matches!(
            GeoBox::try_new(10.0, 10.0, 5.0, 0.0),
            Err(CoreError::InvalidGeoBox(_))
        ));
        assert!(matches!(
            GeoBox::try_new(20.0, 10.0, 5.0, 0.0),
            Err(CoreError::InvalidGeoBox(_))
        ));
    }

    #[test]
    fn geo_box_rejects_south_not_less_than_north() {
        assert!(matches!(
            GeoBox::try_new(0.0, 10.0, -5.0, 5.0),
            Err(CoreError::InvalidGeoBox(_))
        ));
    }

    #[test]
    fn geo_box_rejects_non_finite() {
        assert!(matches!(
            GeoBox::try_new(f64::NAN, 10.0, 5.0, 0.0),
            Err(CoreError::InvalidGeoBox(_))
        ));
        assert!(matches!(
            GeoBox::try_new(0.0, f64::INFINITY, 5.0, 0.0),
            Err(CoreError::InvalidGeoBox(_))
        ));
    }

    #[test]
    fn geo_box_center() {
        let (lon, lat) = andes().center();
        assert!((lon - -68.9).abs() < 1e-9);
        assert!((lat - -16.25).abs() < 1e-9);
    }

    // --- PixelBox validation ---

    #[test]
    fn pixel_box_rejects_degenerate() {
        assert!(matches!(
            PixelBox::try_new(5, 5, 5, 10),
            Err(CoreError::InvalidPixelBox(_))
        ));
        assert!(matches!(
            PixelBox::try_new(5, 10, 10, 10),
            Err(CoreError::InvalidPixelBox(_))
        ));
    }

    #[test]
    fn pixel_box_from_corners_normalizes() {
        let pb = PixelBox::from_corners((80, 60), (20, 10)).unwrap();
        assert_eq!((pb.x0(), pb.y0(), pb.x1(), pb.y1()), (20, 10, 80, 60));
        assert_eq!(pb.width(), 60);
        assert_eq!(pb.height(), 50);
    }

    #[test]
    fn pixel_box_from_corners_rejects_shared_column() {
        assert!(PixelBox::from_corners((5, 0), (5, 10)).is_err());
    }

    #[test]
    fn pixel_box_contains_edges() {
        let pb = PixelBox::try_new(10, 10, 20, 20).unwrap();
        assert!(pb.contains(10, 10));
        assert!(pb.contains(20, 20));
        assert!(pb.contains(15, 12));
        assert!(!pb.contains(9, 15));
        assert!(!pb.contains(15, 21));
    }

    // --- Affine mapping ---

    #[test]
    fn andes_center_scenario() {
        // GeoBox {west:-71, east:-66.8, north:-15, south:-17.5},
        // PixelBox {0,0,100,100}; pixel (50,50) -> lon -68.9, lat -16.25.
        let (lon, lat) = calibration_100().pixel_to_geo(50.0, 50.0);
        assert!((lon - -68.9).abs() < 1e-9, "lon = {lon}");
        assert!((lat - -16.25).abs() < 1e-9, "lat = {lat}");
    }

    #[test]
    fn corners_round_trip_exactly() {
        let cal = calibration_100();
        let geo = cal.geo_box();

        let (lon, lat) = cal.pixel_to_geo(0.0, 0.0);
        assert!((lon - geo.west()).abs() < 1e-12);
        assert!((lat - geo.north()).abs() < 1e-12);

        let (lon, lat) = cal.pixel_to_geo(100.0, 100.0);
        assert!((lon - geo.east()).abs() < 1e-12);
        assert!((lat - geo.south()).abs() < 1e-12);

        let (lon, lat) = cal.pixel_to_geo(100.0, 0.0);
        assert!((lon - geo.east()).abs() < 1e-12);
        assert!((lat - geo.north()).abs() < 1e-12);

        let (lon, lat) = cal.pixel_to_geo(0.0, 100.0);
        assert!((lon - geo.west()).abs() < 1e-12);
        assert!((lat - geo.south()).abs() < 1e-12);
    }

    #[test]
    fn longitude_increases_with_x_latitude_decreases_with_y() {
        let cal = calibration_100();
        let mut prev_lon = f64::NEG_INFINITY;
        for x in [0.0, 12.5, 50.0, 77.0, 100.0] {
            let (lon, _) = cal.pixel_to_geo(x, 40.0);
            assert!(lon > prev_lon, "lon should increase with x");
            prev_lon = lon;
        }
        let mut prev_lat = f64::INFINITY;
        for y in [0.0, 10.0, 55.5, 90.0, 100.0] {
            let (_, lat) = cal.pixel_to_geo(40.0, y);
            assert!(lat < prev_lat, "lat should decrease with y");
            prev_lat = lat;
        }
    }

    #[test]
    fn points_outside_rectangle_extrapolate() {
        let cal = calibration_100();
        let (lon, lat) = cal.pixel_to_geo(-50.0, 150.0);
        // rx = -0.5 -> west - half the span; ry = 1.5 -> below south.
        assert!((lon - (-71.0 - 2.1)).abs() < 1e-9);
        assert!((lat - (-17.5 - 1.25)).abs() < 1e-9);
    }

    #[test]
    fn offset_pixel_box_shifts_origin() {
        // Calibrated rectangle not anchored at the image origin.
        let cal = Calibration::new(PixelBox::try_new(10, 20, 110, 70).unwrap(), andes());
        let (lon, lat) = cal.pixel_to_geo(10.0, 20.0);
        assert!((lon - -71.0).abs() < 1e-12);
        assert!((lat - -15.0).abs() < 1e-12);
        let (lon, lat) = cal.pixel_to_geo(60.0, 45.0);
        assert!((lon - -68.9).abs() < 1e-9);
        assert!((lat - -16.25).abs() < 1e-9);
    }

    // --- Sub-box derivation ---

    #[test]
    fn sub_box_derives_proportional_extent() {
        let cal = calibration_100();
        let sub = PixelBox::try_new(25, 25, 75, 75).unwrap();
        let derived = cal.geo_for_sub_box(sub);
        assert!((derived.west() - -69.95).abs() < 1e-9);
        assert!((derived.east() - -67.85).abs() < 1e-9);
        assert!((derived.north() - -15.625).abs() < 1e-9);
        assert!((derived.south() - -16.875).abs() < 1e-9);
    }

    #[test]
    fn full_sub_box_reproduces_geo_box() {
        let cal = calibration_100();
        let derived = cal.geo_for_sub_box(cal.pixel_box());
        assert!((derived.west() - cal.geo_box().west()).abs() < 1e-12);
        assert!((derived.east() - cal.geo_box().east()).abs() < 1e-12);
        assert!((derived.north() - cal.geo_box().north()).abs() < 1e-12);
        assert!((derived.south() - cal.geo_box().south()).abs() < 1e-12);
    }

    // --- serde ---

    #[test]
    fn calibration_serde_round_trip() {
        let cal = calibration_100();
        let json = serde_json::to_string(&cal).unwrap();
        let back: Calibration = serde_json::from_str(&json).unwrap();
        assert_eq!(cal, back);
    }
}
