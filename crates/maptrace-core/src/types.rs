//! Shared value types for the maptrace kernel.

use serde::{Deserialize, Serialize};

/// Re-export `RgbImage` so downstream crates can reference the decoded
/// raster without depending on `image` directly.
pub use image::RgbImage;

/// Re-export `GrayImage` for binary masks and elevation sampling.
pub use image::GrayImage;

/// A 2D point in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position (pixels from the left edge).
    pub x: f64,
    /// Vertical position (pixels from the top edge).
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.mul_add(dx, dy * dy)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }
}

/// A sequence of connected points tracing one region boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline(Vec<Point>);

impl Polyline {
    /// Create a new polyline from a vector of points.
    #[must_use]
    pub const fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    /// Returns `true` if the polyline has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of points in the polyline.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns the first point, if any.
    #[must_use]
    pub fn first(&self) -> Option<&Point> {
        self.0.first()
    }

    /// Returns the last point, if any.
    #[must_use]
    pub fn last(&self) -> Option<&Point> {
        self.0.last()
    }

    /// Returns a slice of all points.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.0
    }

    /// Consumes the polyline and returns the underlying vector of points.
    #[must_use]
    pub fn into_points(self) -> Vec<Point> {
        self.0
    }

    /// Whether the boundary is a closed loop: first and last points within
    /// 1.5 px of each other. Border-following contours close implicitly
    /// without repeating the start point, so distance (not equality) is
    /// the right test.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        match (self.first(), self.last()) {
            (Some(&a), Some(&b)) if self.len() > 2 => a.distance(b) <= 1.5,
            _ => false,
        }
    }
}

/// An RGB color with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb {
    /// Create a new color.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Euclidean distance to another color in RGB space.
    ///
    /// Isotropic, not perceptually uniform: a distance of 30 in blue is
    /// treated the same as 30 in green even though the eye disagrees.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        let dr = f64::from(self.r) - f64::from(other.r);
        let dg = f64::from(self.g) - f64::from(other.g);
        let db = f64::from(self.b) - f64::from(other.b);
        dr.mul_add(dr, dg.mul_add(dg, db * db)).sqrt()
    }

    /// Rec. 601 luminance: `0.299R + 0.587G + 0.114B`.
    #[must_use]
    pub fn luminance(self) -> f64 {
        f64::from(self.r).mul_add(
            0.299,
            f64::from(self.g).mul_add(0.587, f64::from(self.b) * 0.114),
        )
    }

    /// The channels as a `[r, g, b]` array.
    #[must_use]
    pub const fn channels(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

/// The largest possible distance between two RGB colors
/// (black to white, `sqrt(3 * 255^2)` ≈ 441.7).
pub const MAX_RGB_DISTANCE: f64 = 441.672_955_930_063_7;

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Configuration for the color-threshold segmenter.
///
/// All parameters have defaults matching the interactive tool's behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentConfig {
    /// Maximum Euclidean RGB distance for a pixel to be selected.
    ///
    /// 0.0 selects exact matches only; values at or above
    /// [`MAX_RGB_DISTANCE`] select every pixel.
    pub tolerance: f64,

    /// Whether to smooth traced boundaries with a Catmull-Rom spline.
    pub smooth: bool,

    /// Number of points each smoothed boundary is resampled to.
    /// Only used when `smooth` is `true`.
    pub smooth_samples: usize,
}

impl SegmentConfig {
    /// Default color tolerance.
    pub const DEFAULT_TOLERANCE: f64 = 30.0;
    /// Default resample count for smoothed boundaries.
    pub const DEFAULT_SMOOTH_SAMPLES: usize = 120;
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            tolerance: Self::DEFAULT_TOLERANCE,
            smooth: false,
            smooth_samples: Self::DEFAULT_SMOOTH_SAMPLES,
        }
    }
}

/// Errors that can occur in the maptrace kernel.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// Failed to decode the input image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// Geographic bounds violate `west < east` / `south < north` or are
    /// not finite.
    #[error("invalid geographic bounds: {0}")]
    InvalidGeoBox(String),

    /// Pixel rectangle violates `x0 < x1` / `y0 < y1`.
    #[error("invalid pixel rectangle: {0}")]
    InvalidPixelBox(String),

    /// The pixel rectangle extends beyond the loaded image.
    #[error("pixel rectangle {x1}x{y1} exceeds image dimensions {width}x{height}")]
    PixelBoxOutsideImage {
        /// Rectangle right edge.
        x1: u32,
        /// Rectangle bottom edge.
        y1: u32,
        /// Image width.
        width: u32,
        /// Image height.
        height: u32,
    },

    /// An operation that needs a calibration was invoked before one was set.
    #[error("no calibration set; draw bounds and enter geographic extent first")]
    MissingCalibration,

    /// A pick coordinate lies outside the loaded image.
    #[error("pixel ({x}, {y}) is outside the image")]
    OutOfBounds {
        /// Horizontal pick position.
        x: u32,
        /// Vertical pick position.
        y: u32,
    },

    /// Requested cluster count cannot be satisfied.
    #[error("invalid cluster count {0}: must be at least 1 and at most the pixel count")]
    InvalidClusterCount(usize),

    /// A feature index was out of range for the collection.
    #[error("feature index {index} out of range (collection has {len})")]
    FeatureIndexOutOfRange {
        /// The requested index.
        index: usize,
        /// The collection length at the time of the call.
        len: usize,
    },
}
