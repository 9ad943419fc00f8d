//! Color-threshold segmentation: mask pixels near a target color and
//! trace the mask boundaries into polylines.
//!
//! The mask is a plain per-pixel Euclidean RGB distance threshold; the
//! tolerance is a single scalar applied isotropically, which is not
//! perceptually uniform. Boundaries are traced with Suzuki-Abe border
//! following via `imageproc::contours::find_contours`.

use image::GrayImage;

use crate::smooth;
use crate::types::{Point, Polyline, Rgb, RgbImage, SegmentConfig};

/// Build a binary mask of pixels within `tolerance` of `target`.
///
/// Selected pixels are 255, everything else 0. A tolerance of 0.0 selects
/// exact matches only; a tolerance at or above
/// [`MAX_RGB_DISTANCE`](crate::types::MAX_RGB_DISTANCE) selects the whole
/// image. An empty mask is a valid result, not an error.
#[must_use = "returns the binary mask"]
pub fn color_mask(image: &RgbImage, target: Rgb, tolerance: f64) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let pixel = image.get_pixel(x, y);
        let color = Rgb::new(pixel.0[0], pixel.0[1], pixel.0[2]);
        if color.distance(target) <= tolerance {
            image::Luma([255])
        } else {
            image::Luma([0])
        }
    })
}

/// Segment an image by color similarity and trace the region boundaries.
///
/// Produces one polyline per traced boundary, in pixel coordinates.
/// Contours with fewer than 2 points cannot form a boundary and are
/// discarded; in particular a single isolated matching pixel traces to a
/// one-point contour and yields nothing. An empty mask yields an empty
/// vector.
///
/// When `config.smooth` is set, each boundary is resampled through a
/// Catmull-Rom spline (see [`smooth::smooth_polyline`]); boundaries too
/// short to fit a spline pass through unchanged.
#[must_use = "returns the traced boundaries"]
pub fn segment(image: &RgbImage, target: Rgb, config: &SegmentConfig) -> Vec<Polyline> {
    let mask = color_mask(image, target, config.tolerance);
    let traced = trace_boundaries(&mask);

    if config.smooth {
        traced
            .iter()
            .map(|pl| smooth::smooth_polyline(pl, config.smooth_samples))
            .collect()
    } else {
        traced
    }
}

/// Trace boundaries of a binary mask into polylines.
///
/// Converts `imageproc` contour points (integer grid coordinates) into
/// floating-point [`Point`]s.
fn trace_boundaries(mask: &GrayImage) -> Vec<Polyline> {
    let contours: Vec<imageproc::contours::Contour<u32>> =
        imageproc::contours::find_contours(mask);

    contours
        .into_iter()
        .filter(|c| c.points.len() >= 2)
        .map(|c| {
            let points = c
                .points
                .into_iter()
                .map(|p| Point::new(f64::from(p.x), f64::from(p.y)))
                .collect();
            Polyline::new(points)
        })
        .collect()
}
