//! Palette clustering: derive representative colors from an image.
//!
//! Runs k-means over every pixel in CIE Lab space (perceptually more
//! even than RGB for clustering) and converts the centroids back to
//! 8-bit sRGB. The palette feeds batch classification: one segmentation
//! pass per representative color.

use kmeans_colors::get_kmeans;
use palette::{FromColor, IntoColor, Lab, Srgb};

use crate::types::{CoreError, Rgb, RgbImage};

/// Maximum k-means iterations per run.
const MAX_ITERATIONS: usize = 20;

/// Convergence threshold for the k-means loop.
const CONVERGE: f32 = 1e-4;

/// Fixed RNG seed so repeated runs over the same image produce the same
/// palette.
const SEED: u64 = 0;

/// Cluster the image's pixels into `k` representative colors.
///
/// The returned palette is sorted by luminance, darkest first, so cluster
/// ordering is stable for display and labeling.
///
/// # Errors
///
/// Returns [`CoreError::InvalidClusterCount`] when `k` is zero or exceeds
/// the number of pixels in the image.
pub fn cluster_palette(image: &RgbImage, k: usize) -> Result<Vec<Rgb>, CoreError> {
    let pixel_count = image.width() as usize * image.height() as usize;
    if k == 0 || k > pixel_count {
        return Err(CoreError::InvalidClusterCount(k));
    }

    let lab_pixels: Vec<Lab> = image
        .pixels()
        .map(|p| {
            Srgb::new(p.0[0], p.0[1], p.0[2])
                .into_format::<f32>()
                .into_color()
        })
        .collect();

    let result = get_kmeans(k, MAX_ITERATIONS, CONVERGE, false, &lab_pixels, SEED);

    let mut palette: Vec<Rgb> = result
        .centroids
        .iter()
        .map(|&lab| {
            let srgb: Srgb<u8> = Srgb::from_color(lab).into_format();
            Rgb::new(srgb.red, srgb.green, srgb.blue)
        })
        .collect();

    palette.sort_by(|a, b| a.luminance().total_cmp(&b.luminance()));
    Ok(palette)
}
