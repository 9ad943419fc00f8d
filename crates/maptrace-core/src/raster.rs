//! Image decoding and pixel sampling.
//!
//! Accepts raw image bytes (PNG, JPEG, BMP, TIFF) and produces the RGB
//! buffer the rest of the kernel operates on. Also provides the
//! patch-average color sampler used when the user picks a color, and the
//! grayscale conversion used as a synthetic elevation source.

use image::{GrayImage, RgbImage};

use crate::types::{CoreError, Rgb};

/// Side length of the square patch averaged by [`average_color`] when a
/// color is picked. Averaging suppresses single-pixel noise, matching the
/// interactive tool's click sampling.
pub const PICK_PATCH_SIZE: u32 = 5;

/// Decode raw image bytes into an RGB buffer.
///
/// Supports whatever formats the `image` crate is compiled with
/// (PNG, JPEG, BMP, TIFF here). Alpha is discarded.
///
/// # Errors
///
/// Returns [`CoreError::EmptyInput`] if `bytes` is empty and
/// [`CoreError::ImageDecode`] if the format is unrecognized or the data
/// is corrupt.
pub fn decode_rgb(bytes: &[u8]) -> Result<RgbImage, CoreError> {
    if bytes.is_empty() {
        return Err(CoreError::EmptyInput);
    }

    let img = image::load_from_memory(bytes)?;
    Ok(img.to_rgb8())
}

/// Convert the working image to grayscale.
///
/// Used by the elevation-annotated KML export, which samples intensity as
/// a synthetic altitude.
#[must_use]
pub fn to_grayscale(image: &RgbImage) -> GrayImage {
    image::imageops::grayscale(image)
}

/// Average color of a `PICK_PATCH_SIZE`-square patch centered on `(x, y)`,
/// clamped to the image borders.
///
/// # Errors
///
/// Returns [`CoreError::OutOfBounds`] when `(x, y)` is outside the image.
pub fn average_color(image: &RgbImage, x: u32, y: u32) -> Result<Rgb, CoreError> {
    if x >= image.width() || y >= image.height() {
        return Err(CoreError::OutOfBounds { x, y });
    }

    let half = PICK_PATCH_SIZE / 2;
    let x_min = x.saturating_sub(half);
    let y_min = y.saturating_sub(half);
    let x_max = (x + half).min(image.width() - 1);
    let y_max = (y + half).min(image.height() - 1);

    let mut sums = [0u64; 3];
    let mut count = 0u64;
    for py in y_min..=y_max {
        for px in x_min..=x_max {
            let pixel = image.get_pixel(px, py);
            sums[0] += u64::from(pixel.0[0]);
            sums[1] += u64::from(pixel.0[1]);
            sums[2] += u64::from(pixel.0[2]);
            count += 1;
        }
    }

    // count >= 1: the clamped window always contains (x, y) itself.
    #[allow(clippy::cast_possible_truncation)]
    let mean = |sum: u64| (sum / count) as u8;
    Ok(Rgb::new(mean(sums[0]), mean(sums[1]), mean(sums[2])))
}
