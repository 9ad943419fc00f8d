//! Session state: the loaded image, its calibration, and the accumulated
//! features, threaded explicitly through every operation.
//!
//! The interactive prototypes kept all of this in globals mutated from
//! widget callbacks; here it is one owned value. Operations that need a
//! calibration (picking, classification) refuse to run until one is set,
//! and a failed image load leaves the session in its prior state.

use image::{GrayImage, RgbImage};

use crate::geocode::{Calibration, GeoBox, PixelBox};
use crate::palette;
use crate::raster;
use crate::segment;
use crate::store::{Feature, FeatureCollection};
use crate::types::{CoreError, Dimensions, Rgb, SegmentConfig};

/// A single-user editing session over one loaded map image.
#[derive(Debug, Clone)]
pub struct Session {
    image: RgbImage,
    calibration: Option<Calibration>,
    features: FeatureCollection,
}

impl Session {
    /// Start a session by decoding image bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EmptyInput`] or [`CoreError::ImageDecode`]
    /// when the bytes cannot be decoded.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CoreError> {
        let image = raster::decode_rgb(bytes)?;
        Ok(Self {
            image,
            calibration: None,
            features: FeatureCollection::new(),
        })
    }

    /// Replace the loaded image.
    ///
    /// On success the calibration and all features are cleared, since
    /// they referred to the previous image. On decode failure the session
    /// keeps its prior image, calibration, and features untouched.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EmptyInput`] or [`CoreError::ImageDecode`]
    /// when the bytes cannot be decoded.
    pub fn load_image(&mut self, bytes: &[u8]) -> Result<(), CoreError> {
        let image = raster::decode_rgb(bytes)?;
        self.image = image;
        self.calibration = None;
        self.features.clear();
        Ok(())
    }

    /// The loaded image.
    #[must_use]
    pub const fn image(&self) -> &RgbImage {
        &self.image
    }

    /// Image dimensions in pixels.
    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.image.width(),
            height: self.image.height(),
        }
    }

    /// Grayscale rendition of the image, used as a synthetic elevation
    /// source by the elevation-annotated KML export.
    #[must_use]
    pub fn grayscale(&self) -> GrayImage {
        raster::to_grayscale(&self.image)
    }

    /// Set the calibration: a pixel rectangle paired with its geographic
    /// extent. Replaces any previous calibration wholesale.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::PixelBoxOutsideImage`] when the rectangle
    /// extends beyond the image.
    pub fn calibrate(&mut self, pixel: PixelBox, geo: GeoBox) -> Result<(), CoreError> {
        if pixel.x1() > self.image.width() || pixel.y1() > self.image.height() {
            return Err(CoreError::PixelBoxOutsideImage {
                x1: pixel.x1(),
                y1: pixel.y1(),
                width: self.image.width(),
                height: self.image.height(),
            });
        }
        self.calibration = Some(Calibration::new(pixel, geo));
        Ok(())
    }

    /// Recalibrate to a sub-rectangle of the current calibration, deriving
    /// its geographic extent from the existing mapping (the redraw-bounds
    /// interaction on an already-calibrated image).
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MissingCalibration`] when no calibration is
    /// set, or [`CoreError::PixelBoxOutsideImage`] when the rectangle
    /// extends beyond the image.
    pub fn recalibrate_sub_box(&mut self, sub: PixelBox) -> Result<(), CoreError> {
        let current = self.calibration()?;
        let geo = current.geo_for_sub_box(sub);
        self.calibrate(sub, geo)
    }

    /// The current calibration.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MissingCalibration`] when none is set.
    pub fn calibration(&self) -> Result<&Calibration, CoreError> {
        self.calibration
            .as_ref()
            .ok_or(CoreError::MissingCalibration)
    }

    /// Whether a calibration has been set.
    #[must_use]
    pub const fn is_calibrated(&self) -> bool {
        self.calibration.is_some()
    }

    /// Pick a color at a pixel and segment the image against it.
    ///
    /// Samples the average color of a small patch around `(x, y)`,
    /// segments the full image, and appends the result to the feature
    /// collection. An empty segmentation still records a feature, so the
    /// user can see that the pick matched nothing.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MissingCalibration`] before calibration and
    /// [`CoreError::OutOfBounds`] when `(x, y)` is outside the image.
    pub fn pick(
        &mut self,
        x: u32,
        y: u32,
        label: String,
        config: &SegmentConfig,
    ) -> Result<&Feature, CoreError> {
        self.calibration()?;
        let color = raster::average_color(&self.image, x, y)?;
        let contours = segment::segment(&self.image, color, config);
        Ok(self.features.add(Feature::new(color, label, contours)))
    }

    /// Segment an explicit target color and append the result.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MissingCalibration`] before calibration.
    pub fn segment_color(
        &mut self,
        color: Rgb,
        label: String,
        config: &SegmentConfig,
    ) -> Result<&Feature, CoreError> {
        self.calibration()?;
        let contours = segment::segment(&self.image, color, config);
        Ok(self.features.add(Feature::new(color, label, contours)))
    }

    /// Batch classification: cluster the image palette into `k` colors and
    /// segment once per cluster, **replacing** any prior features.
    ///
    /// Features are labeled `cluster-0` through `cluster-(k-1)`, ordered
    /// darkest to lightest. Returns the number of features stored.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MissingCalibration`] before calibration and
    /// [`CoreError::InvalidClusterCount`] for an unusable `k`.
    pub fn classify_by_colormap(
        &mut self,
        k: usize,
        config: &SegmentConfig,
    ) -> Result<usize, CoreError> {
        self.calibration()?;
        let colors = palette::cluster_palette(&self.image, k)?;

        let features: Vec<Feature> = colors
            .into_iter()
            .enumerate()
            .map(|(i, color)| {
                let contours = segment::segment(&self.image, color, config);
                Feature::new(color, format!("cluster-{i}"), contours)
            })
            .collect();

        self.features.replace_all(features);
        Ok(self.features.len())
    }

    /// Delete the feature at `index`, preserving the order of the rest.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::FeatureIndexOutOfRange`] for a bad index.
    pub fn delete_feature(&mut self, index: usize) -> Result<Feature, CoreError> {
        self.features.delete(index)
    }

    /// The accumulated features.
    #[must_use]
    pub const fn features(&self) -> &FeatureCollection {
        &self.features
    }
}
