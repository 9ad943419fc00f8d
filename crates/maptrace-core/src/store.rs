//! Feature store: labeled, colored contour sets accumulated during a
//! session, ready for geospatial export.
//!
//! Pure in-memory collection with single-session lifetime. Features are
//! append-only once created; the only mutations on the collection are
//! append, delete-by-index, wholesale replacement, and clearing on image
//! reload.

use serde::{Deserialize, Serialize};

use crate::types::{CoreError, Polyline, Rgb};

/// A labeled, colored set of contours produced by one segmentation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    color: Rgb,
    label: String,
    contours: Vec<Polyline>,
}

impl Feature {
    /// Create a feature from a segmentation result.
    #[must_use]
    pub const fn new(color: Rgb, label: String, contours: Vec<Polyline>) -> Self {
        Self {
            color,
            label,
            contours,
        }
    }

    /// The color this feature was segmented against.
    #[must_use]
    pub const fn color(&self) -> Rgb {
        self.color
    }

    /// User-supplied label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The traced boundaries, in pixel coordinates.
    #[must_use]
    pub fn contours(&self) -> &[Polyline] {
        &self.contours
    }
}

/// Insertion-ordered collection of [`Feature`]s.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection(Vec<Feature>);

impl FeatureCollection {
    /// Create an empty collection.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a feature, preserving insertion order. Returns a reference
    /// to the stored feature.
    pub fn add(&mut self, feature: Feature) -> &Feature {
        self.0.push(feature);
        // push guarantees the collection is non-empty.
        &self.0[self.0.len() - 1]
    }

    /// Remove and return the feature at `index`.
    ///
    /// The order of the remaining features is preserved.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::FeatureIndexOutOfRange`] when `index` is past
    /// the end of the collection.
    pub fn delete(&mut self, index: usize) -> Result<Feature, CoreError> {
        if index >= self.0.len() {
            return Err(CoreError::FeatureIndexOutOfRange {
                index,
                len: self.0.len(),
            });
        }
        Ok(self.0.remove(index))
    }

    /// Replace the entire contents, as batch classification does.
    pub fn replace_all(&mut self, features: Vec<Feature>) {
        self.0 = features;
    }

    /// Remove every feature.
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Number of features.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the collection is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The feature at `index`, if present.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Feature> {
        self.0.get(index)
    }

    /// Iterate features in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Feature> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a FeatureCollection {
    type Item = &'a Feature;
    type IntoIter = std::slice::Iter<'a, Feature>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
