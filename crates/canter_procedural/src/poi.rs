//! # Points of Interest
//!
//! The fixed set of named locations the character rides toward.
//!
//! The registry is ordered: the terrain flattens around each entry in
//! registry order, and overlapping pads resolve in favour of the later one.

use std::fmt;

use canter_shared::constants::{POI_FLAT_RADIUS, POI_TRANSITION_RADIUS};
use canter_shared::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{TerrainError, TerrainResult};

/// Identity key of a point of interest.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PoiKey(String);

impl PoiKey {
    /// Creates a key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Borrows the key text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PoiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PoiKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

fn default_flat_radius() -> f32 {
    POI_FLAT_RADIUS
}

fn default_transition_radius() -> f32 {
    POI_TRANSITION_RADIUS
}

/// A fixed, named location on the terrain.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointOfInterest {
    /// Identity key.
    pub key: PoiKey,
    /// Display name.
    pub name: String,
    /// Anchor x.
    pub x: f32,
    /// Anchor z.
    pub z: f32,
    /// Whether this location is a good choice for the quest.
    #[serde(default)]
    pub ethical: bool,
    /// Radius inside which the terrain is fully flattened.
    #[serde(default = "default_flat_radius")]
    pub flat_radius: f32,
    /// Radius beyond which the terrain is untouched.
    #[serde(default = "default_transition_radius")]
    pub transition_radius: f32,
}

impl PointOfInterest {
    /// Creates a point of interest with the default pad radii.
    #[must_use]
    pub fn new(key: impl Into<String>, name: impl Into<String>, x: f32, z: f32, ethical: bool) -> Self {
        Self {
            key: PoiKey::new(key),
            name: name.into(),
            x,
            z,
            ethical,
            flat_radius: POI_FLAT_RADIUS,
            transition_radius: POI_TRANSITION_RADIUS,
        }
    }

    /// Anchor on the horizontal plane as `(x, z)`.
    #[inline]
    #[must_use]
    pub const fn anchor(&self) -> Vec2 {
        Vec2::new(self.x, self.z)
    }

    /// Horizontal distance from `(x, z)` to the anchor.
    #[inline]
    #[must_use]
    pub fn distance_to(&self, x: f32, z: f32) -> f32 {
        self.anchor().distance(Vec2::new(x, z))
    }

    fn validate(&self, index: usize) -> TerrainResult<()> {
        if self.key.as_str().is_empty() {
            return Err(TerrainError::EmptyKey(index));
        }
        if !self.x.is_finite() || !self.z.is_finite() {
            return Err(TerrainError::InvalidAnchor(self.key.to_string()));
        }
        let radii_ok = self.flat_radius.is_finite()
            && self.transition_radius.is_finite()
            && self.flat_radius >= 0.0
            && self.flat_radius < self.transition_radius;
        if !radii_ok {
            return Err(TerrainError::InvalidRadii {
                key: self.key.to_string(),
                flat: self.flat_radius,
                transition: self.transition_radius,
            });
        }
        Ok(())
    }
}

/// Ordered, key-unique collection of points of interest.
///
/// Immutable once built.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PoiRegistry {
    entries: Vec<PointOfInterest>,
}

impl PoiRegistry {
    /// Builds a registry, rejecting duplicate keys and malformed entries.
    ///
    /// # Errors
    ///
    /// Returns a [`TerrainError`] naming the first offending entry.
    pub fn new(entries: Vec<PointOfInterest>) -> TerrainResult<Self> {
        for (index, poi) in entries.iter().enumerate() {
            poi.validate(index)?;
            if entries[..index].iter().any(|other| other.key == poi.key) {
                return Err(TerrainError::DuplicateKey(poi.key.to_string()));
            }
        }
        Ok(Self { entries })
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the registry holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at `index` in registry order.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&PointOfInterest> {
        self.entries.get(index)
    }

    /// Registry index of `key`.
    #[must_use]
    pub fn index_of(&self, key: &PoiKey) -> Option<usize> {
        self.entries.iter().position(|poi| &poi.key == key)
    }

    /// Entry with the given key.
    #[must_use]
    pub fn find(&self, key: &PoiKey) -> Option<&PointOfInterest> {
        self.index_of(key).map(|index| &self.entries[index])
    }

    /// Entries in registry order.
    pub fn iter(&self) -> impl Iterator<Item = &PointOfInterest> {
        self.entries.iter()
    }

    /// Entries as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[PointOfInterest] {
        &self.entries
    }
}

impl<'a> IntoIterator for &'a PoiRegistry {
    type Item = &'a PointOfInterest;
    type IntoIter = std::slice::Iter<'a, PointOfInterest>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
