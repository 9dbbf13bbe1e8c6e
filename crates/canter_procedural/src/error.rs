//! # Terrain Errors
//!
//! Failures are only possible while building the field. Queries never fail.

use thiserror::Error;

/// Errors raised while validating terrain parameters or the point-of-interest registry.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TerrainError {
    /// The world edge length must be positive and finite.
    #[error("world size must be positive and finite, got {0}")]
    InvalidWorldSize(f32),

    /// The grid needs at least one segment per side.
    #[error("terrain needs at least one segment per side")]
    NoSegments,

    /// The spawn flatten radius must be non-negative and finite.
    #[error("spawn flatten radius must be non-negative, got {0}")]
    InvalidSpawnRadius(f32),

    /// A noise layer has a non-finite frequency or amplitude.
    #[error("noise layer {index} is not finite")]
    InvalidNoiseLayer {
        /// Position of the layer in the list.
        index: usize,
    },

    /// Two points of interest share a key.
    #[error("duplicate point of interest key '{0}'")]
    DuplicateKey(String),

    /// A point of interest has an empty key.
    #[error("point of interest at index {0} has an empty key")]
    EmptyKey(usize),

    /// Flattening radii must satisfy `0 <= flat < transition`.
    #[error("point of interest '{key}' has invalid radii (flat {flat}, transition {transition})")]
    InvalidRadii {
        /// Offending key.
        key: String,
        /// Fully flattened radius.
        flat: f32,
        /// Outer edge of the blend.
        transition: f32,
    },

    /// The anchor coordinates are not finite.
    #[error("point of interest '{0}' has a non-finite anchor")]
    InvalidAnchor(String),
}

/// Result type for terrain construction.
pub type TerrainResult<T> = Result<T, TerrainError>;
