//! # Canter Procedural Terrain
//!
//! Deterministic terrain for the riding simulation.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: Same seed always produces the same terrain
//! 2. **Built once**: The grid is immutable after construction
//! 3. **Cheap queries**: `HeightField::query` is O(1) and never allocates
//!
//! ## Core Components
//!
//! - `SimplexNoise`: seeded 2D noise and its layered sum
//! - `PoiRegistry`: ordered points of interest the terrain flattens around
//! - `HeightField`: the grid plus bilinear ground queries
//!
//! ## Example
//!
//! ```rust,ignore
//! use canter_procedural::{HeightField, PoiRegistry, TerrainParams, WorldSeed};
//!
//! let registry = PoiRegistry::new(points)?;
//! let field = HeightField::build(WorldSeed::new(12345), &TerrainParams::default(), &registry)?;
//! let ground = field.query(12.5, -40.0);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod error;
pub mod heightfield;
pub mod noise;
pub mod poi;

pub use error::{TerrainError, TerrainResult};
pub use heightfield::{FlattenPad, HeightField, TerrainGrid, TerrainParams};
pub use noise::{NoiseLayer, SimplexNoise, WorldSeed};
pub use poi::{PoiKey, PoiRegistry, PointOfInterest};
