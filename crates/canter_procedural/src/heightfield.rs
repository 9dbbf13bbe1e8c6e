//! # HeightField
//!
//! The terrain the character rides on. Built once from a seed, then queried
//! every tick by locomotion and by anyone placing objects on the ground.
//!
//! ## Build order
//!
//! 1. Layered noise at every grid vertex.
//! 2. Spawn flatten: elevation fades linearly to zero toward the origin.
//! 3. Point-of-interest pads, applied in registry order. A later pad wins
//!    where two transition zones overlap.
//!
//! ## Query
//!
//! Bilinear interpolation of the enclosing cell. Coordinates outside the
//! world are clamped to the border, so the result is always finite and
//! continuous.

use canter_shared::constants::{SPAWN_FLATTEN_RADIUS, TERRAIN_SEGMENTS, WORLD_SIZE};
use canter_shared::{lerp, smoothstep, Vec2};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{TerrainError, TerrainResult};
use crate::noise::{NoiseLayer, SimplexNoise, WorldSeed};
use crate::poi::{PoiKey, PoiRegistry};

// ============================================================================
// PARAMETERS
// ============================================================================

/// Shape of the terrain.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainParams {
    /// Edge length of the square world, centered at the origin.
    pub world_size: f32,
    /// Grid segments per side. The grid holds `(segments + 1)^2` vertices.
    pub segments: u32,
    /// Radius around the origin where elevation fades to zero.
    pub spawn_flatten_radius: f32,
    /// Noise octaves summed into the natural elevation.
    pub layers: Vec<NoiseLayer>,
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            world_size: WORLD_SIZE,
            segments: TERRAIN_SEGMENTS,
            spawn_flatten_radius: SPAWN_FLATTEN_RADIUS,
            layers: vec![NoiseLayer::BASE, NoiseLayer::DETAIL, NoiseLayer::FINE],
        }
    }
}

impl TerrainParams {
    /// Checks the parameters without building anything.
    ///
    /// # Errors
    ///
    /// Returns the first invalid parameter found.
    pub fn validate(&self) -> TerrainResult<()> {
        if !(self.world_size.is_finite() && self.world_size > 0.0) {
            return Err(TerrainError::InvalidWorldSize(self.world_size));
        }
        if self.segments == 0 {
            return Err(TerrainError::NoSegments);
        }
        if !(self.spawn_flatten_radius.is_finite() && self.spawn_flatten_radius >= 0.0) {
            return Err(TerrainError::InvalidSpawnRadius(self.spawn_flatten_radius));
        }
        if let Some(index) = self
            .layers
            .iter()
            .position(|l| !(l.frequency.is_finite() && l.amplitude.is_finite()))
        {
            return Err(TerrainError::InvalidNoiseLayer { index });
        }
        Ok(())
    }
}

// ============================================================================
// GRID
// ============================================================================

/// Immutable `(S+1) x (S+1)` elevation grid.
///
/// Vertex `(ix, iz)` sits at `(-W/2 + ix * W/S, -W/2 + iz * W/S)` and is
/// stored at `iz * (S + 1) + ix`.
#[derive(Clone, Debug, PartialEq)]
pub struct TerrainGrid {
    segments: u32,
    world_size: f32,
    heights: Vec<f32>,
}

impl TerrainGrid {
    /// Grid segments per side.
    #[inline]
    #[must_use]
    pub const fn segments(&self) -> u32 {
        self.segments
    }

    /// Vertices per side.
    #[inline]
    #[must_use]
    pub const fn vertices_per_side(&self) -> u32 {
        self.segments + 1
    }

    /// Edge length of the world.
    #[inline]
    #[must_use]
    pub const fn world_size(&self) -> f32 {
        self.world_size
    }

    /// Distance between neighbouring vertices.
    #[inline]
    #[must_use]
    pub fn spacing(&self) -> f32 {
        self.world_size / self.segments as f32
    }

    /// World `(x, z)` of a vertex.
    #[inline]
    #[must_use]
    pub fn vertex_position(&self, ix: u32, iz: u32) -> (f32, f32) {
        let half = self.world_size * 0.5;
        let spacing = self.spacing();
        (-half + ix as f32 * spacing, -half + iz as f32 * spacing)
    }

    /// Elevation at a vertex, `None` outside the grid.
    #[must_use]
    pub fn get(&self, ix: u32, iz: u32) -> Option<f32> {
        let n = self.vertices_per_side();
        (ix < n && iz < n).then(|| self.heights[self.index(ix, iz)])
    }

    /// All elevations, row-major in z.
    #[must_use]
    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    /// Lowest and highest elevation in the grid.
    #[must_use]
    pub fn min_max(&self) -> (f32, f32) {
        self.heights
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &h| {
                (lo.min(h), hi.max(h))
            })
    }

    #[inline]
    fn index(&self, ix: u32, iz: u32) -> usize {
        iz as usize * self.vertices_per_side() as usize + ix as usize
    }

    #[inline]
    fn at(&self, ix: u32, iz: u32) -> f32 {
        self.heights[self.index(ix, iz)]
    }

    /// Cell index and fractional offset along one axis, clamped to the grid.
    #[inline]
    fn cell(&self, coord: f32) -> (u32, f32) {
        let segments = self.segments as f32;
        let g = (coord + self.world_size * 0.5) / self.world_size * segments;
        let g = if g.is_nan() { segments * 0.5 } else { g.clamp(0.0, segments) };
        let i = (g.floor() as u32).min(self.segments - 1);
        (i, g - i as f32)
    }
}

// ============================================================================
// HEIGHTFIELD
// ============================================================================

/// A flattened pad around one point of interest.
#[derive(Clone, Debug, PartialEq)]
pub struct FlattenPad {
    /// Key of the point of interest.
    pub key: PoiKey,
    /// Anchor `(x, z)`.
    pub anchor: Vec2,
    /// Fully flattened radius.
    pub flat_radius: f32,
    /// Outer edge of the blend.
    pub transition_radius: f32,
    /// Natural elevation at the anchor, before any post-processing.
    pub center_elevation: f32,
}

impl FlattenPad {
    /// Blend weight toward the pad elevation at `distance` from the anchor.
    #[inline]
    fn weight(&self, distance: f32) -> f32 {
        if distance >= self.transition_radius {
            0.0
        } else if distance < self.flat_radius {
            1.0
        } else {
            smoothstep(
                1.0 - (distance - self.flat_radius) / (self.transition_radius - self.flat_radius),
            )
        }
    }
}

/// Procedural terrain: an immutable grid plus the noise that produced it.
#[derive(Clone, Debug)]
pub struct HeightField {
    seed: WorldSeed,
    params: TerrainParams,
    noise: SimplexNoise,
    grid: TerrainGrid,
    pads: Vec<FlattenPad>,
}

impl HeightField {
    /// Builds the terrain.
    ///
    /// Deterministic: the same seed, parameters and registry always produce
    /// the same grid.
    ///
    /// # Errors
    ///
    /// Returns a [`TerrainError`] if the parameters are invalid.
    pub fn build(
        seed: WorldSeed,
        params: &TerrainParams,
        registry: &PoiRegistry,
    ) -> TerrainResult<Self> {
        params.validate()?;

        let noise = SimplexNoise::new(seed);
        let natural = |x: f32, z: f32| noise.layered(f64::from(x), f64::from(z), &params.layers) as f32;

        let pads: Vec<FlattenPad> = registry
            .iter()
            .map(|poi| FlattenPad {
                key: poi.key.clone(),
                anchor: poi.anchor(),
                flat_radius: poi.flat_radius,
                transition_radius: poi.transition_radius,
                center_elevation: natural(poi.x, poi.z),
            })
            .collect();

        let mut grid = TerrainGrid {
            segments: params.segments,
            world_size: params.world_size,
            heights: Vec::new(),
        };
        let n = grid.vertices_per_side();
        grid.heights.reserve((n as usize) * (n as usize));

        for iz in 0..n {
            for ix in 0..n {
                let (x, z) = grid.vertex_position(ix, iz);
                let mut y = natural(x, z);

                let spawn_radius = params.spawn_flatten_radius;
                if spawn_radius > 0.0 {
                    let d = x.hypot(z);
                    if d < spawn_radius {
                        let t = (1.0 - d / spawn_radius).clamp(0.0, 1.0);
                        y *= 1.0 - t;
                    }
                }

                let here = Vec2::new(x, z);
                for pad in &pads {
                    let s = pad.weight(here.distance(pad.anchor));
                    if s > 0.0 {
                        y = y * (1.0 - s) + pad.center_elevation * s;
                    }
                }

                grid.heights.push(y);
            }
        }

        let (min, max) = grid.min_max();
        info!(
            seed = seed.value(),
            segments = params.segments,
            world_size = params.world_size,
            pads = pads.len(),
            min_elevation = min,
            max_elevation = max,
            "Heightfield built"
        );

        Ok(Self {
            seed,
            params: params.clone(),
            noise,
            grid,
            pads,
        })
    }

    /// Ground elevation at world `(x, z)`.
    ///
    /// Bilinear over the enclosing cell; never fails and never allocates.
    #[must_use]
    pub fn query(&self, x: f32, z: f32) -> f32 {
        let (ix, fx) = self.grid.cell(x);
        let (iz, fz) = self.grid.cell(z);

        let h00 = self.grid.at(ix, iz);
        let h10 = self.grid.at(ix + 1, iz);
        let h01 = self.grid.at(ix, iz + 1);
        let h11 = self.grid.at(ix + 1, iz + 1);

        lerp(lerp(h00, h10, fx), lerp(h01, h11, fx), fz)
    }

    /// Elevation of the unmodified noise, ignoring spawn and pad flattening.
    #[must_use]
    pub fn natural_height(&self, x: f32, z: f32) -> f32 {
        self.noise
            .layered(f64::from(x), f64::from(z), &self.params.layers) as f32
    }

    /// Pre-sampled natural elevation of a point of interest.
    #[must_use]
    pub fn center_elevation(&self, key: &PoiKey) -> Option<f32> {
        self.pads
            .iter()
            .find(|pad| &pad.key == key)
            .map(|pad| pad.center_elevation)
    }

    /// True if `(x, z)` lies inside the world square.
    #[must_use]
    pub fn contains(&self, x: f32, z: f32) -> bool {
        let half = self.params.world_size * 0.5;
        (-half..=half).contains(&x) && (-half..=half).contains(&z)
    }

    /// The underlying grid.
    #[must_use]
    pub fn grid(&self) -> &TerrainGrid {
        &self.grid
    }

    /// Pads in the order they were applied.
    #[must_use]
    pub fn pads(&self) -> &[FlattenPad] {
        &self.pads
    }

    /// Seed the field was built from.
    #[must_use]
    pub const fn seed(&self) -> WorldSeed {
        self.seed
    }

    /// Parameters the field was built from.
    #[must_use]
    pub fn params(&self) -> &TerrainParams {
        &self.params
    }
}
