//! # World Constants
//!
//! Defaults for the shipped world. Every value here can be overridden
//! through the simulation config; these are what an empty config yields.

// =============================================================================
// WORLD
// =============================================================================

/// Side length of the square world, centered on the origin (world units).
pub const WORLD_SIZE: f32 = 500.0;

/// Number of grid segments per side of the terrain grid.
pub const TERRAIN_SEGMENTS: u32 = 128;

/// Radius around the origin faded flat for the spawn area.
pub const SPAWN_FLATTEN_RADIUS: f32 = 25.0;

/// Horizontal fence as a fraction of [`WORLD_SIZE`] (half-extent of the
/// walkable square).
pub const WORLD_FENCE_RATIO: f32 = 0.45;

// =============================================================================
// POINTS OF INTEREST
// =============================================================================

/// Radius around a point of interest replaced by its center elevation.
pub const POI_FLAT_RADIUS: f32 = 14.0;

/// Radius beyond which a point of interest leaves terrain untouched.
pub const POI_TRANSITION_RADIUS: f32 = 30.0;

/// Inside this distance the character is "in range" of a point of interest.
pub const INTERACTION_RADIUS: f32 = 20.0;

/// Inside this distance (and outside [`INTERACTION_RADIUS`]) the character
/// is approaching.
pub const APPROACH_RADIUS: f32 = 35.0;

// =============================================================================
// TIMING
// =============================================================================

/// Largest delta time a single tick may simulate (seconds).
///
/// A stall longer than this is simulated as one 50 ms step.
pub const MAX_FRAME_DELTA: f32 = 0.05;

/// Nominal tick rate used by the headless harness.
pub const TICK_RATE: u32 = 60;
