//! # Canter Shared
//!
//! Common types used by the terrain generator and the simulation core.
//!
//! ## CRITICAL RULE
//!
//! This crate must NEVER depend on a renderer, a window or an asset loader.
//! Renderers consume these types, they do not define them.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod constants;
pub mod math;

pub use constants::{APPROACH_RADIUS, INTERACTION_RADIUS, MAX_FRAME_DELTA, WORLD_SIZE};
pub use math::{ease_out_cubic, lerp, smoothstep, step_factor, Quaternion, Vec2, Vec3};
