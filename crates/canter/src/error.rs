//! # Simulation Error Types
//!
//! Everything that can fail happens before the first tick: reading the
//! config, validating it, and building the terrain.

use std::path::PathBuf;

use canter_procedural::TerrainError;
use thiserror::Error;

/// Errors raised while loading or validating a [`crate::config::SimConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },

    /// The config file is not valid TOML for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// Terrain parameters or points of interest are malformed.
    #[error("invalid terrain: {0}")]
    Terrain(#[from] TerrainError),
}

/// Errors raised while setting up a simulation.
#[derive(Error, Debug)]
pub enum SimError {
    /// Configuration problem.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Terrain could not be built.
    #[error("terrain build failed: {0}")]
    Terrain(#[from] TerrainError),
}

/// Result type for simulation setup.
pub type SimResult<T> = Result<T, SimError>;
