//! # Simulation Configuration
//!
//! One TOML document drives the whole core. Every table is optional; missing
//! fields take the shipped defaults.
//!
//! ```toml
//! seed = 42
//!
//! [terrain]
//! world_size = 500.0
//! segments = 128
//!
//! [locomotion]
//! gallop_speed = 30.0
//!
//! [quest]
//! target = "showpiece"
//!
//! [[points_of_interest]]
//! key = "nature"
//! name = "Nature Reserve"
//! x = 80.0
//! z = -80.0
//! ethical = true
//! ```

use std::fs;
use std::path::Path;

use canter_procedural::{PoiRegistry, PointOfInterest, TerrainParams, WorldSeed};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::camera::CameraConfig;
use crate::error::ConfigError;
use crate::locomotion::LocomotionConfig;
use crate::proximity::ProximityConfig;
use crate::quest::QuestConfig;
use crate::simulation::ClockConfig;

/// Complete configuration of a simulation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Terrain seed.
    pub seed: WorldSeed,
    /// Heightfield dimensions and noise.
    pub terrain: TerrainParams,
    /// Character controller tuning.
    pub locomotion: LocomotionConfig,
    /// Camera rig tuning.
    pub camera: CameraConfig,
    /// Interaction radii.
    pub proximity: ProximityConfig,
    /// Frame clock limits.
    pub clock: ClockConfig,
    /// Quest setup.
    pub quest: QuestConfig,
    /// Points of interest in flatten order.
    pub points_of_interest: Vec<PointOfInterest>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: WorldSeed::default(),
            terrain: TerrainParams::default(),
            locomotion: LocomotionConfig::default(),
            camera: CameraConfig::default(),
            proximity: ProximityConfig::default(),
            clock: ClockConfig::default(),
            quest: QuestConfig::default(),
            points_of_interest: default_points_of_interest(),
        }
    }
}

/// The six stables of the shipped world.
#[must_use]
pub fn default_points_of_interest() -> Vec<PointOfInterest> {
    vec![
        PointOfInterest::new("nature", "Nature Reserve", 80.0, -80.0, true),
        PointOfInterest::new("ethical_sport", "Ethical Sport Stable", -90.0, -60.0, true),
        PointOfInterest::new("wellness", "Wellness Retreat", 85.0, 70.0, true),
        PointOfInterest::new("intensive", "Intensive Breeding Yard", 0.0, 100.0, false),
        PointOfInterest::new("neglect", "Neglected Paddock", -95.0, 40.0, false),
        PointOfInterest::new("showpiece", "Showpiece Arena", -60.0, -90.0, false),
    ]
}

impl SimConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML, or a validation
    /// error for out-of-range values.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise
    /// the same errors as [`SimConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), bytes = source.len(), "Config read");
        Self::from_toml_str(&source)
    }

    /// Checks every section and the cross-section references.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.terrain.validate()?;
        self.locomotion.validate().map_err(ConfigError::Invalid)?;
        self.camera.validate().map_err(ConfigError::Invalid)?;
        self.proximity.validate().map_err(ConfigError::Invalid)?;
        self.clock.validate().map_err(ConfigError::Invalid)?;

        let registry = self.registry()?;
        if registry.find(&self.quest.target).is_none() {
            return Err(ConfigError::Invalid(format!(
                "quest target '{}' is not a point of interest",
                self.quest.target
            )));
        }
        Ok(())
    }

    /// Builds the point-of-interest registry.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Terrain`] for duplicate keys or bad radii.
    pub fn registry(&self) -> Result<PoiRegistry, ConfigError> {
        Ok(PoiRegistry::new(self.points_of_interest.clone())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canter_procedural::{PoiKey, TerrainError};

    #[test]
    fn test_default_is_valid() {
        let config = SimConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.registry().unwrap().len(), 6);
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = SimConfig::from_toml_str("").unwrap();
        assert_eq!(config, SimConfig::default());
    }

    #[test]
    fn test_partial_document() {
        let config = SimConfig::from_toml_str(
            r#"
            seed = 7

            [locomotion]
            gallop_speed = 30.0

            [proximity]
            interaction_radius = 10.0
            "#,
        )
        .unwrap();

        assert_eq!(config.seed, WorldSeed::new(7));
        assert!((config.locomotion.gallop_speed - 30.0).abs() < f32::EPSILON);
        assert!((config.locomotion.trot_speed - 14.0).abs() < f32::EPSILON);
        assert!((config.proximity.interaction_radius - 10.0).abs() < f32::EPSILON);
        assert!((config.proximity.approach_radius - 35.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_custom_points_of_interest() {
        let config = SimConfig::from_toml_str(
            r#"
            [quest]
            target = "barn"

            [[points_of_interest]]
            key = "barn"
            name = "Old Barn"
            x = 10.0
            z = 20.0

            [[points_of_interest]]
            key = "meadow"
            name = "Meadow"
            x = -50.0
            z = 0.0
            ethical = true
            flat_radius = 8.0
            transition_radius = 16.0
            "#,
        )
        .unwrap();

        let registry = config.registry().unwrap();
        assert_eq!(registry.len(), 2);
        let barn = registry.find(&PoiKey::from("barn")).unwrap();
        assert!(!barn.ethical);
        let meadow = registry.find(&PoiKey::from("meadow")).unwrap();
        assert!((meadow.flat_radius - 8.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_unknown_quest_target_rejected() {
        let result = SimConfig::from_toml_str(
            r#"
            [quest]
            target = "nowhere"
            "#,
        );
        assert!(matches!(result, Err(ConfigError::Invalid(msg)) if msg.contains("nowhere")));
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let mut config = SimConfig::default();
        config
            .points_of_interest
            .push(PointOfInterest::new("nature", "Again", 0.0, 0.0, true));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Terrain(TerrainError::DuplicateKey(_)))
        ));
    }

    #[test]
    fn test_bad_values_rejected() {
        let mut config = SimConfig::default();
        config.proximity.approach_radius = 5.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = SimConfig::default();
        config.terrain.segments = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Terrain(_))));

        let mut config = SimConfig::default();
        config.clock.max_delta = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let inverted = SimConfig::from_toml_str("[locomotion]\ngallop_speed = 10.0\n");
        assert!(matches!(inverted, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_malformed_toml() {
        assert!(matches!(
            SimConfig::from_toml_str("seed = \"not a number\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_missing_file_reports_path() {
        let err = SimConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.toml"));
    }
}
