//! # Proximity Tracking
//!
//! Classifies the rider's relation to the nearest point of interest with
//! two-radius hysteresis:
//!
//! ```text
//!              approach_radius
//!        ┌──────────────────────────┐
//!        │     interaction_radius   │
//!        │      ┌────────────┐      │
//!   Out  │ Appr │  InRange   │ Appr │  Out
//!        │      └────────────┘      │
//!        └──────────────────────────┘
//! ```
//!
//! Only the InRange boundary emits events. Leaving InRange always lands in
//! Approach for at least one tick, whatever the distance.

use canter_procedural::{PoiKey, PoiRegistry};
use canter_shared::constants::{APPROACH_RADIUS, INTERACTION_RADIUS};
use canter_shared::Vec3;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Radii for the range state machine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProximityConfig {
    /// Inside this distance the rider can interact.
    pub interaction_radius: f32,
    /// Inside this distance the rider is approaching.
    pub approach_radius: f32,
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            interaction_radius: INTERACTION_RADIUS,
            approach_radius: APPROACH_RADIUS,
        }
    }
}

impl ProximityConfig {
    /// Requires `0 < interaction_radius < approach_radius`.
    ///
    /// # Errors
    ///
    /// Returns a description of the violated bound.
    pub fn validate(&self) -> Result<(), String> {
        let ok = self.interaction_radius.is_finite()
            && self.approach_radius.is_finite()
            && self.interaction_radius > 0.0
            && self.interaction_radius < self.approach_radius;
        if ok {
            Ok(())
        } else {
            Err(format!(
                "proximity radii must satisfy 0 < interaction ({}) < approach ({})",
                self.interaction_radius, self.approach_radius
            ))
        }
    }
}

/// Relation to the nearest point of interest.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RangeState {
    /// Nothing nearby.
    #[default]
    Out,
    /// Nearby, or just left interaction range.
    Approach,
    /// Close enough to interact.
    InRange,
}

/// The nearest point of interest, as reported to collaborators.
#[derive(Clone, Debug, PartialEq)]
pub struct NearestPoi {
    /// Registry index.
    pub index: usize,
    /// Key.
    pub key: PoiKey,
    /// Horizontal distance from the rider.
    pub distance: f32,
}

/// Transition across the InRange boundary.
#[derive(Clone, Debug, PartialEq)]
pub enum ProximityEvent {
    /// Entered interaction range of `0`.
    Approach(NearestPoi),
    /// Left interaction range of `0` (the point that was nearest before).
    Leave(NearestPoi),
}

/// Two-threshold range state machine.
#[derive(Clone, Debug)]
pub struct ProximityTracker {
    config: ProximityConfig,
    state: RangeState,
    nearest: Option<NearestPoi>,
}

impl ProximityTracker {
    /// Starts Out with no nearest point.
    #[must_use]
    pub fn new(config: ProximityConfig) -> Self {
        Self {
            config,
            state: RangeState::Out,
            nearest: None,
        }
    }

    /// Radii in use.
    #[must_use]
    pub fn config(&self) -> &ProximityConfig {
        &self.config
    }

    /// Current range state.
    #[must_use]
    pub fn state(&self) -> RangeState {
        self.state
    }

    /// Nearest point of interest, present unless the state is Out.
    #[must_use]
    pub fn nearest(&self) -> Option<&NearestPoi> {
        self.nearest.as_ref()
    }

    /// True while the rider can interact.
    #[must_use]
    pub fn is_in_range(&self) -> bool {
        self.state == RangeState::InRange
    }

    /// Finds the nearest point to `position` and advances the state machine.
    ///
    /// Ties resolve to the earlier registry entry.
    pub fn update(&mut self, position: Vec3, registry: &PoiRegistry) -> Option<ProximityEvent> {
        let closest = registry
            .iter()
            .enumerate()
            .map(|(index, poi)| (index, poi.distance_to(position.x, position.z)))
            .fold(None, |best: Option<(usize, f32)>, (index, distance)| match best {
                Some((_, d)) if d <= distance => best,
                _ => Some((index, distance)),
            })
            .and_then(|(index, distance)| {
                registry.get(index).map(|poi| NearestPoi {
                    index,
                    key: poi.key.clone(),
                    distance,
                })
            });
        self.observe(closest)
    }

    /// Advances the state machine from an already-computed nearest point.
    pub fn observe(&mut self, closest: Option<NearestPoi>) -> Option<ProximityEvent> {
        let distance = closest.as_ref().map_or(f32::INFINITY, |c| c.distance);
        let was = self.state;

        let next = if distance < self.config.interaction_radius {
            RangeState::InRange
        } else if was == RangeState::InRange || distance < self.config.approach_radius {
            RangeState::Approach
        } else {
            RangeState::Out
        };

        let event = match (was, next) {
            (RangeState::InRange, RangeState::InRange) => None,
            (_, RangeState::InRange) => closest.clone().map(ProximityEvent::Approach),
            (RangeState::InRange, _) => self.nearest.clone().map(ProximityEvent::Leave),
            _ => None,
        };

        if was != next {
            debug!(from = ?was, to = ?next, distance, "Range state changed");
        }

        self.state = next;
        self.nearest = if next == RangeState::Out { None } else { closest };
        event
    }

    /// Back to Out with no nearest point, without emitting events.
    pub fn reset(&mut self) {
        self.state = RangeState::Out;
        self.nearest = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canter_procedural::PointOfInterest;

    fn registry() -> PoiRegistry {
        PoiRegistry::new(vec![
            PointOfInterest::new("a", "A", 0.0, 0.0, true),
            PointOfInterest::new("b", "B", 200.0, 0.0, false),
        ])
        .unwrap()
    }

    fn at(x: f32) -> Vec3 {
        Vec3::new(x, 7.0, 0.0)
    }

    #[test]
    fn test_hysteresis_sequence() {
        let registry = registry();
        let mut tracker = ProximityTracker::new(ProximityConfig::default());

        let distances = [5.0, 19.0, 21.0, 30.0, 40.0];
        let expected = [
            RangeState::InRange,
            RangeState::InRange,
            RangeState::Approach,
            RangeState::Approach,
            RangeState::Out,
        ];

        let mut events = Vec::new();
        for (tick, (&d, &state)) in distances.iter().zip(expected.iter()).enumerate() {
            if let Some(event) = tracker.update(at(d), &registry) {
                events.push((tick, event));
            }
            assert_eq!(tracker.state(), state, "tick {tick} at {d}");
        }

        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], (0, ProximityEvent::Approach(n)) if n.key.as_str() == "a"));
        assert!(matches!(&events[1], (2, ProximityEvent::Leave(n)) if n.key.as_str() == "a"));
    }

    #[test]
    fn test_leaving_in_range_lands_in_approach_even_when_far() {
        let registry = registry();
        let mut tracker = ProximityTracker::new(ProximityConfig::default());

        tracker.update(at(5.0), &registry);
        let event = tracker.update(at(100.0), &registry);
        assert_eq!(tracker.state(), RangeState::Approach);
        assert!(matches!(event, Some(ProximityEvent::Leave(_))));

        tracker.update(at(100.0), &registry);
        assert_eq!(tracker.state(), RangeState::Out);
        assert!(tracker.nearest().is_none());
    }

    #[test]
    fn test_out_to_approach_is_silent() {
        let registry = registry();
        let mut tracker = ProximityTracker::new(ProximityConfig::default());

        assert!(tracker.update(at(60.0), &registry).is_none());
        assert!(tracker.update(at(30.0), &registry).is_none());
        assert_eq!(tracker.state(), RangeState::Approach);
        assert_eq!(tracker.nearest().map(|n| n.key.as_str()), Some("a"));
        assert!(tracker.update(at(60.0), &registry).is_none());
        assert_eq!(tracker.state(), RangeState::Out);
    }

    #[test]
    fn test_distance_ignores_height() {
        let registry = registry();
        let mut tracker = ProximityTracker::new(ProximityConfig::default());
        tracker.update(Vec3::new(0.0, 500.0, 10.0), &registry);
        assert!(tracker.is_in_range());
        assert!((tracker.nearest().unwrap().distance - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_nearest_switches_between_points() {
        let registry = registry();
        let mut tracker = ProximityTracker::new(ProximityConfig::default());

        tracker.update(at(10.0), &registry);
        let leave = tracker.update(at(100.0), &registry);
        assert!(matches!(leave, Some(ProximityEvent::Leave(n)) if n.key.as_str() == "a"));

        let approach = tracker.update(at(195.0), &registry);
        assert!(matches!(approach, Some(ProximityEvent::Approach(n)) if n.key.as_str() == "b"));
    }

    #[test]
    fn test_empty_registry_stays_out() {
        let mut tracker = ProximityTracker::new(ProximityConfig::default());
        assert!(tracker.update(at(0.0), &PoiRegistry::default()).is_none());
        assert_eq!(tracker.state(), RangeState::Out);
    }

    #[test]
    fn test_config_validation() {
        assert!(ProximityConfig::default().validate().is_ok());
        let inverted = ProximityConfig {
            interaction_radius: 40.0,
            approach_radius: 35.0,
        };
        assert!(inverted.validate().is_err());
    }
}
