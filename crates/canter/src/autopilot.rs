//! # Autopilot
//!
//! Steers the rider toward a point with plain digital input, the way a
//! player on a keyboard would. Used by the headless harness and tests.

use std::f32::consts::{PI, TAU};

use canter_shared::Vec2;

use crate::input::{Action, InputState};
use crate::locomotion::CharacterPose;

/// Digital steering toward a target on the ground plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Autopilot {
    /// Stop pressing forward inside this distance.
    pub arrive_radius: f32,
    /// Gallop while farther than this.
    pub gallop_distance: f32,
    /// Yaw error tolerated before steering, radians.
    pub heading_tolerance: f32,
}

impl Default for Autopilot {
    fn default() -> Self {
        Self {
            arrive_radius: 10.0,
            gallop_distance: 60.0,
            heading_tolerance: 0.05,
        }
    }
}

impl Autopilot {
    /// Input that moves `pose` toward `target`.
    #[must_use]
    pub fn steer(&self, pose: &CharacterPose, target: Vec2) -> InputState {
        let dx = target.x - pose.position.x;
        let dz = target.y - pose.position.z;
        let distance = dx.hypot(dz);

        let mut input = InputState::new();
        if distance <= self.arrive_radius {
            return input;
        }

        let error = heading_error(pose.yaw, (-dx).atan2(-dz));
        if error > self.heading_tolerance {
            input.press(Action::Left);
        } else if error < -self.heading_tolerance {
            input.press(Action::Right);
        }

        // Turn in place first when facing well away.
        if error.abs() < PI / 2.0 {
            input.press(Action::Forward);
            if distance > self.gallop_distance && error.abs() < 0.3 {
                input.press(Action::Gallop);
            }
        }
        input
    }

    /// True once `pose` is inside the arrive radius of `target`.
    #[must_use]
    pub fn arrived(&self, pose: &CharacterPose, target: Vec2) -> bool {
        pose.position.xz().distance(target) <= self.arrive_radius
    }
}

/// `desired - yaw` wrapped into `(-π, π]`.
#[inline]
fn heading_error(yaw: f32, desired: f32) -> f32 {
    let e = (desired - yaw).rem_euclid(TAU);
    if e > PI {
        e - TAU
    } else {
        e
    }
}
