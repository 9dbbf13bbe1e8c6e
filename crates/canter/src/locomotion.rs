//! # Locomotion
//!
//! Kinematic character controller: input in, pose out.
//!
//! Features:
//! - Asymmetric speed easing with snap-to-zero
//! - Speed-dependent turning agility
//! - Hard square world fence
//! - Terrain following with three probes, smoothed height, pitch and lean

use canter_procedural::HeightField;
use canter_shared::constants::WORLD_FENCE_RATIO;
use canter_shared::{lerp, step_factor, Vec3};
use serde::{Deserialize, Serialize};

use crate::input::{Action, InputSource};

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Tuning for the character controller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocomotionConfig {
    /// Walking speed; backward speed derives from it.
    pub walk_speed: f32,
    /// Forward speed without the gallop modifier.
    pub trot_speed: f32,
    /// Top speed.
    pub gallop_speed: f32,
    /// Easing rate when speeding up, per second.
    pub acceleration: f32,
    /// Easing rate when slowing down, per second.
    pub deceleration: f32,
    /// Base turn rate, radians per second.
    pub turn_rate: f32,
    /// Backward speed as a fraction of walking speed.
    pub backward_factor: f32,
    /// Extra turning agility at standstill (`k` in `1 + (1 - |v|/vmax) * k`).
    pub agility: f32,
    /// Analog steering scale.
    pub analog_turn_scale: f32,
    /// Speeds below this snap to zero when no throttle is held.
    pub stop_epsilon: f32,
    /// Fence half-extent as a fraction of the world size.
    pub fence_ratio: f32,
    /// Distance of the front and back terrain probes.
    pub probe_distance: f32,
    /// Height kept above the highest probe.
    pub ground_clearance: f32,
    /// Vertical smoothing rate, per second.
    pub height_smoothing: f32,
    /// Pitch smoothing rate, per second.
    pub pitch_smoothing: f32,
    /// Lean smoothing rate, per second.
    pub lean_smoothing: f32,
    /// Lean at full turn and top speed, radians.
    pub max_lean: f32,
}

impl Default for LocomotionConfig {
    fn default() -> Self {
        Self {
            walk_speed: 8.0,
            trot_speed: 14.0,
            gallop_speed: 32.0,
            acceleration: 12.0,
            deceleration: 14.0,
            turn_rate: 2.2,
            backward_factor: 0.6,
            agility: 0.5,
            analog_turn_scale: 0.7,
            stop_epsilon: 0.5,
            fence_ratio: WORLD_FENCE_RATIO,
            probe_distance: 1.2,
            ground_clearance: 0.2,
            height_smoothing: 8.0,
            pitch_smoothing: 4.0,
            lean_smoothing: 5.0,
            max_lean: 0.08,
        }
    }
}

impl LocomotionConfig {
    /// Checks that speeds, rates and distances are usable.
    ///
    /// # Errors
    ///
    /// Returns a description of the first bad value.
    pub fn validate(&self) -> Result<(), String> {
        let positive = [
            ("walk_speed", self.walk_speed),
            ("trot_speed", self.trot_speed),
            ("gallop_speed", self.gallop_speed),
            ("acceleration", self.acceleration),
            ("deceleration", self.deceleration),
            ("probe_distance", self.probe_distance),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(format!("locomotion.{name} must be positive, got {value}"));
            }
        }
        let non_negative = [
            ("turn_rate", self.turn_rate),
            ("backward_factor", self.backward_factor),
            ("agility", self.agility),
            ("analog_turn_scale", self.analog_turn_scale),
            ("stop_epsilon", self.stop_epsilon),
            ("fence_ratio", self.fence_ratio),
            ("ground_clearance", self.ground_clearance),
            ("height_smoothing", self.height_smoothing),
            ("pitch_smoothing", self.pitch_smoothing),
            ("lean_smoothing", self.lean_smoothing),
            ("max_lean", self.max_lean),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(format!("locomotion.{name} must be non-negative, got {value}"));
            }
        }
        if self.fence_ratio > 0.5 {
            return Err(format!(
                "locomotion.fence_ratio must keep the rider inside the world, got {}",
                self.fence_ratio
            ));
        }
        if self.walk_speed > self.trot_speed || self.trot_speed > self.gallop_speed {
            return Err(format!(
                "locomotion speeds must satisfy walk <= trot <= gallop, got {} / {} / {}",
                self.walk_speed, self.trot_speed, self.gallop_speed
            ));
        }
        Ok(())
    }
}

// ============================================================================
// POSE
// ============================================================================

/// Movement band derived from absolute speed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MovementState {
    /// Standing still.
    Idle,
    /// Slow movement, including backing up.
    Walk,
    /// Cruising.
    Trot,
    /// Top speed.
    Gallop,
}

impl MovementState {
    /// Classifies `speed` against the configured bands.
    #[must_use]
    pub fn classify(speed: f32, config: &LocomotionConfig) -> Self {
        let abs = speed.abs();
        if abs < config.stop_epsilon {
            Self::Idle
        } else if abs < config.walk_speed + 1.0 {
            Self::Walk
        } else if abs < config.trot_speed + 1.0 {
            Self::Trot
        } else {
            Self::Gallop
        }
    }

    /// Lowercase label for logs and HUDs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Walk => "walk",
            Self::Trot => "trot",
            Self::Gallop => "gallop",
        }
    }
}

/// The character's kinematic state.
///
/// Yaw 0 faces `-Z`; positive yaw turns left.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CharacterPose {
    /// World position. `y` is the smoothed ground height.
    pub position: Vec3,
    /// Heading, radians.
    pub yaw: f32,
    /// Forward tilt from terrain slope, radians.
    pub pitch: f32,
    /// Roll from turning, radians.
    pub lean: f32,
    /// Signed speed along the heading. Negative when backing up.
    pub speed: f32,
    /// While set, the controller leaves the pose untouched.
    pub frozen: bool,
}

impl Default for CharacterPose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            lean: 0.0,
            speed: 0.0,
            frozen: false,
        }
    }
}

impl CharacterPose {
    /// Unit vector along the heading, on the horizontal plane.
    #[inline]
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        Vec3::new(-self.yaw.sin(), 0.0, -self.yaw.cos())
    }

    /// `|speed| / top_speed`, capped at 1.
    #[inline]
    #[must_use]
    pub fn speed_ratio(&self, top_speed: f32) -> f32 {
        if top_speed > 0.0 {
            (self.speed.abs() / top_speed).min(1.0)
        } else {
            0.0
        }
    }

    /// Back to the origin facing `-Z` at rest. Keeps the frozen flag.
    pub fn respawn(&mut self) {
        *self = Self {
            frozen: self.frozen,
            ..Self::default()
        };
    }
}

// ============================================================================
// CONTROLLER
// ============================================================================

/// Integrates input into a [`CharacterPose`] over a [`HeightField`].
#[derive(Clone, Debug)]
pub struct LocomotionController {
    config: LocomotionConfig,
    /// Height smoothing starts from the first ground sample.
    grounded: bool,
}

impl LocomotionController {
    /// Creates a controller.
    #[must_use]
    pub fn new(config: LocomotionConfig) -> Self {
        Self {
            config,
            grounded: false,
        }
    }

    /// Tuning in use.
    #[must_use]
    pub fn config(&self) -> &LocomotionConfig {
        &self.config
    }

    /// Movement band of `pose`.
    #[must_use]
    pub fn movement_state(&self, pose: &CharacterPose) -> MovementState {
        MovementState::classify(pose.speed, &self.config)
    }

    /// Makes the next update snap height instead of easing into it.
    pub fn reset_grounding(&mut self) {
        self.grounded = false;
    }

    /// Advances `pose` by `dt` seconds.
    pub fn update(
        &mut self,
        pose: &mut CharacterPose,
        input: &dyn InputSource,
        field: &HeightField,
        dt: f32,
    ) {
        if pose.frozen {
            return;
        }
        let cfg = &self.config;

        // Speed
        let mut target = 0.0;
        if input.is_pressed(Action::Forward) {
            target = if input.is_pressed(Action::Gallop) {
                cfg.gallop_speed
            } else {
                cfg.trot_speed
            };
        }
        if input.is_pressed(Action::Backward) {
            target = -cfg.walk_speed * cfg.backward_factor;
        }

        let previous = pose.speed;
        let rate = if target > previous {
            cfg.acceleration
        } else {
            cfg.deceleration
        };
        pose.speed = lerp(previous, target, step_factor(rate, dt));

        if pose.speed.abs() < cfg.stop_epsilon && target == 0.0 {
            pose.speed = 0.0;
        }
        if previous > 0.0 && pose.speed < 0.0 {
            pose.speed = 0.0;
        }
        if pose.speed < 0.0 && target >= 0.0 {
            pose.speed = 0.0;
        }

        // Turning
        let turn_multiplier = 1.0 + (1.0 - pose.speed.abs() / cfg.gallop_speed) * cfg.agility;
        let turn_step = cfg.turn_rate * turn_multiplier * dt;
        let raw_x = input.analog().x;
        let left = input.is_pressed(Action::Left);
        let right = input.is_pressed(Action::Right);

        if raw_x == 0.0 {
            if left {
                pose.yaw += turn_step;
            }
            if right {
                pose.yaw -= turn_step;
            }
        } else {
            let curved = raw_x.signum() * raw_x * raw_x;
            pose.yaw -= turn_step * curved * cfg.analog_turn_scale;
        }

        // Position
        let forward = pose.forward();
        pose.position += forward * (pose.speed * dt);

        let fence = field.params().world_size * cfg.fence_ratio;
        pose.position.x = pose.position.x.clamp(-fence, fence);
        pose.position.z = pose.position.z.clamp(-fence, fence);

        // Terrain following
        let cx = pose.position.x;
        let cz = pose.position.z;
        let probe = forward * cfg.probe_distance;
        let h_center = field.query(cx, cz);
        let h_front = field.query(cx + probe.x, cz + probe.z);
        let h_back = field.query(cx - probe.x, cz - probe.z);
        let ground = h_center.max(h_front).max(h_back) + cfg.ground_clearance;

        if self.grounded {
            pose.position.y = lerp(pose.position.y, ground, step_factor(cfg.height_smoothing, dt));
        } else {
            pose.position.y = ground;
            self.grounded = true;
        }

        let target_pitch = (h_front - h_back).atan2(2.0 * cfg.probe_distance);
        pose.pitch = lerp(pose.pitch, target_pitch, step_factor(cfg.pitch_smoothing, dt));

        let turning = if raw_x == 0.0 {
            f32::from(u8::from(left)) - f32::from(u8::from(right))
        } else {
            -raw_x
        };
        let target_lean = turning * cfg.max_lean * (pose.speed / cfg.gallop_speed);
        pose.lean = lerp(pose.lean, target_lean, step_factor(cfg.lean_smoothing, dt));
    }
}
