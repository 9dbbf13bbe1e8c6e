//! # Camera Rig
//!
//! Third-person follow camera with a scripted orbit ("cinematic").
//!
//! ```text
//!            play_cinematic                 t >= 1 (callback fires)
//!   Follow ─────────────────> Cinematic ─────────────────────────> Follow
//!      ^                          │
//!      └──────── stop_cinematic ──┘  (callback dropped)
//! ```
//!
//! Offsets are expressed in the rider's yaw frame; the frame itself is
//! slerped toward the rider's heading so sharp turns swing the camera
//! smoothly. Every rate is applied as `min(rate * dt, 1)`.

use std::f32::consts::{PI, TAU};
use std::fmt;

use canter_shared::{ease_out_cubic, lerp, step_factor, Quaternion, Vec3};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::locomotion::CharacterPose;

// ============================================================================
// CONFIGURATION
// ============================================================================

/// End state and timing of the cinematic orbit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CinematicConfig {
    /// Seconds from start to finish. Zero or less finishes on the next update.
    pub duration: f32,
    /// Orbit angle added to the starting angle, radians.
    pub sweep: f32,
    /// Horizontal distance at the end.
    pub end_radius: f32,
    /// Height at the end.
    pub end_height: f32,
    /// Look-at offset at the end.
    pub end_look_at: Vec3,
}

impl Default for CinematicConfig {
    fn default() -> Self {
        Self {
            duration: 2.0,
            sweep: PI * 0.83,
            end_radius: 12.0,
            end_height: 6.0,
            end_look_at: Vec3::new(0.0, 1.5, -1.0),
        }
    }
}

/// Tuning for the camera rig.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Resting field of view, degrees.
    pub fov: f32,
    /// Offset behind the rider while exploring.
    pub follow_offset: Vec3,
    /// Look-at offset from the rider.
    pub look_at_offset: Vec3,
    /// Tighter offset used near a point of interest.
    pub approach_offset: Vec3,
    /// Position and look-at follow rate, per second.
    pub follow_rate: f32,
    /// Offset blend rate toward the target offset, per second.
    pub offset_blend_rate: f32,
    /// Yaw frame slerp rate, per second.
    pub rotation_rate: f32,
    /// Smoothing of the speed-driven shake and fov, per second.
    pub speed_smoothing: f32,
    /// Extra fov at full speed, degrees.
    pub fov_boost: f32,
    /// Shake amplitude at full speed.
    pub shake_amplitude: f32,
    /// Shake phase rate at rest.
    pub shake_base_frequency: f32,
    /// Additional shake phase rate at full speed.
    pub shake_speed_frequency: f32,
    /// Cinematic orbit.
    pub cinematic: CinematicConfig,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: 55.0,
            follow_offset: Vec3::new(0.0, 8.0, 14.0),
            look_at_offset: Vec3::new(0.0, 2.0, -4.0),
            approach_offset: Vec3::new(0.0, 5.0, 9.0),
            follow_rate: 5.0,
            offset_blend_rate: 2.0,
            rotation_rate: 8.0,
            speed_smoothing: 3.0,
            fov_boost: 7.0,
            shake_amplitude: 0.04,
            shake_base_frequency: 8.0,
            shake_speed_frequency: 12.0,
            cinematic: CinematicConfig::default(),
        }
    }
}

impl CameraConfig {
    /// Checks rates and the field of view.
    ///
    /// # Errors
    ///
    /// Returns a description of the first bad value.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.fov.is_finite() && self.fov > 0.0 && self.fov < 180.0) {
            return Err(format!("camera.fov must be in (0, 180), got {}", self.fov));
        }
        let rates = [
            ("follow_rate", self.follow_rate),
            ("offset_blend_rate", self.offset_blend_rate),
            ("rotation_rate", self.rotation_rate),
            ("speed_smoothing", self.speed_smoothing),
        ];
        for (name, value) in rates {
            if !(value.is_finite() && value >= 0.0) {
                return Err(format!("camera.{name} must be non-negative, got {value}"));
            }
        }
        if !self.cinematic.duration.is_finite() {
            return Err("camera.cinematic.duration must be finite".to_string());
        }
        Ok(())
    }
}

// ============================================================================
// RIG
// ============================================================================

/// Runs once when a cinematic completes naturally.
pub type CinematicCallback = Box<dyn FnOnce() + Send>;

/// Which behavior owns the camera.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CameraMode {
    /// Trailing the rider.
    Follow,
    /// Scripted orbit in progress.
    Cinematic,
}

/// What a renderer needs to place the camera.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraTransform {
    /// Eye position.
    pub position: Vec3,
    /// Point the camera looks at.
    pub look_at: Vec3,
    /// Vertical field of view, degrees.
    pub fov: f32,
}

/// Slack on the cinematic end time. A run of `dt` steps summing to the
/// duration can land a hair short in floating point.
const CINEMATIC_END_SLACK: f64 = 1e-4;

/// `shake_time` wraps at this period. Both shake waves (`1.1 t` and `1.7 t`)
/// complete whole cycles over it, so the wrap is seamless.
const SHAKE_PERIOD: f32 = TAU * 10.0;

struct Cinematic {
    elapsed: f64,
    duration: f32,
    start_angle: f32,
    start_radius: f32,
    start_height: f32,
    end_angle: f32,
    end_radius: f32,
    end_height: f32,
    start_look_at: Vec3,
    end_look_at: Vec3,
    on_complete: Option<CinematicCallback>,
}

impl fmt::Debug for Cinematic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cinematic")
            .field("elapsed", &self.elapsed)
            .field("duration", &self.duration)
            .field("has_callback", &self.on_complete.is_some())
            .finish_non_exhaustive()
    }
}

/// Follow camera with an optional scripted orbit.
#[derive(Debug)]
pub struct CameraRig {
    config: CameraConfig,
    position: Vec3,
    look_at: Vec3,
    offset: Vec3,
    target_offset: Vec3,
    look_offset: Vec3,
    target_look_offset: Vec3,
    rotation: Quaternion,
    speed_ratio: f32,
    shake_intensity: f32,
    fov: f32,
    shake_time: f32,
    cinematic: Option<Cinematic>,
}

impl CameraRig {
    /// Creates a rig already attached behind `pose`.
    #[must_use]
    pub fn new(config: CameraConfig, pose: &CharacterPose) -> Self {
        let mut rig = Self {
            position: Vec3::ZERO,
            look_at: Vec3::ZERO,
            offset: config.follow_offset,
            target_offset: config.follow_offset,
            look_offset: config.look_at_offset,
            target_look_offset: config.look_at_offset,
            rotation: Quaternion::IDENTITY,
            speed_ratio: 0.0,
            shake_intensity: 0.0,
            fov: config.fov,
            shake_time: 0.0,
            cinematic: None,
            config,
        };
        rig.attach(pose);
        rig
    }

    /// Snaps the rig behind `pose` with no easing.
    pub fn attach(&mut self, pose: &CharacterPose) {
        self.rotation = Quaternion::from_rotation_y(pose.yaw);
        self.position = self.rotation.rotate(self.offset) + pose.position;
        self.look_at = self.rotation.rotate(self.look_offset) + pose.position;
    }

    /// Feeds the rider's speed ratio; values above 1 are capped.
    pub fn set_speed_ratio(&mut self, ratio: f32) {
        self.speed_ratio = if ratio.is_finite() { ratio.clamp(0.0, 1.0) } else { 0.0 };
    }

    /// Switches between the normal and the tighter approach offset.
    ///
    /// Ignored while a cinematic owns the offset.
    pub fn set_approach_mode(&mut self, active: bool) {
        if self.cinematic.is_some() {
            debug!(active, "Approach mode ignored during cinematic");
            return;
        }
        self.target_offset = if active {
            self.config.approach_offset
        } else {
            self.config.follow_offset
        };
        self.target_look_offset = self.config.look_at_offset;
    }

    /// Starts the orbit from the current offset.
    ///
    /// Returns `false` and drops `on_complete` unfired if a cinematic is
    /// already running.
    pub fn play_cinematic<F>(&mut self, on_complete: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        if self.cinematic.is_some() {
            info!("Cinematic already running, request ignored");
            return false;
        }

        let cfg = &self.config.cinematic;
        let start_angle = self.offset.x.atan2(self.offset.z);
        self.cinematic = Some(Cinematic {
            elapsed: 0.0,
            duration: cfg.duration,
            start_angle,
            start_radius: self.offset.x.hypot(self.offset.z),
            start_height: self.offset.y,
            end_angle: start_angle + cfg.sweep,
            end_radius: cfg.end_radius,
            end_height: cfg.end_height,
            start_look_at: self.look_offset,
            end_look_at: cfg.end_look_at,
            on_complete: Some(Box::new(on_complete)),
        });
        info!(duration = cfg.duration, "Cinematic started");
        true
    }

    /// Cancels any cinematic and returns the targets to the follow defaults.
    ///
    /// The pending callback is dropped unfired.
    pub fn stop_cinematic(&mut self) {
        if self.cinematic.take().is_some() {
            info!("Cinematic stopped");
        }
        self.target_offset = self.config.follow_offset;
        self.target_look_offset = self.config.look_at_offset;
    }

    /// Advances the rig by `dt` seconds around `pose`.
    ///
    /// Returns `true` on the tick a cinematic completes naturally.
    pub fn update(&mut self, pose: &CharacterPose, dt: f32) -> bool {
        let smoothing = step_factor(self.config.speed_smoothing, dt);
        self.shake_intensity = lerp(self.shake_intensity, self.speed_ratio, smoothing);
        let target_fov = self.config.fov + self.shake_intensity * self.config.fov_boost;
        self.fov = lerp(self.fov, target_fov, smoothing);

        self.shake_time += dt
            * (self.config.shake_base_frequency
                + self.shake_intensity * self.config.shake_speed_frequency);
        self.shake_time = self.shake_time.rem_euclid(SHAKE_PERIOD);
        let amplitude = self.shake_intensity * self.config.shake_amplitude;
        let shake_x = (self.shake_time * 1.1).sin() * amplitude;
        let shake_y = (self.shake_time * 1.7).sin() * amplitude * 0.6;

        let heading = Quaternion::from_rotation_y(pose.yaw);
        self.rotation = self
            .rotation
            .slerp(heading, step_factor(self.config.rotation_rate, dt));

        if let Some(cin) = self.cinematic.as_mut() {
            cin.elapsed += f64::from(dt);
            let duration = f64::from(cin.duration);
            let t = if cin.elapsed + CINEMATIC_END_SLACK >= duration {
                1.0
            } else {
                (cin.elapsed / duration) as f32
            };
            let eased = ease_out_cubic(t);

            let angle = lerp(cin.start_angle, cin.end_angle, eased);
            let radius = lerp(cin.start_radius, cin.end_radius, eased);
            let height = lerp(cin.start_height, cin.end_height, eased);
            self.offset = Vec3::new(angle.sin() * radius, height, angle.cos() * radius);
            self.look_offset = cin.start_look_at.lerp(cin.end_look_at, eased);

            self.position = self.rotation.rotate(self.offset) + pose.position;
            self.look_at = self.rotation.rotate(self.look_offset) + pose.position;

            if t >= 1.0 {
                self.target_offset = self.offset;
                self.target_look_offset = self.look_offset;
                let callback = cin.on_complete.take();
                self.cinematic = None;
                info!("Cinematic finished");
                if let Some(callback) = callback {
                    callback();
                }
                return true;
            }
            return false;
        }

        let blend = step_factor(self.config.offset_blend_rate, dt);
        self.offset = self.offset.lerp(self.target_offset, blend);
        self.look_offset = self.look_offset.lerp(self.target_look_offset, blend);

        let follow = step_factor(self.config.follow_rate, dt);
        let desired = self.rotation.rotate(self.offset) + pose.position;
        self.position = self.position.lerp(desired, follow);
        self.position.x += shake_x;
        self.position.y += shake_y;

        let desired_look = self.rotation.rotate(self.look_offset) + pose.position;
        self.look_at = self.look_at.lerp(desired_look, follow);
        false
    }

    /// Current camera placement.
    #[must_use]
    pub fn transform(&self) -> CameraTransform {
        CameraTransform {
            position: self.position,
            look_at: self.look_at,
            fov: self.fov,
        }
    }

    /// Follow or Cinematic.
    #[must_use]
    pub fn mode(&self) -> CameraMode {
        if self.cinematic.is_some() {
            CameraMode::Cinematic
        } else {
            CameraMode::Follow
        }
    }

    /// True while the orbit runs.
    #[must_use]
    pub fn is_cinematic_active(&self) -> bool {
        self.cinematic.is_some()
    }

    /// Angle between the smoothed camera frame and `yaw`, radians.
    #[must_use]
    pub fn yaw_error(&self, yaw: f32) -> f32 {
        self.rotation.angle_to(Quaternion::from_rotation_y(yaw))
    }

    /// Current offset in the rider's frame.
    #[must_use]
    pub fn offset(&self) -> Vec3 {
        self.offset
    }

    /// Offset the rig is easing toward.
    #[must_use]
    pub fn target_offset(&self) -> Vec3 {
        self.target_offset
    }

    /// Smoothed shake intensity in `[0, 1]`.
    #[must_use]
    pub fn shake_intensity(&self) -> f32 {
        self.shake_intensity
    }

    /// Tuning in use.
    #[must_use]
    pub fn config(&self) -> &CameraConfig {
        &self.config
    }
}
