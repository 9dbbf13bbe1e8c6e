//! # Simulation Loop
//!
//! Owns every piece of per-tick state and runs the components in a fixed
//! order:
//!
//! ```text
//! Tick N (dt clamped to max_delta):
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │ 1. LOCOMOTION    input + heightfield ──> CharacterPose              │
//! │ 2. PROXIMITY     pose + registry ──> RangeState, Approach/Leave     │
//! │ 3. CAMERA        pose (read-only) ──> CameraTransform, cinematic    │
//! │ 4. SNAPSHOT      read-only FrameSnapshot for renderer / UI          │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Events land on the [`EventBus`]; consumers drain them once per tick.

use std::sync::Arc;
use std::time::Instant;

use canter_procedural::{HeightField, PoiRegistry};
use canter_shared::constants::MAX_FRAME_DELTA;
use canter_shared::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::camera::{CameraRig, CameraTransform};
use crate::config::SimConfig;
use crate::error::SimResult;
use crate::events::{EventBus, EventReceiver, EventSender, SimEvent, DEFAULT_EVENT_CAPACITY};
use crate::input::InputSource;
use crate::locomotion::{CharacterPose, LocomotionController, MovementState};
use crate::proximity::{NearestPoi, ProximityEvent, ProximityTracker, RangeState};

// ============================================================================
// CLOCK
// ============================================================================

/// Frame clock limits.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Largest delta a single tick may integrate, seconds.
    pub max_delta: f32,
    /// Event queue depth.
    pub event_capacity: usize,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            max_delta: MAX_FRAME_DELTA,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl ClockConfig {
    /// Requires a positive finite `max_delta` and a non-empty queue.
    ///
    /// # Errors
    ///
    /// Returns a description of the bad value.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.max_delta.is_finite() && self.max_delta > 0.0) {
            return Err(format!("clock.max_delta must be positive, got {}", self.max_delta));
        }
        if self.event_capacity == 0 {
            return Err("clock.event_capacity must be at least 1".to_string());
        }
        Ok(())
    }

    /// Clamps a raw delta into `[0, max_delta]`. Garbage becomes zero.
    #[inline]
    #[must_use]
    pub fn clamp(&self, raw_dt: f32) -> f32 {
        if raw_dt.is_finite() && raw_dt > 0.0 {
            raw_dt.min(self.max_delta)
        } else {
            0.0
        }
    }
}

/// Wall-clock source of tick deltas.
#[derive(Clone, Debug)]
pub struct FrameClock {
    last: Instant,
}

impl FrameClock {
    /// Starts measuring from now.
    #[must_use]
    pub fn new() -> Self {
        Self { last: Instant::now() }
    }

    /// Seconds since the previous call (or since construction).
    pub fn delta(&mut self) -> f32 {
        let now = Instant::now();
        let dt = now.duration_since(self.last).as_secs_f32();
        self.last = now;
        dt
    }

    /// Forgets the time spent since the last delta.
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Running counters.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TickStats {
    /// Ticks run.
    pub frames: u64,
    /// Ticks whose raw delta was out of range and got clamped.
    pub clamped_frames: u64,
    /// Sum of clamped deltas, seconds.
    pub simulated_time: f64,
}

// ============================================================================
// SNAPSHOT
// ============================================================================

/// Read-only view of one tick for renderers and UI.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameSnapshot {
    /// Tick number, starting at 1.
    pub frame: u64,
    /// Delta actually integrated.
    pub dt: f32,
    /// Character position.
    pub position: Vec3,
    /// Character heading.
    pub yaw: f32,
    /// Character forward tilt.
    pub pitch: f32,
    /// Character roll.
    pub lean: f32,
    /// Movement band.
    pub movement: MovementState,
    /// Absolute speed.
    pub speed: f32,
    /// Nearest point of interest, unless out of range of everything.
    pub nearest: Option<NearestPoi>,
    /// Proximity state.
    pub range: RangeState,
    /// Camera placement.
    pub camera: CameraTransform,
    /// Whether control is suspended.
    pub frozen: bool,
}

// ============================================================================
// LOOP
// ============================================================================

/// The simulation context: terrain, character, proximity and camera.
pub struct SimulationLoop {
    terrain: Arc<HeightField>,
    registry: Arc<PoiRegistry>,
    pose: CharacterPose,
    locomotion: LocomotionController,
    proximity: ProximityTracker,
    camera: CameraRig,
    clock_config: ClockConfig,
    clock: FrameClock,
    events: EventBus,
    sender: EventSender,
    stats: TickStats,
}

impl SimulationLoop {
    /// Validates `config`, builds the terrain and places the rider at the
    /// origin.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::SimError`] for invalid configuration or terrain.
    pub fn new(config: &SimConfig) -> SimResult<Self> {
        config.validate()?;
        let registry = config.registry()?;
        let terrain = HeightField::build(config.seed, &config.terrain, &registry)?;
        Ok(Self::from_parts(config, Arc::new(terrain), Arc::new(registry)))
    }

    /// Assembles a loop around an already-built terrain.
    ///
    /// `terrain` must have been built from `registry`.
    #[must_use]
    pub fn from_parts(config: &SimConfig, terrain: Arc<HeightField>, registry: Arc<PoiRegistry>) -> Self {
        let pose = CharacterPose::default();
        let camera = CameraRig::new(config.camera.clone(), &pose);
        let events = EventBus::new(config.clock.event_capacity);
        let sender = events.sender();

        info!(
            seed = config.seed.value(),
            points_of_interest = registry.len(),
            "Simulation ready"
        );

        Self {
            terrain,
            registry,
            pose,
            locomotion: LocomotionController::new(config.locomotion.clone()),
            proximity: ProximityTracker::new(config.proximity.clone()),
            camera,
            clock_config: config.clock.clone(),
            clock: FrameClock::new(),
            events,
            sender,
            stats: TickStats::default(),
        }
    }

    /// Runs one tick of `raw_dt` seconds (clamped).
    pub fn tick(&mut self, raw_dt: f32, input: &dyn InputSource) -> FrameSnapshot {
        let dt = self.clock_config.clamp(raw_dt);

        // 1. Locomotion
        self.locomotion.update(&mut self.pose, input, &self.terrain, dt);

        // 2. Proximity
        match self.proximity.update(self.pose.position, &self.registry) {
            Some(ProximityEvent::Approach(nearest)) => {
                self.sender.send(SimEvent::Approach(nearest));
            }
            Some(ProximityEvent::Leave(nearest)) => {
                self.sender.send(SimEvent::Leave(nearest));
            }
            None => {}
        }

        // 3. Camera
        let top_speed = self.locomotion.config().gallop_speed;
        self.camera.set_speed_ratio(self.pose.speed_ratio(top_speed));
        if self.camera.update(&self.pose, dt) {
            self.sender.send(SimEvent::CinematicFinished);
        }

        self.stats.frames += 1;
        if !(0.0..=self.clock_config.max_delta).contains(&raw_dt) {
            self.stats.clamped_frames += 1;
        }
        self.stats.simulated_time += f64::from(dt);

        self.snapshot_with_dt(dt)
    }

    /// Runs one tick using the wall clock.
    pub fn advance(&mut self, input: &dyn InputSource) -> FrameSnapshot {
        let raw_dt = self.clock.delta();
        self.tick(raw_dt, input)
    }

    /// Snapshot of the current state without ticking.
    #[must_use]
    pub fn snapshot(&self) -> FrameSnapshot {
        self.snapshot_with_dt(0.0)
    }

    fn snapshot_with_dt(&self, dt: f32) -> FrameSnapshot {
        FrameSnapshot {
            frame: self.stats.frames,
            dt,
            position: self.pose.position,
            yaw: self.pose.yaw,
            pitch: self.pose.pitch,
            lean: self.pose.lean,
            movement: self.locomotion.movement_state(&self.pose),
            speed: self.pose.speed.abs(),
            nearest: self.proximity.nearest().cloned(),
            range: self.proximity.state(),
            camera: self.camera.transform(),
            frozen: self.pose.frozen,
        }
    }

    // ========================================================================
    // CONTROLS
    // ========================================================================

    /// Suspends or resumes character control.
    pub fn set_frozen(&mut self, frozen: bool) {
        if self.pose.frozen != frozen {
            self.pose.frozen = frozen;
            info!(frozen, "Character control toggled");
            self.sender.send(SimEvent::FrozenChanged { frozen });
        }
    }

    /// Freezes the character and kills its speed.
    pub fn halt(&mut self) {
        self.set_frozen(true);
        self.pose.speed = 0.0;
    }

    /// Switches the camera between its follow and approach offsets.
    pub fn set_approach_mode(&mut self, active: bool) {
        self.camera.set_approach_mode(active);
    }

    /// Starts a cinematic orbit. Returns `false` if one is already running;
    /// `on_complete` is then dropped unfired.
    pub fn play_cinematic<F>(&mut self, on_complete: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        let started = self.camera.play_cinematic(on_complete);
        if started {
            self.sender.send(SimEvent::CinematicStarted);
        }
        started
    }

    /// Cancels a running cinematic and discards its callback.
    pub fn stop_cinematic(&mut self) {
        if self.camera.is_cinematic_active() {
            self.camera.stop_cinematic();
            self.sender.send(SimEvent::CinematicStopped);
        }
    }

    /// Puts the rider back at the origin and snaps the camera behind them.
    pub fn respawn(&mut self) {
        self.pose.respawn();
        self.locomotion.reset_grounding();
        self.proximity.reset();
        self.camera.attach(&self.pose);
        self.clock.reset();
        debug!("Rider respawned");
        self.sender.send(SimEvent::Respawned);
    }

    /// Moves the rider to `position` on the ground, keeping heading.
    pub fn teleport(&mut self, position: Vec3) {
        self.pose.position = position;
        self.pose.speed = 0.0;
        self.locomotion.reset_grounding();
        self.camera.attach(&self.pose);
        debug!(x = position.x, z = position.z, "Rider teleported");
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    /// Character pose.
    #[must_use]
    pub fn pose(&self) -> &CharacterPose {
        &self.pose
    }

    /// Shared terrain handle.
    #[must_use]
    pub fn terrain(&self) -> &Arc<HeightField> {
        &self.terrain
    }

    /// Shared point-of-interest registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<PoiRegistry> {
        &self.registry
    }

    /// Proximity state machine.
    #[must_use]
    pub fn proximity(&self) -> &ProximityTracker {
        &self.proximity
    }

    /// Camera rig.
    #[must_use]
    pub fn camera(&self) -> &CameraRig {
        &self.camera
    }

    /// Character controller.
    #[must_use]
    pub fn locomotion(&self) -> &LocomotionController {
        &self.locomotion
    }

    /// Movement band of the character.
    #[must_use]
    pub fn movement_state(&self) -> MovementState {
        self.locomotion.movement_state(&self.pose)
    }

    /// Receiver for simulation events.
    #[must_use]
    pub fn events(&self) -> EventReceiver {
        self.events.receiver()
    }

    /// Sender for collaborators that emit their own events.
    #[must_use]
    pub fn event_sender(&self) -> EventSender {
        self.events.sender()
    }

    /// Running counters.
    #[must_use]
    pub fn stats(&self) -> TickStats {
        self.stats
    }

    /// Ticks run so far.
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.stats.frames
    }
}
