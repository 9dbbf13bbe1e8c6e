//! # Canter
//!
//! Simulation core of a third-person riding game, integrating terrain,
//! character, proximity and camera.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                            SIMULATION LOOP                              │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────┐     ┌─────────────────┐     ┌─────────────────┐   │
//! │  │  HeightField    │────>│  Locomotion     │────>│  Proximity      │   │
//! │  │  (read-only)    │     │                 │     │                 │   │
//! │  │  • Noise        │     │  • Speed easing │     │  • Hysteresis   │   │
//! │  │  • Flat pads    │     │  • Turning      │     │  • Approach /   │   │
//! │  │  • Bilinear     │     │  • Terrain snap │     │    Leave events │   │
//! │  └─────────────────┘     └────────┬────────┘     └────────┬────────┘   │
//! │                                   │                       │            │
//! │                          ┌────────▼────────┐     ┌────────▼────────┐   │
//! │                          │  Camera rig     │<────│  Interaction    │   │
//! │                          │  • Follow       │     │  director       │   │
//! │                          │  • Cinematic    │     │  • Quest        │   │
//! │                          └─────────────────┘     └─────────────────┘   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `simulation`: Tick orchestration, frame clock, snapshots
//! - `locomotion`: Character controller
//! - `proximity`: Range state machine
//! - `camera`: Follow and cinematic camera rig
//! - `events`: Event bus between the core and its consumers
//! - `interaction` / `quest`: Prompt, panel and quest flow
//! - `config`: TOML configuration

pub mod autopilot;
pub mod camera;
pub mod config;
pub mod error;
pub mod events;
pub mod input;
pub mod interaction;
pub mod locomotion;
pub mod proximity;
pub mod quest;
pub mod simulation;

// Re-export the lower layers
pub use canter_procedural as procedural;
pub use canter_shared as shared;

// Re-export commonly used types
pub use autopilot::Autopilot;
pub use camera::{CameraConfig, CameraMode, CameraRig, CameraTransform, CinematicConfig};
pub use config::SimConfig;
pub use error::{ConfigError, SimError, SimResult};
pub use events::{EventBus, EventReceiver, EventSender, SimEvent};
pub use input::{Action, InputSource, InputState};
pub use interaction::{InteractResult, InteractionDirector, PanelState, PoiMarker};
pub use locomotion::{CharacterPose, LocomotionConfig, LocomotionController, MovementState};
pub use proximity::{NearestPoi, ProximityConfig, ProximityEvent, ProximityTracker, RangeState};
pub use quest::{ChoiceOutcome, Quest, QuestConfig, QuestHint, QuestStage};
pub use simulation::{ClockConfig, FrameClock, FrameSnapshot, SimulationLoop, TickStats};
