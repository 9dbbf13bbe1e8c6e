//! # Simulation Events
//!
//! Typed notifications from the simulation core to its collaborators
//! (prompt UI, HUD, audio, the interaction director).
//!
//! ```text
//! ┌──────────────┐      ┌─────────────┐      ┌──────────────────────┐
//! │  Simulation  │─────>│   Bounded   │─────>│  UI / interaction /  │
//! │     tick     │      │   channel   │      │  harness (drain)     │
//! └──────────────┘      └─────────────┘      └──────────────────────┘
//! ```
//!
//! Producers never block: a full queue drops the event and logs a warning
//! so the tick keeps its budget.

use canter_procedural::PoiKey;
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use tracing::warn;

use crate::proximity::NearestPoi;
use crate::quest::QuestStage;

/// Default queue depth; a tick emits a handful of events at most.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Events emitted by the simulation and the interaction flow.
#[derive(Clone, Debug, PartialEq)]
pub enum SimEvent {
    // =========================================================================
    // Proximity
    // =========================================================================
    /// The rider entered interaction range.
    Approach(NearestPoi),

    /// The rider left interaction range of the point that was nearest.
    Leave(NearestPoi),

    // =========================================================================
    // Camera
    // =========================================================================
    /// A cinematic orbit began.
    CinematicStarted,

    /// A cinematic orbit ran to completion and its callback fired.
    CinematicFinished,

    /// A running cinematic was cancelled.
    CinematicStopped,

    // =========================================================================
    // Character
    // =========================================================================
    /// Control was taken away or handed back.
    FrozenChanged {
        /// New frozen state.
        frozen: bool,
    },

    /// The rider was put back at the origin.
    Respawned,

    // =========================================================================
    // Interaction flow
    // =========================================================================
    /// The information panel for a point of interest is ready to show.
    PanelReady {
        /// Point the panel describes.
        key: PoiKey,
    },

    /// The quest moved to a new stage.
    QuestAdvanced {
        /// Stage now active.
        stage: QuestStage,
    },
}

/// Event bus between the simulation and its consumers.
///
/// Pre-allocates a bounded channel to prevent memory growth in the tick.
pub struct EventBus {
    sender: Sender<SimEvent>,
    receiver: Receiver<SimEvent>,
}

impl EventBus {
    /// Creates a new event bus.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Maximum events in flight before new ones are dropped.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity.max(1));
        Self { sender, receiver }
    }

    /// Creates a sender handle (clone for multiple producers).
    #[must_use]
    pub fn sender(&self) -> EventSender {
        EventSender {
            sender: self.sender.clone(),
        }
    }

    /// Creates a receiver handle.
    ///
    /// Clones share one queue: each event reaches exactly one receiver.
    #[must_use]
    pub fn receiver(&self) -> EventReceiver {
        EventReceiver {
            receiver: self.receiver.clone(),
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

/// Handle for sending events.
#[derive(Clone)]
pub struct EventSender {
    sender: Sender<SimEvent>,
}

impl EventSender {
    /// Sends an event (non-blocking).
    ///
    /// Returns `false` if the event was dropped.
    #[inline]
    pub fn send(&self, event: SimEvent) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                warn!(?event, "Event queue full, dropping event");
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

/// Handle for receiving events.
#[derive(Clone)]
pub struct EventReceiver {
    receiver: Receiver<SimEvent>,
}

impl EventReceiver {
    /// Receives all pending events (non-blocking).
    #[inline]
    pub fn drain(&self) -> Vec<SimEvent> {
        self.receiver.try_iter().collect()
    }

    /// Receives one event (non-blocking).
    #[inline]
    pub fn try_recv(&self) -> Option<SimEvent> {
        self.receiver.try_recv().ok()
    }

    /// Returns the number of pending events.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Checks if there are pending events.
    #[inline]
    #[must_use]
    pub fn has_events(&self) -> bool {
        !self.receiver.is_empty()
    }
}
