//! # Interaction Flow
//!
//! Turns proximity events and interact presses into prompts, cinematics,
//! information panels and quest progress. Holds no rendering state: a UI
//! layer reads [`InteractionDirector::prompt`], [`InteractionDirector::panel`]
//! and [`InteractionDirector::poi_markers`] each frame.
//!
//! ```text
//!   Approach ──> prompt shown, camera approach mode on
//!   Leave    ──> prompt hidden, camera approach mode off
//!
//!   interact (InRange) ──> freeze, cinematic ──(PanelReady)──> panel open
//!   interact (panel open) ──> panel closed, cinematic stopped, unfreeze
//! ```

use canter_procedural::PoiKey;
use canter_shared::Vec2;
use tracing::{debug, info};

use crate::events::{EventReceiver, EventSender, SimEvent};
use crate::quest::{ChoiceOutcome, Quest, QuestConfig, QuestHint, QuestStage};
use crate::simulation::SimulationLoop;

/// Information panel state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum PanelState {
    /// Nothing shown.
    #[default]
    Closed,
    /// Cinematic running; the panel opens when it finishes.
    Pending(PoiKey),
    /// Panel visible.
    Open(PoiKey),
}

/// What an interact press did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InteractResult {
    /// Nothing to interact with, or the press is not allowed right now.
    Ignored,
    /// Started the cinematic toward this point's panel.
    CinematicStarted(PoiKey),
    /// Closed the open panel.
    PanelClosed,
}

/// HUD marker for a point of interest.
#[derive(Clone, Debug, PartialEq)]
pub struct PoiMarker {
    /// Key.
    pub key: PoiKey,
    /// Display name.
    pub name: String,
    /// Ethical flag.
    pub ethical: bool,
    /// World X.
    pub x: f32,
    /// World Z.
    pub z: f32,
    /// True for the quest's first destination.
    pub is_target: bool,
}

impl PoiMarker {
    /// Ground-plane position.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.z)
    }
}

/// Drives prompts, panels and the quest from simulation events.
pub struct InteractionDirector {
    quest: Quest,
    started: bool,
    celebrating: bool,
    prompt: Option<PoiKey>,
    panel: PanelState,
    markers: Vec<PoiMarker>,
    receiver: EventReceiver,
    sender: EventSender,
}

impl InteractionDirector {
    /// Attaches to `sim`'s event bus and caches the HUD markers.
    #[must_use]
    pub fn new(sim: &SimulationLoop, config: &QuestConfig) -> Self {
        let markers = sim
            .registry()
            .iter()
            .map(|poi| PoiMarker {
                key: poi.key.clone(),
                name: poi.name.clone(),
                ethical: poi.ethical,
                x: poi.x,
                z: poi.z,
                is_target: poi.key == config.target,
            })
            .collect();

        Self {
            quest: Quest::new(config),
            started: false,
            celebrating: false,
            prompt: None,
            panel: PanelState::Closed,
            markers,
            receiver: sim.events(),
            sender: sim.event_sender(),
        }
    }

    /// Begins the quest. Later calls do nothing.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        let stage = self.quest.start().clone();
        info!(%stage, "Ride started");
        self.sender.send(SimEvent::QuestAdvanced { stage });
    }

    /// Drains the event bus, reacts to each event and returns them in order.
    pub fn pump(&mut self, sim: &mut SimulationLoop) -> Vec<SimEvent> {
        let events = self.receiver.drain();
        for event in &events {
            self.handle(event, sim);
        }
        events
    }

    /// Reacts to one event.
    pub fn handle(&mut self, event: &SimEvent, sim: &mut SimulationLoop) {
        match event {
            SimEvent::Approach(nearest) => {
                if self.panel == PanelState::Closed && !self.celebrating {
                    self.prompt = Some(nearest.key.clone());
                    sim.set_approach_mode(true);
                }
            }
            SimEvent::Leave(_) => {
                self.prompt = None;
                sim.set_approach_mode(false);
            }
            SimEvent::PanelReady { key } => {
                if self.panel == PanelState::Pending(key.clone()) {
                    debug!(%key, "Panel opened");
                    self.panel = PanelState::Open(key.clone());
                }
            }
            _ => {}
        }
    }

    /// Handles an interact press.
    pub fn interact(&mut self, sim: &mut SimulationLoop) -> InteractResult {
        if !self.started || self.celebrating {
            return InteractResult::Ignored;
        }

        match self.panel {
            PanelState::Open(_) => {
                self.close_panel(sim);
                return InteractResult::PanelClosed;
            }
            PanelState::Pending(_) => return InteractResult::Ignored,
            PanelState::Closed => {}
        }
        if sim.camera().is_cinematic_active() || !sim.proximity().is_in_range() {
            return InteractResult::Ignored;
        }
        let Some(key) = sim.proximity().nearest().map(|n| n.key.clone()) else {
            return InteractResult::Ignored;
        };

        self.quest.record_view(&key);
        sim.halt();

        let sender = self.sender.clone();
        let ready = key.clone();
        if !sim.play_cinematic(move || {
            sender.send(SimEvent::PanelReady { key: ready });
        }) {
            sim.set_frozen(false);
            return InteractResult::Ignored;
        }

        info!(%key, "Visiting point of interest");
        self.prompt = None;
        self.panel = PanelState::Pending(key.clone());
        InteractResult::CinematicStarted(key)
    }

    /// Chooses the point of interest on the open panel.
    ///
    /// The rider stays frozen on the result screen until [`Self::restart`].
    pub fn choose(&mut self, sim: &mut SimulationLoop) -> Option<ChoiceOutcome> {
        let PanelState::Open(key) = &self.panel else {
            return None;
        };
        let ethical = sim.registry().find(key).is_some_and(|poi| poi.ethical);

        let before = self.quest.stage().clone();
        let outcome = self.quest.choose(ethical);
        self.announce_if_changed(&before);

        self.panel = PanelState::Closed;
        self.celebrating = true;
        sim.stop_cinematic();
        sim.set_approach_mode(false);
        Some(outcome)
    }

    /// Closes the open panel to keep riding. Returns `true` if that
    /// advanced the quest.
    pub fn continue_exploring(&mut self, sim: &mut SimulationLoop) -> bool {
        if !matches!(self.panel, PanelState::Open(_)) {
            return false;
        }
        let before = self.quest.stage().clone();
        let advanced = self.quest.continue_exploring();
        self.announce_if_changed(&before);
        self.close_panel(sim);
        advanced
    }

    /// Leaves the result screen: resolves the next stage and respawns.
    ///
    /// Returns `None` before the quest has started.
    pub fn restart(&mut self, sim: &mut SimulationLoop) -> Option<QuestStage> {
        if !self.started {
            return None;
        }
        let before = self.quest.stage().clone();
        let stage = self.quest.restart().clone();
        self.announce_if_changed(&before);

        self.celebrating = false;
        self.prompt = None;
        self.panel = PanelState::Closed;
        sim.stop_cinematic();
        sim.set_approach_mode(false);
        sim.respawn();
        sim.set_frozen(false);
        Some(stage)
    }

    fn close_panel(&mut self, sim: &mut SimulationLoop) {
        self.panel = PanelState::Closed;
        sim.stop_cinematic();
        sim.set_approach_mode(false);
        sim.set_frozen(false);
    }

    fn announce_if_changed(&self, before: &QuestStage) {
        let stage = self.quest.stage();
        if stage != before {
            self.sender.send(SimEvent::QuestAdvanced {
                stage: stage.clone(),
            });
        }
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    /// HUD guidance, `None` before start and after completion.
    #[must_use]
    pub fn quest_hint(&self) -> Option<QuestHint> {
        self.quest.hint()
    }

    /// Marker the HUD should point at from `from`: the quest target, or the
    /// nearest ethical point.
    #[must_use]
    pub fn destination(&self, from: Vec2) -> Option<&PoiMarker> {
        match self.quest.hint()? {
            QuestHint::Target(key) => self.markers.iter().find(|m| m.key == key),
            QuestHint::AnyEthical => self
                .markers
                .iter()
                .filter(|m| m.ethical)
                .min_by(|a, b| {
                    a.position()
                        .distance(from)
                        .total_cmp(&b.position().distance(from))
                }),
        }
    }

    /// Current quest stage.
    #[must_use]
    pub fn stage(&self) -> &QuestStage {
        self.quest.stage()
    }

    /// The quest itself.
    #[must_use]
    pub fn quest(&self) -> &Quest {
        &self.quest
    }

    /// Point whose interact prompt is visible.
    #[must_use]
    pub fn prompt(&self) -> Option<&PoiKey> {
        self.prompt.as_ref()
    }

    /// Panel state.
    #[must_use]
    pub fn panel(&self) -> &PanelState {
        &self.panel
    }

    /// True on the result screen after a choice.
    #[must_use]
    pub fn is_celebrating(&self) -> bool {
        self.celebrating
    }

    /// HUD markers, in registry order.
    #[must_use]
    pub fn poi_markers(&self) -> &[PoiMarker] {
        &self.markers
    }
}
