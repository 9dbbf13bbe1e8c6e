//! # Quest Progression
//!
//! Two-step quest: visit the configured target, then find any ethical
//! point of interest and choose it.
//!
//! ```text
//! NotStarted ──start──> VisitTarget(key) ──continue after viewing key──> FindEthical
//!                                                                            │
//!                                                  choose(ethical) ──────────┘──> Complete
//! ```

use std::fmt;

use canter_procedural::PoiKey;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Which point of interest opens the quest.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestConfig {
    /// Key of the first destination.
    pub target: PoiKey,
}

impl Default for QuestConfig {
    fn default() -> Self {
        Self {
            target: PoiKey::from("showpiece"),
        }
    }
}

/// Where the rider is in the quest.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum QuestStage {
    /// The ride has not begun.
    NotStarted,
    /// Ride to this point of interest and look around.
    VisitTarget(PoiKey),
    /// Choose any ethical point of interest.
    FindEthical,
    /// Done.
    Complete,
}

impl fmt::Display for QuestStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStarted => f.write_str("not started"),
            Self::VisitTarget(key) => write!(f, "visit {key}"),
            Self::FindEthical => f.write_str("find an ethical stable"),
            Self::Complete => f.write_str("complete"),
        }
    }
}

/// What the HUD should point at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QuestHint {
    /// A specific point of interest.
    Target(PoiKey),
    /// Any point flagged ethical.
    AnyEthical,
}

/// Result of choosing a point of interest from its panel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChoiceOutcome {
    /// Ethical choice during the final stage.
    QuestComplete,
    /// Ethical choice, but not what the current stage asks for.
    GoodChoice,
    /// Unethical choice.
    PoorChoice,
}

/// Quest state plus what the rider last looked at.
#[derive(Clone, Debug)]
pub struct Quest {
    target: PoiKey,
    stage: QuestStage,
    last_viewed: Option<PoiKey>,
    /// Stage and ethics of the last choice, consumed by `restart`.
    last_choice: Option<(QuestStage, bool)>,
}

impl Quest {
    /// A quest that has not started.
    #[must_use]
    pub fn new(config: &QuestConfig) -> Self {
        Self {
            target: config.target.clone(),
            stage: QuestStage::NotStarted,
            last_viewed: None,
            last_choice: None,
        }
    }

    /// Current stage.
    #[must_use]
    pub fn stage(&self) -> &QuestStage {
        &self.stage
    }

    /// First destination.
    #[must_use]
    pub fn target(&self) -> &PoiKey {
        &self.target
    }

    /// Point of interest whose panel was opened last.
    #[must_use]
    pub fn last_viewed(&self) -> Option<&PoiKey> {
        self.last_viewed.as_ref()
    }

    /// Begins the first stage.
    pub fn start(&mut self) -> &QuestStage {
        self.enter(QuestStage::VisitTarget(self.target.clone()))
    }

    /// Remembers that the rider opened `key`'s panel.
    pub fn record_view(&mut self, key: &PoiKey) {
        self.last_viewed = Some(key.clone());
    }

    /// HUD guidance for the current stage.
    #[must_use]
    pub fn hint(&self) -> Option<QuestHint> {
        match &self.stage {
            QuestStage::VisitTarget(key) => Some(QuestHint::Target(key.clone())),
            QuestStage::FindEthical => Some(QuestHint::AnyEthical),
            QuestStage::NotStarted | QuestStage::Complete => None,
        }
    }

    /// The rider closed a panel to keep exploring.
    ///
    /// Returns `true` if that advanced the quest.
    pub fn continue_exploring(&mut self) -> bool {
        let viewed_target = self.last_viewed.as_ref() == Some(&self.target);
        if matches!(self.stage, QuestStage::VisitTarget(_)) && viewed_target {
            self.enter(QuestStage::FindEthical);
            true
        } else {
            false
        }
    }

    /// The rider chose the point of interest on the open panel.
    pub fn choose(&mut self, ethical: bool) -> ChoiceOutcome {
        let outcome = if ethical && self.stage == QuestStage::FindEthical {
            self.enter(QuestStage::Complete);
            ChoiceOutcome::QuestComplete
        } else if ethical {
            ChoiceOutcome::GoodChoice
        } else {
            ChoiceOutcome::PoorChoice
        };
        self.last_choice = Some((self.stage.clone(), ethical));
        info!(?outcome, stage = %self.stage, "Choice made");
        outcome
    }

    /// Resolves the stage to resume after the post-choice screen.
    ///
    /// A completed quest starts over; otherwise the rider resumes where the
    /// choice left them.
    pub fn restart(&mut self) -> &QuestStage {
        let next = match self.last_choice.take() {
            Some((QuestStage::VisitTarget(_), _))
                if self.last_viewed.as_ref() == Some(&self.target) =>
            {
                QuestStage::FindEthical
            }
            Some((QuestStage::FindEthical, false)) => QuestStage::FindEthical,
            _ => QuestStage::VisitTarget(self.target.clone()),
        };
        self.enter(next)
    }

    fn enter(&mut self, stage: QuestStage) -> &QuestStage {
        if stage != self.stage {
            info!(from = %self.stage, to = %stage, "Quest advanced");
        }
        self.stage = stage;
        &self.stage
    }
}
