//! # Canter Ride Harness
//!
//! Headless ride through the whole quest: autopilots to the quest target,
//! opens its panel, moves on, finds an ethical stable and chooses it.
//!
//! ## CRITICAL REQUIREMENTS
//! - NO WINDOW
//! - NO GRAPHICS
//! - FIXED TIMESTEP (same config, same ride)
//!
//! ```bash
//! # Default world
//! ./ride_harness
//!
//! # Custom world, verbose
//! LOG_LEVEL=debug ./ride_harness world.toml
//! ```

use std::collections::BTreeSet;
use std::env;

use canter::procedural::PoiKey;
use canter::shared::constants::TICK_RATE;
use canter::{
    Autopilot, ChoiceOutcome, InputState, InteractResult, InteractionDirector, PanelState,
    QuestStage, SimConfig, SimEvent, SimResult, SimulationLoop,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Give up after ten simulated minutes.
const MAX_TICKS: u64 = (TICK_RATE as u64) * 600;

fn main() -> SimResult<()> {
    let filter = EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    println!("═══════════════════════════════════════════════════════════════════");
    println!("                    CANTER RIDE HARNESS v{}", env!("CARGO_PKG_VERSION"));
    println!("                         HEADLESS MODE");
    println!("═══════════════════════════════════════════════════════════════════");
    println!();

    let config = match env::args().nth(1) {
        Some(path) => {
            println!("  Config:   {path}");
            SimConfig::load(&path)?
        }
        None => {
            println!("  Config:   built-in defaults");
            SimConfig::default()
        }
    };
    println!("  Seed:     {}", config.seed.value());
    println!("  Points:   {}", config.points_of_interest.len());
    println!();

    let mut sim = SimulationLoop::new(&config)?;
    let mut director = InteractionDirector::new(&sim, &config.quest);
    let autopilot = Autopilot::default();
    let dt = 1.0 / TICK_RATE as f32;

    director.start();

    let mut visited: BTreeSet<PoiKey> = BTreeSet::new();
    let mut event_count = 0_usize;
    let mut outcome = None;

    while sim.frame() < MAX_TICKS {
        for event in director.pump(&mut sim) {
            event_count += 1;
            log_event(&event);
        }

        let input = match director.panel().clone() {
            PanelState::Open(key) => {
                visited.insert(key.clone());
                let ethical = sim.registry().find(&key).is_some_and(|poi| poi.ethical);
                if *director.stage() == QuestStage::FindEthical && ethical {
                    outcome = director.choose(&mut sim);
                    break;
                }
                director.continue_exploring(&mut sim);
                InputState::new()
            }
            PanelState::Pending(_) => InputState::new(),
            PanelState::Closed => {
                let position = sim.pose().position.xz();
                let Some(destination) = director.destination(position).cloned() else {
                    break;
                };
                let at_destination = sim.proximity().is_in_range()
                    && sim.proximity().nearest().map(|n| &n.key) == Some(&destination.key);
                if at_destination {
                    if let InteractResult::CinematicStarted(key) = director.interact(&mut sim) {
                        info!(%key, "Arrived");
                    }
                    InputState::new()
                } else {
                    autopilot.steer(sim.pose(), destination.position())
                }
            }
        };

        sim.tick(dt, &input);
    }

    for event in director.pump(&mut sim) {
        event_count += 1;
        log_event(&event);
    }

    if outcome == Some(ChoiceOutcome::QuestComplete) {
        if let Some(stage) = director.restart(&mut sim) {
            info!(%stage, "Ready to ride again");
        }
    } else {
        warn!(frames = sim.frame(), "Quest not completed");
    }

    let stats = sim.stats();
    println!();
    println!("═══════════════════════════════════════════════════════════════════");
    println!("  Frames:          {}", stats.frames);
    println!("  Simulated time:  {:.1}s", stats.simulated_time);
    println!("  Events:          {event_count}");
    println!(
        "  Visited:         {}",
        visited.iter().map(PoiKey::as_str).collect::<Vec<_>>().join(", ")
    );
    println!("  Outcome:         {outcome:?}");
    println!("═══════════════════════════════════════════════════════════════════");

    Ok(())
}

fn log_event(event: &SimEvent) {
    match event {
        SimEvent::Approach(nearest) => {
            info!(key = %nearest.key, distance = nearest.distance, "Approach");
        }
        SimEvent::Leave(nearest) => info!(key = %nearest.key, "Leave"),
        SimEvent::QuestAdvanced { stage } => info!(%stage, "Quest stage"),
        SimEvent::PanelReady { key } => info!(%key, "Panel ready"),
        other => info!(event = ?other, "Event"),
    }
}
