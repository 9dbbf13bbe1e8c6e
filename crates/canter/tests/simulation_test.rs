//! # Simulation Integration Tests
//!
//! Rides through the full loop: terrain, locomotion, proximity, camera,
//! event bus, interaction director and quest.

use std::sync::{Arc, OnceLock};

use canter::procedural::{HeightField, PoiKey, PoiRegistry};
use canter::{
    Action, Autopilot, CameraMode, ChoiceOutcome, InputState, InteractResult,
    InteractionDirector, MovementState, PanelState, QuestStage, RangeState, SimConfig, SimEvent,
    SimulationLoop,
};
use proptest::prelude::*;

const DT: f32 = 1.0 / 60.0;

fn test_config() -> SimConfig {
    let mut config = SimConfig::default();
    config.terrain.segments = 64;
    config
}

/// Terrain is the expensive part; build it once for every test in the file.
fn shared_world() -> &'static (Arc<HeightField>, Arc<PoiRegistry>) {
    static WORLD: OnceLock<(Arc<HeightField>, Arc<PoiRegistry>)> = OnceLock::new();
    WORLD.get_or_init(|| {
        let config = test_config();
        let registry = config.registry().unwrap();
        let field = HeightField::build(config.seed, &config.terrain, &registry).unwrap();
        (Arc::new(field), Arc::new(registry))
    })
}

fn new_sim() -> SimulationLoop {
    let (field, registry) = shared_world();
    SimulationLoop::from_parts(&test_config(), Arc::clone(field), Arc::clone(registry))
}

fn new_ride() -> (SimulationLoop, InteractionDirector) {
    let sim = new_sim();
    let director = InteractionDirector::new(&sim, &test_config().quest);
    (sim, director)
}

/// Autopilots until the rider is in interaction range of `key`.
fn ride_to(
    sim: &mut SimulationLoop,
    director: &mut InteractionDirector,
    key: &str,
    events: &mut Vec<SimEvent>,
) -> bool {
    let autopilot = Autopilot::default();
    let poi = sim.registry().find(&PoiKey::from(key)).unwrap().anchor();
    for _ in 0..60 * 120 {
        events.extend(director.pump(sim));
        let arrived = sim.proximity().is_in_range()
            && sim.proximity().nearest().map(|n| n.key.as_str()) == Some(key);
        if arrived {
            return true;
        }
        let input = autopilot.steer(sim.pose(), poi);
        sim.tick(DT, &input);
    }
    false
}

/// Ticks idle until the open panel shows `key`.
fn wait_for_panel(sim: &mut SimulationLoop, director: &mut InteractionDirector, key: &str) {
    let idle = InputState::new();
    for _ in 0..60 * 5 {
        sim.tick(DT, &idle);
        director.pump(sim);
        if director.panel() == &PanelState::Open(PoiKey::from(key)) {
            return;
        }
    }
    panic!("panel for {key} never opened, state {:?}", director.panel());
}

// =============================================================================
// LOCOMOTION THROUGH THE LOOP
// =============================================================================

#[test]
fn test_trot_converges_and_stops_exactly() {
    let mut sim = new_sim();
    let trot = sim.locomotion().config().trot_speed;

    let forward = InputState::new().with(Action::Forward);
    for _ in 0..600 {
        let snap = sim.tick(DT, &forward);
        assert!(snap.speed <= trot + 1e-4, "overshot trot: {}", snap.speed);
    }
    assert!((sim.pose().speed - trot).abs() < 1e-3);
    assert_eq!(sim.movement_state(), MovementState::Trot);

    let idle = InputState::new();
    let mut stopped_at = None;
    for tick in 0..120 {
        sim.tick(DT, &idle);
        assert!(sim.pose().speed >= 0.0, "reversed at tick {tick}");
        if sim.pose().speed == 0.0 {
            stopped_at = Some(tick);
            break;
        }
    }
    assert!(stopped_at.is_some(), "still creeping: {}", sim.pose().speed);
    assert_eq!(sim.movement_state(), MovementState::Idle);
}

#[test]
fn test_rider_follows_ground() {
    let mut sim = new_sim();
    let input = InputState::new().with(Action::Forward).with(Action::Gallop);
    for _ in 0..60 * 6 {
        sim.tick(DT, &input);
    }
    let pose = sim.pose();
    let ground = sim.terrain().query(pose.position.x, pose.position.z);
    assert!(
        (pose.position.y - ground).abs() < 3.0,
        "rider at {} over ground {ground}",
        pose.position.y
    );
}

#[test]
fn test_same_inputs_same_ride() {
    let mut a = new_sim();
    let mut b = new_sim();
    let script = [
        InputState::new().with(Action::Forward).with(Action::Gallop),
        InputState::new().with(Action::Forward).with(Action::Left),
        InputState::new().with_analog(0.6, 0.0).with(Action::Forward),
        InputState::new().with(Action::Backward),
        InputState::new(),
    ];
    for input in script {
        for _ in 0..90 {
            assert_eq!(a.tick(DT, &input), b.tick(DT, &input));
        }
    }
}

#[test]
fn test_stall_is_clamped() {
    let mut sim = new_sim();
    let input = InputState::new().with(Action::Forward);
    let snap = sim.tick(5.0, &input);
    assert!((snap.dt - 0.05).abs() < f32::EPSILON);
    assert!(snap.position.z.abs() < 1.0, "a stall must not teleport the rider");
    assert_eq!(sim.stats().clamped_frames, 1);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_rider_stays_inside_fence(
        steps in prop::collection::vec((0_u8..64, -1.0_f32..1.0, 0.0_f32..0.2), 1..400)
    ) {
        let mut sim = new_sim();
        let fence = sim.terrain().params().world_size * sim.locomotion().config().fence_ratio;

        for (bits, analog, dt) in steps {
            let mut input = InputState::new();
            for (i, action) in Action::ALL.iter().enumerate() {
                input.set(*action, bits & (1 << i) != 0);
            }
            if bits & 0b10_0000 != 0 {
                input.set_analog(analog, 0.0);
            }
            // Long runs of each step so the rider can actually reach the fence.
            for _ in 0..8 {
                let snap = sim.tick(dt, &input);
                prop_assert!(snap.position.x.abs() <= fence + 1e-3);
                prop_assert!(snap.position.z.abs() <= fence + 1e-3);
                prop_assert!(snap.position.y.is_finite());
            }
        }
    }
}

// =============================================================================
// PROXIMITY AND EVENTS
// =============================================================================

#[test]
fn test_riding_to_point_emits_approach() {
    let (mut sim, mut director) = new_ride();
    let mut events = Vec::new();
    assert!(ride_to(&mut sim, &mut director, "nature", &mut events));

    events.extend(director.pump(&mut sim));
    let approaches: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            SimEvent::Approach(n) => Some(n.key.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(approaches.last(), Some(&"nature"));
    assert_eq!(sim.proximity().state(), RangeState::InRange);
    assert_eq!(director.prompt().map(PoiKey::as_str), Some("nature"));
}

#[test]
fn test_leaving_point_hides_prompt() {
    let (mut sim, mut director) = new_ride();
    let mut events = Vec::new();
    assert!(ride_to(&mut sim, &mut director, "nature", &mut events));
    director.pump(&mut sim);

    // Ride back toward the spawn until the prompt goes away.
    let autopilot = Autopilot::default();
    let mut left = false;
    for _ in 0..60 * 20 {
        let input = autopilot.steer(sim.pose(), canter::shared::Vec2::ZERO);
        sim.tick(DT, &input);
        if director
            .pump(&mut sim)
            .iter()
            .any(|e| matches!(e, SimEvent::Leave(n) if n.key.as_str() == "nature"))
        {
            left = true;
            break;
        }
    }
    assert!(left);
    assert!(director.prompt().is_none());
}

// =============================================================================
// FULL QUEST
// =============================================================================

#[test]
fn test_full_quest_flow() {
    let (mut sim, mut director) = new_ride();
    let mut events = Vec::new();

    assert_eq!(director.interact(&mut sim), InteractResult::Ignored);
    director.start();
    assert_eq!(
        director.stage(),
        &QuestStage::VisitTarget(PoiKey::from("showpiece"))
    );

    // Stage 1: the showpiece arena.
    assert!(ride_to(&mut sim, &mut director, "showpiece", &mut events));
    assert_eq!(
        director.interact(&mut sim),
        InteractResult::CinematicStarted(PoiKey::from("showpiece"))
    );
    assert!(sim.pose().frozen);
    assert_eq!(sim.camera().mode(), CameraMode::Cinematic);
    assert_eq!(director.interact(&mut sim), InteractResult::Ignored);

    wait_for_panel(&mut sim, &mut director, "showpiece");
    assert_eq!(sim.camera().mode(), CameraMode::Follow);

    assert!(director.continue_exploring(&mut sim));
    assert_eq!(director.stage(), &QuestStage::FindEthical);
    assert!(!sim.pose().frozen);

    // Stage 2: nearest ethical stable.
    let from = sim.pose().position.xz();
    let destination = director.destination(from).unwrap().clone();
    assert!(destination.ethical);
    assert!(ride_to(
        &mut sim,
        &mut director,
        destination.key.as_str(),
        &mut events
    ));
    assert!(matches!(
        director.interact(&mut sim),
        InteractResult::CinematicStarted(_)
    ));
    wait_for_panel(&mut sim, &mut director, destination.key.as_str());

    assert_eq!(director.choose(&mut sim), Some(ChoiceOutcome::QuestComplete));
    assert_eq!(director.stage(), &QuestStage::Complete);
    assert!(director.quest_hint().is_none());
    assert_eq!(director.interact(&mut sim), InteractResult::Ignored);

    // Play again.
    assert_eq!(
        director.restart(&mut sim),
        Some(QuestStage::VisitTarget(PoiKey::from("showpiece")))
    );
    assert_eq!(sim.pose().position, canter::shared::Vec3::ZERO);
    assert!(!sim.pose().frozen);

    events.extend(director.pump(&mut sim));
    let stages: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            SimEvent::QuestAdvanced { stage } => Some(stage.clone()),
            _ => None,
        })
        .collect();
    assert!(stages.contains(&QuestStage::FindEthical));
    assert!(stages.contains(&QuestStage::Complete));
}

#[test]
fn test_poor_choice_keeps_quest_going() {
    let (mut sim, mut director) = new_ride();
    let mut events = Vec::new();
    director.start();

    assert!(ride_to(&mut sim, &mut director, "showpiece", &mut events));
    director.interact(&mut sim);
    wait_for_panel(&mut sim, &mut director, "showpiece");

    assert_eq!(director.choose(&mut sim), Some(ChoiceOutcome::PoorChoice));
    assert!(director.is_celebrating());
    assert!(sim.pose().frozen);

    assert_eq!(director.restart(&mut sim), Some(QuestStage::FindEthical));
    assert!(!director.is_celebrating());
}

// =============================================================================
// CONFIG FILES
// =============================================================================

#[test]
fn test_sim_from_config_file() {
    let path = std::env::temp_dir().join(format!("canter_test_{}.toml", std::process::id()));
    std::fs::write(
        &path,
        r#"
        seed = 99

        [quest]
        target = "pond"

        [[points_of_interest]]
        key = "pond"
        name = "Pond"
        x = 30.0
        z = -30.0
        ethical = true
        "#,
    )
    .unwrap();

    let config = SimConfig::load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    let sim = SimulationLoop::new(&config).unwrap();
    assert_eq!(sim.registry().len(), 1);
    let pond = sim.terrain().center_elevation(&PoiKey::from("pond")).unwrap();
    assert!((sim.terrain().query(30.0, -30.0) - pond).abs() < 1e-3);
}
