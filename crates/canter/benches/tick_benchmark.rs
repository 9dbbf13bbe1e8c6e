//! Benchmark for the per-tick simulation path.
//!
//! TARGET: one tick (locomotion + proximity + camera) well under 5µs
//!
//! Run with: cargo bench --package canter --bench tick_benchmark

use canter::procedural::PoiRegistry;
use canter::shared::Vec3;
use canter::{Action, InputState, ProximityConfig, ProximityTracker, SimConfig, SimulationLoop};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

const DT: f32 = 1.0 / 60.0;

fn benchmark_tick(c: &mut Criterion) {
    let mut sim = SimulationLoop::new(&SimConfig::default()).expect("default config builds");
    let events = sim.events();
    let inputs = [
        InputState::new().with(Action::Forward).with(Action::Gallop),
        InputState::new().with(Action::Forward).with(Action::Left),
        InputState::new().with(Action::Forward).with(Action::Right),
    ];

    c.bench_function("sim_tick", |b| {
        let mut i = 0usize;
        b.iter(|| {
            i = i.wrapping_add(1);
            let input = &inputs[(i / 120) % inputs.len()];
            let snap = sim.tick(black_box(DT), input);
            events.drain();
            black_box(snap)
        });
    });

    let mut group = c.benchmark_group("sim_minute");
    group.throughput(Throughput::Elements(3_600));
    group.sample_size(20);
    group.bench_function("3600_ticks", |b| {
        b.iter(|| {
            for t in 0..3_600 {
                let input = &inputs[(t / 120) % inputs.len()];
                black_box(sim.tick(DT, input));
            }
            events.drain();
        });
    });
    group.finish();
}

fn benchmark_proximity(c: &mut Criterion) {
    let registry = SimConfig::default().registry().expect("default registry");
    let mut tracker = ProximityTracker::new(ProximityConfig::default());

    c.bench_function("proximity_update_6_points", |b| {
        let mut x = -200.0f32;
        b.iter(|| {
            x = if x > 200.0 { -200.0 } else { x + 0.5 };
            black_box(tracker.update(black_box(Vec3::new(x, 0.0, x * 0.4)), &registry))
        });
    });

    c.bench_function("proximity_update_empty", |b| {
        let empty = PoiRegistry::default();
        b.iter(|| black_box(tracker.update(black_box(Vec3::ZERO), &empty)));
    });
}

criterion_group!(benches, benchmark_tick, benchmark_proximity);
criterion_main!(benches);
