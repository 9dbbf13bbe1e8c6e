//! # HeightField Integration Tests
//!
//! Properties the simulation relies on: the ground is continuous, every
//! point of interest sits on a flat pad, and builds are reproducible.

use canter_procedural::{HeightField, PoiRegistry, PointOfInterest, TerrainParams, WorldSeed};
use proptest::prelude::*;
use std::sync::OnceLock;

fn shipped_points() -> Vec<PointOfInterest> {
    vec![
        PointOfInterest::new("nature", "Nature Stables", 80.0, -80.0, true),
        PointOfInterest::new("ethical_sport", "Ethical Sport Center", -90.0, -60.0, true),
        PointOfInterest::new("wellness", "Wellness Ranch", 85.0, 70.0, true),
        PointOfInterest::new("intensive", "Intensive Breeding Farm", 0.0, 100.0, false),
        PointOfInterest::new("neglect", "Neglected Paddock", -95.0, 40.0, false),
        PointOfInterest::new("showpiece", "Showpiece Arena", -60.0, -90.0, false),
    ]
}

fn build(seed: u64) -> HeightField {
    let registry = PoiRegistry::new(shipped_points()).unwrap();
    HeightField::build(WorldSeed::new(seed), &TerrainParams::default(), &registry).unwrap()
}

fn shared() -> &'static (HeightField, f32) {
    static FIELD: OnceLock<(HeightField, f32)> = OnceLock::new();
    FIELD.get_or_init(|| {
        let field = build(42);
        let slope = max_slope(&field);
        (field, slope)
    })
}

/// Largest elevation change between neighbouring vertices, per unit distance.
fn max_slope(field: &HeightField) -> f32 {
    let grid = field.grid();
    let n = grid.vertices_per_side();
    let mut steepest = 0.0f32;
    for iz in 0..n {
        for ix in 0..n {
            let h = grid.get(ix, iz).unwrap();
            if let Some(right) = grid.get(ix + 1, iz) {
                steepest = steepest.max((right - h).abs());
            }
            if let Some(down) = grid.get(ix, iz + 1) {
                steepest = steepest.max((down - h).abs());
            }
        }
    }
    steepest / grid.spacing()
}

#[test]
fn test_flattening_invariant_at_every_anchor() {
    for seed in [1, 42, 9001] {
        let field = build(seed);
        for poi in shipped_points() {
            let center = field.center_elevation(&poi.key).unwrap();
            let ground = field.query(poi.x, poi.z);
            assert!(
                (ground - center).abs() < 1e-3,
                "seed {seed}: '{}' ground {ground} vs center {center}",
                poi.key
            );
        }
    }
}

#[test]
fn test_same_seed_same_grid() {
    let a = build(777);
    let b = build(777);
    assert_eq!(a.grid(), b.grid());
    assert_eq!(a.pads(), b.pads());
}

#[test]
fn test_different_seed_different_grid() {
    assert_ne!(build(1).grid(), build(2).grid());
}

#[test]
fn test_terrain_has_relief() {
    let field = build(42);
    let (min, max) = field.grid().min_max();
    assert!(max - min > 2.0, "terrain is suspiciously flat: {min}..{max}");
    assert!(min > -20.0 && max < 20.0, "terrain exceeds layer amplitudes: {min}..{max}");
}

#[test]
fn test_border_is_clamped() {
    let field = build(42);
    for t in [-300.0, -250.0, 0.0, 180.0, 250.0, 400.0] {
        assert_eq!(field.query(1_000.0, t), field.query(250.0, t));
        assert_eq!(field.query(t, -1_000.0), field.query(t, -250.0));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_query_is_continuous(
        x in -260.0f32..260.0,
        z in -260.0f32..260.0,
        dx in -0.05f32..0.05,
        dz in -0.05f32..0.05,
    ) {
        let (field, slope) = shared();
        let a = field.query(x, z);
        let b = field.query(x + dx, z + dz);
        let bound = *slope * (dx.abs() + dz.abs()) + 1e-4;
        prop_assert!(a.is_finite() && b.is_finite());
        prop_assert!((a - b).abs() <= bound, "jump {} exceeds {}", (a - b).abs(), bound);
    }

    #[test]
    fn prop_query_within_grid_range(x in -1_000.0f32..1_000.0, z in -1_000.0f32..1_000.0) {
        let (field, _) = shared();
        let (min, max) = field.grid().min_max();
        let h = field.query(x, z);
        prop_assert!(h >= min - 1e-4 && h <= max + 1e-4);
    }
}
