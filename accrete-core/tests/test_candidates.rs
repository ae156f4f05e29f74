//! Broad phase must never miss an overlapping pair

use accrete_core::broad_phase::{all_pairs_candidates, candidate_groups, grid_candidates};
use accrete_core::chains::bodies_collide;
use accrete_core::tests::test_helpers::random_store;
use accrete_core::{BodyStore, BroadPhase};
use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn grouped_together(groups: &[Vec<usize>], a: usize, b: usize) -> bool {
    groups.iter().any(|g| g.contains(&a) && g.contains(&b))
}

#[test]
fn test_overlapping_pairs_always_share_a_group() {
    let mut rng = ChaCha8Rng::seed_from_u64(2024);

    for round in 0..500 {
        let mut store = BodyStore::default();
        // background bodies so the grid is not trivially small
        for _ in 0..20 {
            let p = Vec3::new(rng.gen_range(-2.0..2.0), rng.gen_range(-2.0..2.0), 0.0);
            store.add(p, Vec3::ZERO, rng.gen_range(0.01..100.0));
        }

        let mass_a = rng.gen_range(0.01..100.0);
        let mass_b = rng.gen_range(0.01..100.0);
        let ra = store.mapping().radius(mass_a);
        let rb = store.mapping().radius(mass_b);
        let center = Vec3::new(rng.gen_range(-2.0..2.0), rng.gen_range(-2.0..2.0), 0.0);
        let angle: f32 = rng.gen_range(0.0..std::f32::consts::TAU);
        let dist = (ra + rb) * rng.gen_range(0.05..0.99);
        let offset = Vec3::new(angle.cos(), angle.sin(), 0.0) * dist;

        let a = store.add(center, Vec3::ZERO, mass_a);
        let b = store.add(center + offset, Vec3::ZERO, mass_b);
        let p = store.positions();
        assert!(bodies_collide(p[a], ra, p[b], rb), "round {} setup", round);

        let groups = candidate_groups(&store, BroadPhase::Grid, 1.5);
        assert!(
            grouped_together(&groups, a, b),
            "round {}: bodies {} and {} overlap but share no tile",
            round,
            a,
            b
        );
    }
}

#[test]
fn test_grid_finds_every_colliding_pair_of_dense_cloud() {
    let store = random_store(400, 0.2, 99);
    let groups = candidate_groups(&store, BroadPhase::Grid, 1.5);
    let p = store.positions();
    let r = store.radii();

    let mut colliding = 0;
    for a in 0..store.len() {
        for b in a + 1..store.len() {
            if bodies_collide(p[a], r[a], p[b], r[b]) {
                colliding += 1;
                assert!(grouped_together(&groups, a, b), "missed pair ({}, {})", a, b);
            }
        }
    }
    assert!(colliding > 0, "cloud should contain collisions");
}

#[test]
fn test_grid_prunes_sparse_systems() {
    // bodies on a lattice far wider than any radius
    let positions: Vec<Vec3> = (0..100)
        .map(|i| Vec3::new((i % 10) as f32, (i / 10) as f32, 0.0))
        .collect();
    let radii = vec![0.01; 100];
    assert!(grid_candidates(&positions, &radii, 0.015).is_empty());
}

#[test]
fn test_all_pairs_lists_everyone() {
    let store = random_store(5, 1.0, 1);
    let groups = candidate_groups(&store, BroadPhase::AllPairs, 1.5);
    assert_eq!(groups, all_pairs_candidates(5));
}
