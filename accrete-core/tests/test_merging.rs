//! Collision chains: conservation laws and removal ordering

use accrete_core::chains::{bodies_collide, detect_collisions, resolve_collisions, CollisionChain};
use accrete_core::tests::test_helpers::{
    approx_eq_f32, random_store, sorted_by_mass, vec_approx_eq,
};
use accrete_core::{candidate_groups, step, BodyStore, BroadPhase, SimConfig, SystemStats};
use glam::Vec3;

fn merge_pass(store: &mut BodyStore, phase: BroadPhase) -> Vec<CollisionChain> {
    let groups = candidate_groups(store, phase, 1.5);
    let chains = detect_collisions(store, &groups);
    resolve_collisions(store, &chains).unwrap();
    chains
}

/// Connected components by brute force over every pair
fn oracle_components(store: &BodyStore) -> Vec<Vec<usize>> {
    let n = store.len();
    let mut parent: Vec<usize> = (0..n).collect();
    fn find(parent: &mut Vec<usize>, i: usize) -> usize {
        let mut root = i;
        while parent[root] != root {
            root = parent[root];
        }
        parent[i] = root;
        root
    }
    let p = store.positions();
    let r = store.radii();
    for a in 0..n {
        for b in a + 1..n {
            if bodies_collide(p[a], r[a], p[b], r[b]) {
                let (ra, rb) = (find(&mut parent, a), find(&mut parent, b));
                parent[ra] = rb;
            }
        }
    }
    let mut components: Vec<Vec<usize>> = vec![Vec::new(); n];
    for i in 0..n {
        let root = find(&mut parent, i);
        components[root].push(i);
    }
    components.retain(|c| !c.is_empty());
    components
}

#[test]
fn test_two_equal_bodies_merge_into_one() {
    let mut store = BodyStore::default();
    store.add(Vec3::ZERO, Vec3::new(1e-3, 0.0, 0.0), 1.0);
    store.add(Vec3::new(0.003, 0.0, 0.0), Vec3::new(0.0, 2e-3, 0.0), 1.0);
    let reach = store.radii()[0] + store.radii()[1];
    assert!(0.003 < reach, "bodies must start overlapping");

    let chains = merge_pass(&mut store, BroadPhase::Grid);

    assert_eq!(chains.len(), 1);
    assert_eq!(store.len(), 1);
    let merged = store.body(0).unwrap();
    assert_eq!(merged.mass, 2.0);
    assert!(vec_approx_eq(merged.velocity * merged.mass, Vec3::new(1e-3, 2e-3, 0.0), 1e-9));
    assert!(vec_approx_eq(merged.position, Vec3::new(0.0015, 0.0, 0.0), 1e-7));
    assert_eq!(merged.radius, store.mapping().radius(2.0));
}

#[test]
fn test_merge_through_full_step() {
    let mut store = BodyStore::default();
    store.add(Vec3::ZERO, Vec3::ZERO, 1.0);
    store.add(Vec3::new(0.003, 0.0, 0.0), Vec3::ZERO, 1.0);
    let config = SimConfig {
        workers: 2,
        ..SimConfig::default()
    };

    let report = step(&mut store, &config).unwrap();

    assert_eq!(report.chains, 1);
    assert_eq!(report.merged_away, 1);
    assert_eq!(report.live, 1);
    assert_eq!(store.masses(), &[2.0]);
}

#[test]
fn test_transitive_chain_collapses_once() {
    // a-b and b-c overlap, a-c do not
    let mut store = BodyStore::default();
    let r = store.mapping().radius(1.0);
    store.add(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), 1.0);
    store.add(Vec3::new(1.5 * r, 0.0, 0.0), Vec3::ZERO, 1.0);
    store.add(Vec3::new(3.0 * r, 0.0, 0.0), Vec3::new(0.0, 3.0, 0.0), 1.0);
    store.add(Vec3::new(5.0, 5.0, 0.0), Vec3::ZERO, 7.0);
    let p = store.positions();
    assert!(!bodies_collide(p[0], r, p[2], r));

    let chains = merge_pass(&mut store, BroadPhase::Grid);

    assert_eq!(chains.len(), 1);
    assert_eq!(chains[0].members(), &[0, 1, 2]);
    assert_eq!(store.len(), 2);
    assert_eq!(store.masses()[0], 3.0);
    assert!(vec_approx_eq(store.velocities()[0] * 3.0, Vec3::new(1.0, 3.0, 0.0), 1e-6));
    // the bystander was swapped down, untouched
    assert_eq!(store.body(1).unwrap().position, Vec3::new(5.0, 5.0, 0.0));
    assert_eq!(store.masses()[1], 7.0);
}

#[test]
fn test_dense_cloud_conserves_mass_and_momentum() {
    let mut store = random_store(600, 0.15, 7);
    let before = SystemStats::measure(&store);

    let chains = merge_pass(&mut store, BroadPhase::Grid);
    let after = SystemStats::measure(&store);

    assert!(!chains.is_empty(), "cloud should produce collisions");
    let removed: usize = chains.iter().map(|c| c.len() - 1).sum();
    assert_eq!(after.count, before.count - removed);
    assert!(approx_eq_f32(after.total_mass, before.total_mass, before.total_mass * 1e-5));
    assert!(vec_approx_eq(after.momentum, before.momentum, 1e-5));
}

#[test]
fn test_each_chain_conserves_momentum() {
    let store = random_store(600, 0.15, 11);
    let groups = candidate_groups(&store, BroadPhase::Grid, 1.5);
    let chains = detect_collisions(&store, &groups);
    assert!(!chains.is_empty());

    for chain in &chains {
        let mut momentum = Vec3::ZERO;
        let mut mass = 0.0;
        for &i in chain.members() {
            let body = store.body(i).unwrap();
            momentum += body.velocity * body.mass;
            mass += body.mass;
        }
        let merged = accrete_core::chains::merge_chain(&store, chain).unwrap();
        assert!(approx_eq_f32(merged.mass, mass, 1e-5));
        assert!(vec_approx_eq(merged.velocity * merged.mass, momentum, 1e-6));
    }
}

#[test]
fn test_removal_order_matches_oracle() {
    for seed in 0..20 {
        let original = random_store(300, 0.12, seed);
        let mut expected: Vec<(f32, Vec3, Vec3)> = oracle_components(&original)
            .iter()
            .map(|component| {
                let mut mass = 0.0;
                let mut pos = Vec3::ZERO;
                let mut mom = Vec3::ZERO;
                for &i in component {
                    let b = original.body(i).unwrap();
                    mass += b.mass;
                    pos += b.position * b.mass;
                    mom += b.velocity * b.mass;
                }
                (mass, pos / mass, mom / mass)
            })
            .collect();
        expected.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut store = original.clone();
        merge_pass(&mut store, BroadPhase::Grid);
        let actual = sorted_by_mass(&store);

        assert_eq!(actual.len(), expected.len(), "seed {}", seed);
        for (body, (mass, pos, vel)) in actual.iter().zip(&expected) {
            assert!(approx_eq_f32(body.mass, *mass, 1e-4), "seed {}", seed);
            assert!(vec_approx_eq(body.position, *pos, 1e-4), "seed {}", seed);
            assert!(vec_approx_eq(body.velocity, *vel, 1e-6), "seed {}", seed);
            assert_eq!(body.radius, store.mapping().radius(body.mass));
        }
    }
}

#[test]
fn test_grid_and_all_pairs_agree() {
    let original = random_store(400, 0.15, 5);
    let mut grid = original.clone();
    let mut brute = original.clone();

    merge_pass(&mut grid, BroadPhase::Grid);
    merge_pass(&mut brute, BroadPhase::AllPairs);

    assert_eq!(grid.positions(), brute.positions());
    assert_eq!(grid.velocities(), brute.velocities());
    assert_eq!(grid.masses(), brute.masses());
}
