//! Initial body distributions

use crate::bodies::BodyStore;
use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// One explicitly placed body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodySpec {
    pub position: Vec3,
    #[serde(default)]
    pub velocity: Vec3,
    pub mass: f32,
}

/// How the store is populated before the first step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Scenario {
    /// Rotating unit disk, denser and heavier towards the centre
    Disk { count: usize, seed: u64 },
    /// Two bodies at rest on the x axis, `separation` apart
    TwoBody { separation: f32, masses: [f32; 2] },
    /// Explicit list
    Bodies { bodies: Vec<BodySpec> },
}

impl Default for Scenario {
    fn default() -> Self {
        Scenario::Disk {
            count: 4096,
            seed: 42,
        }
    }
}

impl Scenario {
    /// Append this scenario's bodies to the store
    pub fn populate(&self, store: &mut BodyStore) {
        match self {
            Scenario::Disk { count, seed } => {
                let mut rng = ChaCha8Rng::seed_from_u64(*seed);
                for _ in 0..*count {
                    let spec = sample_disk_body(&mut rng);
                    store.add(spec.position, spec.velocity, spec.mass);
                }
            }
            Scenario::TwoBody { separation, masses } => {
                let half = separation / 2.0;
                store.add(Vec3::new(half, 0.0, 0.0), Vec3::ZERO, masses[0]);
                store.add(Vec3::new(-half, 0.0, 0.0), Vec3::ZERO, masses[1]);
            }
            Scenario::Bodies { bodies } => {
                for spec in bodies {
                    store.add(spec.position, spec.velocity, spec.mass);
                }
            }
        }
    }

    /// Seed of a disk scenario
    pub fn seed(&self) -> Option<u64> {
        match self {
            Scenario::Disk { seed, .. } => Some(*seed),
            _ => None,
        }
    }

    /// Replace the seed of a disk scenario. Returns false for scenarios that
    /// are not sampled.
    pub fn reseed(&mut self, new_seed: u64) -> bool {
        match self {
            Scenario::Disk { seed, .. } => {
                *seed = new_seed;
                true
            }
            _ => false,
        }
    }

    /// Number of bodies `populate` will add
    pub fn body_count(&self) -> usize {
        match self {
            Scenario::Disk { count, .. } => *count,
            Scenario::TwoBody { .. } => 2,
            Scenario::Bodies { bodies } => bodies.len(),
        }
    }
}

/// Sample one body of the rotating disk.
///
/// Radial distance is `sqrt(u)` so bodies cover the disk uniformly by area.
/// Orbital velocity is perpendicular to the radius and grows with distance,
/// with a small random z component. Mass falls off as `1/sqrt(distance)`.
pub fn sample_disk_body<R: Rng>(rng: &mut R) -> BodySpec {
    let dist = rng.gen::<f32>().sqrt().max(1e-6);
    let angle = rng.gen_range(-1.0f32..1.0) * PI;
    let position = Vec3::new(dist * angle.cos(), dist * angle.sin(), 0.0);

    let velocity = Vec3::new(position.y, -position.x, rng.gen_range(-1.0f32..1.0) / 5.0)
        * (dist / 10_000.0);
    let mass = rng.gen_range(f32::EPSILON..1.0) / dist.sqrt() / 10.1;

    BodySpec {
        position,
        velocity,
        mass,
    }
}
