//! Collision candidate generation
//!
//! Bodies are bucketed into a uniform grid on the x/y plane. Any tile holding
//! two or more bodies becomes a candidate group for the exact overlap test.

use crate::bodies::BodyStore;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Range;

/// Indices of bodies sharing one tile, ascending and unique
pub type CandidateGroup = Vec<usize>;

/// How candidate groups are produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BroadPhase {
    /// Uniform grid with tiles sized from the largest radius
    #[default]
    Grid,
    /// Every live body in one group (quadratic, for small systems and checks)
    AllPairs,
}

/// Produce the candidate groups for the current store state
pub fn candidate_groups(store: &BodyStore, phase: BroadPhase, tile_factor: f32) -> Vec<CandidateGroup> {
    match phase {
        BroadPhase::Grid => {
            let tile_size = store.radius_max() * tile_factor;
            grid_candidates(store.positions(), store.radii(), tile_size)
        }
        BroadPhase::AllPairs => all_pairs_candidates(store.len()),
    }
}

/// Bucket bodies into square tiles of `tile_size` and return every tile with
/// at least two occupants. A body overlapping several tiles is listed in each.
pub fn grid_candidates(positions: &[Vec3], radii: &[f32], tile_size: f32) -> Vec<CandidateGroup> {
    debug_assert_eq!(positions.len(), radii.len());
    if positions.len() < 2 || !(tile_size > 0.0 && tile_size.is_finite()) {
        return Vec::new();
    }

    // Ordered map keeps group order stable between runs
    let mut tiles: BTreeMap<(i32, i32), CandidateGroup> = BTreeMap::new();
    for (i, (p, &r)) in positions.iter().zip(radii).enumerate() {
        let xs = tile_span(p.x, r, tile_size);
        let ys = tile_span(p.y, r, tile_size);
        for x in xs {
            for y in ys.clone() {
                tiles.entry((x, y)).or_default().push(i);
            }
        }
    }

    tiles.into_values().filter(|group| group.len() > 1).collect()
}

/// A single group containing every live body
pub fn all_pairs_candidates(count: usize) -> Vec<CandidateGroup> {
    if count < 2 {
        return Vec::new();
    }
    vec![(0..count).collect()]
}

/// Half-open tile range covered by `[center - radius, center + radius]`
fn tile_span(center: f32, radius: f32, tile_size: f32) -> Range<i32> {
    let begin = ((center - radius) / tile_size).floor() as i32;
    let end = ((center + radius) / tile_size).ceil() as i32;
    // a zero-radius body sitting exactly on a tile edge still needs a tile
    begin..end.max(begin.saturating_add(1))
}
