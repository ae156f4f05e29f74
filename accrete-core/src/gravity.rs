//! Exact pairwise Newtonian gravity
//!
//! Unordered pairs are enumerated row by row: `(0,1), (0,2), (1,2), (0,3), ...`
//! so pair id `k` maps to a fixed `(col, row)` with `col < row`. The parallel
//! path cuts that enumeration into contiguous chunks, one per worker, and each
//! worker sums into its own accumulator. Accumulators are added together only
//! after every worker has returned.

use glam::Vec3;
use rayon::prelude::*;
use std::ops::Range;

/// Number of unordered pairs among `n` bodies
pub fn pair_count(n: usize) -> usize {
    n * n.saturating_sub(1) / 2
}

/// First pair id of a row (pairs `(0..row, row)`)
fn row_start(row: usize) -> usize {
    row * row.saturating_sub(1) / 2
}

/// Decode pair id `k` into `(col, row)` with `col < row`
pub fn pair_at(k: usize) -> (usize, usize) {
    let mut row = (((8.0 * k as f64 + 1.0).sqrt() + 1.0) / 2.0) as usize;
    // the float estimate can be off by one for large ids
    while row > 1 && row_start(row) > k {
        row -= 1;
    }
    while row_start(row + 1) <= k {
        row += 1;
    }
    (k - row_start(row), row)
}

/// Iterator over the pairs with ids in a range
#[derive(Debug, Clone)]
pub struct PairIter {
    col: usize,
    row: usize,
    remaining: usize,
}

impl PairIter {
    pub fn new(ids: Range<usize>) -> Self {
        let (col, row) = pair_at(ids.start);
        Self {
            col,
            row,
            remaining: ids.end.saturating_sub(ids.start),
        }
    }
}

impl Iterator for PairIter {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let pair = (self.col, self.row);
        self.remaining -= 1;
        self.col += 1;
        if self.col == self.row {
            self.row += 1;
            self.col = 0;
        }
        Some(pair)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for PairIter {}

/// Force exerted on `a` by `b`. Zero when the two centres coincide.
pub fn pair_force(pos_a: Vec3, mass_a: f32, pos_b: Vec3, mass_b: f32, g: f32) -> Vec3 {
    let dist_sq = pos_a.distance_squared(pos_b);
    if dist_sq == 0.0 {
        return Vec3::ZERO;
    }
    let magnitude = g * mass_a * mass_b / dist_sq;
    (pos_b - pos_a).normalize() * magnitude
}

/// Sum the forces of the pairs in `ids` into a fresh full-length accumulator
pub fn accumulate_forces(positions: &[Vec3], masses: &[f32], ids: Range<usize>, g: f32) -> Vec<Vec3> {
    debug_assert_eq!(positions.len(), masses.len());
    let mut forces = vec![Vec3::ZERO; positions.len()];
    for (a, b) in PairIter::new(ids) {
        let f = pair_force(positions[a], masses[a], positions[b], masses[b], g);
        forces[a] += f;
        forces[b] -= f;
    }
    forces
}

/// Single accumulator over the whole enumeration
pub fn compute_forces_sequential(positions: &[Vec3], masses: &[f32], g: f32) -> Vec<Vec3> {
    accumulate_forces(positions, masses, 0..pair_count(positions.len()), g)
}

/// Split the enumeration into `workers` chunks, compute them on the current
/// rayon pool, and add the accumulators together in chunk order
pub fn compute_forces_chunked(positions: &[Vec3], masses: &[f32], g: f32, workers: usize) -> Vec<Vec3> {
    let n = positions.len();
    let total = pair_count(n);
    let workers = workers.max(1);
    let chunk = total.div_ceil(workers).max(1);

    let partials: Vec<Vec<Vec3>> = (0..workers)
        .into_par_iter()
        .map(|c| {
            let start = (c * chunk).min(total);
            let end = (start + chunk).min(total);
            accumulate_forces(positions, masses, start..end, g)
        })
        .collect();

    let mut forces = vec![Vec3::ZERO; n];
    for partial in partials {
        for (f, p) in forces.iter_mut().zip(partial) {
            *f += p;
        }
    }
    forces
}

/// Owns the worker pool used for the pairwise sum
#[derive(Debug)]
pub struct ForceEngine {
    workers: usize,
    pool: Option<rayon::ThreadPool>,
}

impl ForceEngine {
    /// One worker computes inline on the calling thread; more than one gets a
    /// dedicated pool of that size.
    pub fn new(workers: usize) -> Result<Self, rayon::ThreadPoolBuildError> {
        let workers = workers.max(1);
        let pool = if workers > 1 {
            Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(workers)
                    .thread_name(|i| format!("accrete-force-{}", i))
                    .build()?,
            )
        } else {
            None
        };
        Ok(Self { workers, pool })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Net gravitational force on every body
    pub fn compute(&self, positions: &[Vec3], masses: &[f32], g: f32) -> Vec<Vec3> {
        match &self.pool {
            Some(pool) if positions.len() > 1 => {
                pool.install(|| compute_forces_chunked(positions, masses, g, self.workers))
            }
            _ => compute_forces_sequential(positions, masses, g),
        }
    }
}
