//! Collision chains: connected components of overlapping bodies
//!
//! Every candidate group is tested pairwise. Overlapping pairs are unioned
//! into chains, so a body found colliding in two different tiles still ends
//! up in a single chain. Each chain then collapses into one body carrying the
//! chain's total mass and momentum.

use crate::bodies::BodyStore;
use crate::broad_phase::CandidateGroup;
use crate::error::StoreError;
use glam::Vec3;
use std::collections::HashMap;

/// Exact overlap test. Coincident centres never collide.
pub fn bodies_collide(pos_a: Vec3, radius_a: f32, pos_b: Vec3, radius_b: f32) -> bool {
    let dist_sq = pos_a.distance_squared(pos_b);
    if dist_sq == 0.0 {
        return false;
    }
    let reach = radius_a + radius_b;
    reach * reach > dist_sq
}

/// A set of transitively colliding bodies, ascending by index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollisionChain {
    members: Vec<usize>,
}

impl CollisionChain {
    pub fn new(mut members: Vec<usize>) -> Self {
        members.sort_unstable();
        members.dedup();
        Self { members }
    }

    pub fn members(&self) -> &[usize] {
        &self.members
    }

    /// The body that receives the merged state (lowest index)
    pub fn survivor(&self) -> usize {
        self.members[0]
    }

    /// Bodies that disappear into the survivor
    pub fn absorbed(&self) -> &[usize] {
        &self.members[1..]
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Incremental union of colliding pairs into chains
#[derive(Debug, Default)]
pub struct ChainBuilder {
    chains: Vec<Option<Vec<usize>>>,
    owner: HashMap<usize, usize>,
}

impl ChainBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `a` and `b` collide
    pub fn link(&mut self, a: usize, b: usize) {
        match (self.owner.get(&a).copied(), self.owner.get(&b).copied()) {
            (None, None) => {
                let id = self.chains.len();
                self.chains.push(Some(vec![a, b]));
                self.owner.insert(a, id);
                self.owner.insert(b, id);
            }
            (Some(id), None) => self.join(id, b),
            (None, Some(id)) => self.join(id, a),
            (Some(x), Some(y)) if x == y => {}
            (Some(x), Some(y)) => self.union(x, y),
        }
    }

    fn join(&mut self, id: usize, body: usize) {
        if let Some(chain) = self.chains[id].as_mut() {
            chain.push(body);
            self.owner.insert(body, id);
        }
    }

    fn union(&mut self, x: usize, y: usize) {
        let len_of = |id: usize| self.chains[id].as_ref().map_or(0, Vec::len);
        // smaller member list moves into the larger one
        let (keep, absorb) = if len_of(x) >= len_of(y) { (x, y) } else { (y, x) };

        let absorbed = self.chains[absorb].take().unwrap_or_default();
        for &member in &absorbed {
            self.owner.insert(member, keep);
        }
        if let Some(chain) = self.chains[keep].as_mut() {
            chain.extend(absorbed);
        }
    }

    /// Finished chains, ordered by survivor index
    pub fn finish(self) -> Vec<CollisionChain> {
        let mut chains: Vec<CollisionChain> = self
            .chains
            .into_iter()
            .flatten()
            .map(CollisionChain::new)
            .collect();
        chains.sort_unstable_by_key(CollisionChain::survivor);
        chains
    }
}

/// Test every pair inside every candidate group and build the chains
pub fn detect_collisions(store: &BodyStore, groups: &[CandidateGroup]) -> Vec<CollisionChain> {
    let positions = store.positions();
    let radii = store.radii();
    let mut builder = ChainBuilder::new();

    for group in groups {
        for (k, &a) in group.iter().enumerate() {
            for &b in &group[k + 1..] {
                if bodies_collide(positions[a], radii[a], positions[b], radii[b]) {
                    builder.link(a, b);
                }
            }
        }
    }

    builder.finish()
}

/// Outcome of collapsing all chains of one step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub chains: usize,
    pub removed: usize,
}

/// Merged state of a chain: mass-weighted position and momentum-conserving velocity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergedBody {
    pub position: Vec3,
    pub velocity: Vec3,
    pub mass: f32,
}

pub fn merge_chain(store: &BodyStore, chain: &CollisionChain) -> Result<MergedBody, StoreError> {
    let mut weighted_pos = Vec3::ZERO;
    let mut momentum = Vec3::ZERO;
    let mut total_mass = 0.0f32;
    for &i in chain.members() {
        let body = store.body(i)?;
        weighted_pos += body.position * body.mass;
        momentum += body.velocity * body.mass;
        total_mass += body.mass;
    }

    if total_mass == 0.0 {
        // nothing to weigh by: keep the survivor where it is, at rest
        let survivor = store.body(chain.survivor())?;
        return Ok(MergedBody {
            position: survivor.position,
            velocity: Vec3::ZERO,
            mass: 0.0,
        });
    }

    Ok(MergedBody {
        position: weighted_pos / total_mass,
        velocity: momentum / total_mass,
        mass: total_mass,
    })
}

/// Collapse each chain into its survivor and remove the absorbed bodies.
///
/// All merged states are computed against the unmodified store, then written
/// to the survivors, then the absorbed bodies are removed in descending index
/// order. Descending order means the body swapped into a vacated slot always
/// comes from above every index still waiting for removal, so no pending index
/// is ever invalidated. Survivors may be relocated, already carrying their
/// merged state.
pub fn resolve_collisions(
    store: &mut BodyStore,
    chains: &[CollisionChain],
) -> Result<MergeReport, StoreError> {
    let merged = chains
        .iter()
        .map(|chain| merge_chain(store, chain))
        .collect::<Result<Vec<_>, _>>()?;

    for (chain, state) in chains.iter().zip(&merged) {
        let survivor = chain.survivor();
        let body = store.get(survivor)?;
        *body.position = state.position;
        *body.velocity = state.velocity;
        *body.mass = state.mass;
        store.update(survivor)?;
    }

    let mut removals: Vec<usize> = chains
        .iter()
        .flat_map(|chain| chain.absorbed().iter().copied())
        .collect();
    removals.sort_unstable_by(|a, b| b.cmp(a));
    removals.dedup();

    for &index in &removals {
        store.remove(index)?;
    }

    Ok(MergeReport {
        chains: chains.len(),
        removed: removals.len(),
    })
}
