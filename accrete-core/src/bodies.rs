use crate::error::{ConfigError, StoreError};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Mass to collision radius mapping: `radius = (mass / scale_mass)^exponent / divisor`
///
/// The exponent must stay in `(0, 1)` so radius grows monotonically but slower
/// than mass. The broad phase sizes its tiles from the largest radius, which is
/// only sound while the mapping is monotonic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadiusMapping {
    pub scale_mass: f32,
    pub exponent: f32,
    pub divisor: f32,
}

impl Default for RadiusMapping {
    fn default() -> Self {
        Self {
            scale_mass: 50.0,
            exponent: 0.4,
            divisor: 100.0,
        }
    }
}

impl RadiusMapping {
    pub fn new(scale_mass: f32, exponent: f32, divisor: f32) -> Result<Self, ConfigError> {
        let mapping = Self {
            scale_mass,
            exponent,
            divisor,
        };
        mapping.validate()?;
        Ok(mapping)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.scale_mass > 0.0 && self.scale_mass.is_finite()) {
            return Err(ConfigError::invalid(
                "radius.scale_mass",
                format!("must be positive, got {}", self.scale_mass),
            ));
        }
        if !(self.exponent > 0.0 && self.exponent < 1.0) {
            return Err(ConfigError::invalid(
                "radius.exponent",
                format!("must lie in (0, 1), got {}", self.exponent),
            ));
        }
        if !(self.divisor > 0.0 && self.divisor.is_finite()) {
            return Err(ConfigError::invalid(
                "radius.divisor",
                format!("must be positive, got {}", self.divisor),
            ));
        }
        Ok(())
    }

    /// Radius for a mass. Non-positive and non-finite masses get radius 0.
    pub fn radius(&self, mass: f32) -> f32 {
        if !(mass > 0.0 && mass.is_finite()) {
            return 0.0;
        }
        (mass / self.scale_mass).powf(self.exponent) / self.divisor
    }
}

/// Copied snapshot of one body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub position: Vec3,
    pub velocity: Vec3,
    pub mass: f32,
    pub radius: f32,
}

/// Mutable view of one body inside the store.
///
/// Valid only until the next mutating call on the store: it borrows the store,
/// and the index it was created from may name a different body after a
/// `remove`. After changing `mass`, call [`BodyStore::update`] with the same
/// index so the cached radius follows.
#[derive(Debug)]
pub struct BodyMut<'a> {
    pub index: usize,
    pub position: &'a mut Vec3,
    pub velocity: &'a mut Vec3,
    pub mass: &'a mut f32,
    pub radius: f32,
}

/// Structure-of-arrays store owning every live body
#[derive(Debug, Clone, Default)]
pub struct BodyStore {
    positions: Vec<Vec3>,
    velocities: Vec<Vec3>,
    masses: Vec<f32>,
    radii: Vec<f32>,
    // Never lowered on removal: the broad phase tolerates an oversized tile.
    radius_max: f32,
    mapping: RadiusMapping,
}

impl BodyStore {
    pub fn new(mapping: RadiusMapping) -> Self {
        Self {
            mapping,
            ..Self::default()
        }
    }

    pub fn with_capacity(mapping: RadiusMapping, capacity: usize) -> Self {
        Self {
            positions: Vec::with_capacity(capacity),
            velocities: Vec::with_capacity(capacity),
            masses: Vec::with_capacity(capacity),
            radii: Vec::with_capacity(capacity),
            radius_max: 0.0,
            mapping,
        }
    }

    /// Append a body and return its index
    pub fn add(&mut self, position: Vec3, velocity: Vec3, mass: f32) -> usize {
        let radius = self.mapping.radius(mass);
        self.positions.push(position);
        self.velocities.push(velocity);
        self.masses.push(mass);
        self.radii.push(radius);
        self.radius_max = self.radius_max.max(radius);
        self.positions.len() - 1
    }

    fn check(&self, index: usize) -> Result<(), StoreError> {
        if index >= self.len() {
            return Err(StoreError::IndexOutOfBounds {
                index,
                len: self.len(),
            });
        }
        Ok(())
    }

    pub fn get(&mut self, index: usize) -> Result<BodyMut<'_>, StoreError> {
        self.check(index)?;
        Ok(BodyMut {
            index,
            position: &mut self.positions[index],
            velocity: &mut self.velocities[index],
            mass: &mut self.masses[index],
            radius: self.radii[index],
        })
    }

    pub fn body(&self, index: usize) -> Result<Body, StoreError> {
        self.check(index)?;
        Ok(Body {
            position: self.positions[index],
            velocity: self.velocities[index],
            mass: self.masses[index],
            radius: self.radii[index],
        })
    }

    /// Re-derive the radius of `index` from its current mass
    pub fn update(&mut self, index: usize) -> Result<(), StoreError> {
        self.check(index)?;
        let radius = self.mapping.radius(self.masses[index]);
        self.radii[index] = radius;
        self.radius_max = self.radius_max.max(radius);
        Ok(())
    }

    /// Swap-with-last removal. The body that was last now lives at `index`.
    pub fn remove(&mut self, index: usize) -> Result<Body, StoreError> {
        self.check(index)?;
        Ok(Body {
            position: self.positions.swap_remove(index),
            velocity: self.velocities.swap_remove(index),
            mass: self.masses.swap_remove(index),
            radius: self.radii.swap_remove(index),
        })
    }

    pub fn clear(&mut self) {
        self.positions.clear();
        self.velocities.clear();
        self.masses.clear();
        self.radii.clear();
        self.radius_max = 0.0;
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn radius_max(&self) -> f32 {
        self.radius_max
    }

    pub fn mapping(&self) -> &RadiusMapping {
        &self.mapping
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn velocities(&self) -> &[Vec3] {
        &self.velocities
    }

    pub fn masses(&self) -> &[f32] {
        &self.masses
    }

    pub fn radii(&self) -> &[f32] {
        &self.radii
    }

    pub fn iter(&self) -> impl Iterator<Item = Body> + '_ {
        (0..self.len()).map(move |i| Body {
            position: self.positions[i],
            velocity: self.velocities[i],
            mass: self.masses[i],
            radius: self.radii[i],
        })
    }

    /// Positions and velocities for writing, masses for reading
    pub(crate) fn kinematics_mut(&mut self) -> (&mut [Vec3], &mut [Vec3], &[f32]) {
        (&mut self.positions, &mut self.velocities, &self.masses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radius_is_monotonic() {
        let mapping = RadiusMapping::default();
        let mut last = 0.0;
        for m in [0.001, 0.1, 1.0, 10.0, 1000.0] {
            let r = mapping.radius(m);
            assert!(r > last, "radius({}) = {} should exceed {}", m, r, last);
            last = r;
        }
    }

    #[test]
    fn test_radius_of_degenerate_mass() {
        let mapping = RadiusMapping::default();
        assert_eq!(mapping.radius(0.0), 0.0);
        assert_eq!(mapping.radius(-1.0), 0.0);
        assert_eq!(mapping.radius(f32::NAN), 0.0);
    }

    #[test]
    fn test_mapping_rejects_superlinear_exponent() {
        assert!(RadiusMapping::new(50.0, 1.5, 100.0).is_err());
        assert!(RadiusMapping::new(0.0, 0.4, 100.0).is_err());
        assert!(RadiusMapping::new(50.0, 0.4, 100.0).is_ok());
    }

    #[test]
    fn test_add_tracks_radius_max() {
        let mut store = BodyStore::default();
        store.add(Vec3::ZERO, Vec3::ZERO, 10.0);
        let big = store.add(Vec3::X, Vec3::ZERO, 1000.0);
        store.add(Vec3::Y, Vec3::ZERO, 1.0);

        assert_eq!(store.len(), 3);
        assert_eq!(store.radius_max(), store.radii()[big]);
    }

    #[test]
    fn test_radius_max_survives_removal() {
        let mut store = BodyStore::default();
        store.add(Vec3::ZERO, Vec3::ZERO, 1.0);
        let big = store.add(Vec3::X, Vec3::ZERO, 1000.0);
        let before = store.radius_max();

        store.remove(big).unwrap();
        assert_eq!(store.radius_max(), before);
    }

    #[test]
    fn test_update_rederives_radius() {
        let mut store = BodyStore::default();
        let i = store.add(Vec3::ZERO, Vec3::ZERO, 1.0);
        let old_radius = store.radii()[i];

        *store.get(i).unwrap().mass = 64.0;
        store.update(i).unwrap();

        assert!(store.radii()[i] > old_radius);
        assert_eq!(store.radii()[i], store.mapping().radius(64.0));
        assert_eq!(store.radius_max(), store.radii()[i]);
    }

    #[test]
    fn test_out_of_bounds_access() {
        let mut store = BodyStore::default();
        store.add(Vec3::ZERO, Vec3::ZERO, 1.0);

        assert_eq!(
            store.get(1).unwrap_err(),
            StoreError::IndexOutOfBounds { index: 1, len: 1 }
        );
        assert!(store.update(3).is_err());
        assert!(store.remove(1).is_err());
        assert!(store.body(7).is_err());
    }

    #[test]
    fn test_remove_last_just_shrinks() {
        let mut store = BodyStore::default();
        store.add(Vec3::ZERO, Vec3::ZERO, 1.0);
        store.add(Vec3::X, Vec3::ZERO, 2.0);

        let removed = store.remove(1).unwrap();
        assert_eq!(removed.mass, 2.0);
        assert_eq!(store.len(), 1);
        assert_eq!(store.masses(), &[1.0]);
    }
}
