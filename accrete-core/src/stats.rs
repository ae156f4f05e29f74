use crate::bodies::BodyStore;
use glam::Vec3;

/// Conserved quantities and summary figures of the whole system
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SystemStats {
    pub count: usize,
    pub total_mass: f32,
    pub momentum: Vec3,
    pub center_of_mass: Vec3,
    pub kinetic_energy: f32,
    pub radius_max: f32,
    /// Farthest body surface from the centre of mass
    pub extent: f32,
}

impl SystemStats {
    pub fn measure(store: &BodyStore) -> Self {
        let mut stats = SystemStats {
            count: store.len(),
            radius_max: store.radius_max(),
            ..Self::default()
        };

        let mut weighted_pos = Vec3::ZERO;
        for body in store.iter() {
            stats.total_mass += body.mass;
            stats.momentum += body.velocity * body.mass;
            stats.kinetic_energy += 0.5 * body.mass * body.velocity.length_squared();
            weighted_pos += body.position * body.mass;
        }
        if stats.total_mass > 0.0 {
            stats.center_of_mass = weighted_pos / stats.total_mass;
        }
        stats.extent = store
            .iter()
            .map(|body| body.position.distance(stats.center_of_mass) + body.radius)
            .fold(0.0, f32::max);

        stats
    }
}
