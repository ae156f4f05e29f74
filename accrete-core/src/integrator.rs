use crate::bodies::BodyStore;
use glam::Vec3;

/// Step every body forward by `dt` using semi-implicit Euler integration.
///
/// Velocity is updated from the accumulated force first (v += F/m * dt) and
/// the new velocity then moves the body (x += v * dt). Massless bodies are
/// not accelerated; they keep drifting with their current velocity.
pub fn integrate(store: &mut BodyStore, forces: &[Vec3], dt: f32) {
    let (positions, velocities, masses) = store.kinematics_mut();
    debug_assert_eq!(forces.len(), masses.len());

    for (((pos, vel), &mass), &force) in positions
        .iter_mut()
        .zip(velocities.iter_mut())
        .zip(masses)
        .zip(forces)
    {
        if mass > 0.0 {
            *vel += force / mass * dt;
        }
        *pos += *vel * dt;
    }
}
