use crate::bodies::BodyStore;
use glam::Vec3;

/// Keep bodies inside `[-edge, edge]` on x and y.
///
/// A body pushed back onto the wall loses all of its velocity. The z axis is
/// not constrained. Returns how many bodies were clamped.
pub fn clamp_to_domain(store: &mut BodyStore, edge: f32) -> usize {
    let (positions, velocities, _) = store.kinematics_mut();
    let mut clamped = 0;

    for (pos, vel) in positions.iter_mut().zip(velocities.iter_mut()) {
        let x = pos.x.max(-edge).min(edge);
        let y = pos.y.max(-edge).min(edge);
        if x != pos.x || y != pos.y {
            pos.x = x;
            pos.y = y;
            *vel = Vec3::ZERO;
            clamped += 1;
        }
    }

    clamped
}
