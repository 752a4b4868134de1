//! Ray-fan distance sensor.
//!
//! A fan is one ray along the body's forward axis plus `side_rays` rays
//! spread evenly around it, each tilted `splay_degrees` away from forward.

use physics::{PhysicsWorld, Quat, Vec3};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RayFan {
    pub side_rays: usize,
    pub splay_degrees: f32,
    pub max_distance: f32,
}

impl RayFan {
    #[must_use]
    pub fn ray_count(&self) -> usize {
        self.side_rays + 1
    }

    /// Ray directions in the body's local frame, forward ray first.
    #[must_use]
    pub fn local_directions(&self) -> Vec<Vec3> {
        let splay = self.splay_degrees.to_radians();
        let (sin_s, cos_s) = splay.sin_cos();
        let mut directions = Vec::with_capacity(self.ray_count());
        directions.push(Vec3::Z);
        for k in 1..=self.side_rays {
            let a = k as f32 * std::f32::consts::TAU / self.side_rays as f32;
            let (sin_a, cos_a) = a.sin_cos();
            directions.push(Vec3::new(sin_a * sin_s, cos_a * sin_s, cos_s));
        }
        directions
    }

    /// Distance readings from `origin`, one per ray, each in `[0, max_distance]`.
    pub fn sense(&self, world: &dyn PhysicsWorld, origin: Vec3, rotation: Quat) -> Vec<f32> {
        self.local_directions()
            .into_iter()
            .map(|local| {
                world
                    .raycast(origin, rotation * local, self.max_distance)
                    .map_or(self.max_distance, |hit| hit.distance.clamp(0.0, self.max_distance))
            })
            .collect()
    }
}
