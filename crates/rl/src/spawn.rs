//! Random placement of agents and goals.
//!
//! Every sample drawn through a [`SpawnRegion`] lands inside it, including
//! the fallback of [`SpawnRegion::place_near`].

use std::f32::consts::TAU;

use fastrand::Rng;
use physics::{Quat, Vec3};
use tracing::warn;

/// Attempts made by [`SpawnRegion::place_near`] before it clamps.
pub const MAX_PLACEMENT_ATTEMPTS: usize = 64;

/// Axis-aligned box in which agents and goals are placed.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SpawnRegion {
    pub center: Vec3,
    pub size: Vec3,
}

impl SpawnRegion {
    #[must_use]
    pub const fn new(center: Vec3, size: Vec3) -> Self {
        Self { center, size }
    }

    #[must_use]
    pub fn half_extents(&self) -> Vec3 {
        self.size * 0.5
    }

    #[must_use]
    pub fn min(&self) -> Vec3 {
        self.center - self.half_extents()
    }

    #[must_use]
    pub fn max(&self) -> Vec3 {
        self.center + self.half_extents()
    }

    #[must_use]
    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min()).all() && point.cmple(self.max()).all()
    }

    #[must_use]
    pub fn clamp(&self, point: Vec3) -> Vec3 {
        point.clamp(self.min(), self.max())
    }

    /// Uniform point in the region.
    pub fn sample_point(&self, rng: &mut Rng) -> Vec3 {
        let u = Vec3::new(rng.f32(), rng.f32(), rng.f32());
        self.clamp(self.center + (u - 0.5) * self.size)
    }

    /// A point `distance` away from `anchor` in a random direction, inside
    /// the region. Gives up after [`MAX_PLACEMENT_ATTEMPTS`] misses and
    /// clamps the last candidate instead.
    pub fn place_near(&self, anchor: Vec3, distance: f32, rng: &mut Rng) -> Vec3 {
        let mut candidate = anchor;
        for _ in 0..MAX_PLACEMENT_ATTEMPTS {
            candidate = anchor + on_unit_sphere(rng) * distance;
            if self.contains(candidate) {
                return candidate;
            }
        }
        warn!(
            ?anchor,
            distance, "no placement inside the spawn region, clamping"
        );
        self.clamp(candidate)
    }
}

/// Uniform in `[lo, hi)`.
pub fn range(rng: &mut Rng, lo: f32, hi: f32) -> f32 {
    lo + rng.f32() * (hi - lo)
}

/// Uniform direction.
pub fn on_unit_sphere(rng: &mut Rng) -> Vec3 {
    let z = range(rng, -1.0, 1.0);
    let (sin_phi, cos_phi) = (rng.f32() * TAU).sin_cos();
    let r = (1.0 - z * z).max(0.0).sqrt();
    Vec3::new(r * cos_phi, r * sin_phi, z)
}

/// Uniform point in the unit ball.
pub fn inside_unit_sphere(rng: &mut Rng) -> Vec3 {
    on_unit_sphere(rng) * rng.f32().cbrt()
}

/// Uniformly distributed orientation (Shoemake's method).
pub fn random_rotation(rng: &mut Rng) -> Quat {
    let u1 = rng.f32();
    let (sin2, cos2) = (rng.f32() * TAU).sin_cos();
    let (sin3, cos3) = (rng.f32() * TAU).sin_cos();
    let a = (1.0 - u1).sqrt();
    let b = u1.sqrt();
    Quat::from_xyzw(a * sin2, a * cos2, b * sin3, b * cos3).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_stay_inside() {
        let region = SpawnRegion::new(Vec3::new(1.0, -2.0, 3.0), Vec3::new(4.0, 0.5, 10.0));
        let mut rng = Rng::with_seed(11);
        for _ in 0..10_000 {
            assert!(region.contains(region.sample_point(&mut rng)));
        }
    }

    #[test]
    fn place_near_keeps_distance_when_it_fits() {
        let region = SpawnRegion::new(Vec3::ZERO, Vec3::splat(25.0));
        let mut rng = Rng::with_seed(3);
        for _ in 0..1000 {
            let p = region.place_near(Vec3::ZERO, 5.0, &mut rng);
            assert!((p.length() - 5.0).abs() < 1e-3);
        }
    }

    #[test]
    fn place_near_falls_back_inside() {
        let region = SpawnRegion::new(Vec3::ZERO, Vec3::splat(1.0));
        let mut rng = Rng::with_seed(5);
        let p = region.place_near(Vec3::ZERO, 100.0, &mut rng);
        assert!(region.contains(p));
    }

    #[test]
    fn rotations_are_unit() {
        let mut rng = Rng::with_seed(9);
        for _ in 0..100 {
            assert!(random_rotation(&mut rng).is_normalized());
        }
    }

    #[test]
    fn unit_ball_samples() {
        let mut rng = Rng::with_seed(1);
        for _ in 0..1000 {
            assert!((on_unit_sphere(&mut rng).length() - 1.0).abs() < 1e-4);
            assert!(inside_unit_sphere(&mut rng).length() <= 1.0 + 1e-5);
        }
    }
}
