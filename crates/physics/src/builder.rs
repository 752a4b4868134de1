//! # Physics Simulation Builder
//!
//! This module provides builder functions for adding objects and constraints
//! to the physics simulation.

use crate::joint::DriveJoint;
use crate::types::{BodyId, BodyState, JointId, Material, Plane, Quat, RigidBody, StaticBox, Vec3};
use crate::world::{JointLimits, JointTarget};
use crate::PhysicsSim;

/// Parameters for [`PhysicsSim::add_drive_joint`].
#[derive(Copy, Clone, Debug)]
pub struct DriveJointDef {
    pub anchor: Vec3,
    pub axis: Quat,
    pub rest_length: f32,
    pub limits: JointLimits,
    pub stiffness: f32,
    pub damping: f32,
}

impl Default for DriveJointDef {
    fn default() -> Self {
        Self {
            anchor: Vec3::ZERO,
            axis: Quat::IDENTITY,
            rest_length: 1.0,
            limits: JointLimits {
                linear: 0.5,
                angular_x: 45.0,
                angular_y: 45.0,
            },
            stiffness: 400.0,
            damping: 40.0,
        }
    }
}

/// Builder methods for adding rigid bodies to the simulation
impl PhysicsSim {
    /// Add a sphere with default material properties
    pub fn add_sphere(&mut self, pos: Vec3, vel: Vec3, radius: f32) -> BodyId {
        self.add_sphere_with_material(pos, vel, radius, Material::default())
    }

    /// Add a sphere whose mass follows from its radius and the material density
    pub fn add_sphere_with_material(&mut self, pos: Vec3, vel: Vec3, radius: f32, material: Material) -> BodyId {
        let mass = calculate_sphere_mass(radius, material.density);
        self.add_sphere_with_mass_and_material(pos, vel, radius, mass, material)
    }

    /// Add a sphere with explicit mass and material
    pub fn add_sphere_with_mass_and_material(
        &mut self,
        pos: Vec3,
        vel: Vec3,
        radius: f32,
        mass: f32,
        material: Material,
    ) -> BodyId {
        let state = BodyState {
            linear_velocity: vel,
            ..BodyState::at(pos)
        };
        self.bodies.push(RigidBody::new(state, radius, mass.max(f32::EPSILON), material));
        self.bodies.len() - 1
    }

    /// Add an infinite plane; `normal` is normalized
    pub fn add_plane(&mut self, normal: Vec3, d: f32) -> usize {
        self.planes.push(Plane {
            normal: normal.normalize_or_zero(),
            d,
            material: Material::default(),
        });
        self.planes.len() - 1
    }

    /// Add a static axis-aligned box
    pub fn add_static_box(&mut self, center: Vec3, half_extents: Vec3) -> usize {
        self.boxes.push(StaticBox {
            center,
            half_extents: half_extents.abs(),
            material: Material::default(),
        });
        self.boxes.len() - 1
    }

    /// Link two bodies with a spring-driven joint
    pub fn add_drive_joint(&mut self, body_a: BodyId, body_b: BodyId, def: DriveJointDef) -> JointId {
        self.joints.push(DriveJoint {
            body_a,
            body_b,
            anchor: def.anchor,
            axis: def.axis,
            rest_length: def.rest_length,
            limits: def.limits,
            stiffness: def.stiffness,
            damping: def.damping,
            target: JointTarget::default(),
        });
        self.joints.len() - 1
    }

    /// Six inward-facing planes enclosing the box `center ± half_extents`
    pub fn add_enclosure(&mut self, center: Vec3, half_extents: Vec3) -> [usize; 6] {
        let mut planes = [0; 6];
        for (i, axis) in [Vec3::X, Vec3::Y, Vec3::Z].into_iter().enumerate() {
            let extent = half_extents.dot(axis);
            let c = center.dot(axis);
            // floor-side wall faces +axis, far wall faces -axis
            planes[2 * i] = self.add_plane(axis, c - extent);
            planes[2 * i + 1] = self.add_plane(-axis, -(c + extent));
        }
        planes
    }
}

/// Mass of a solid sphere
#[must_use]
pub fn calculate_sphere_mass(radius: f32, density: f32) -> f32 {
    4.0 / 3.0 * std::f32::consts::PI * radius.powi(3) * density
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enclosure_walls_face_inwards() {
        let mut sim = PhysicsSim::new();
        let walls = sim.add_enclosure(Vec3::ZERO, Vec3::splat(5.0));
        for index in walls {
            let plane = sim.planes[index];
            // the center is on the open side of every wall
            assert!(Vec3::ZERO.dot(plane.normal) - plane.d > 0.0);
        }
    }

    #[test]
    fn sphere_mass_from_density() {
        let mass = calculate_sphere_mass(1.0, 1.0);
        assert!((mass - 4.18879).abs() < 1e-4);
    }
}
