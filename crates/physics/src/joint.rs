//! Spring-driven joint between two bodies.
//!
//! The joint frame is attached to `body_a` at `anchor` and oriented by
//! `axis`. With a zero target the connected body rests `rest_length` along
//! the joint's local `+Z`. Targets are clamped to the joint limits.

use glam::EulerRot;

use crate::types::{Quat, RigidBody, Vec3};
use crate::world::{JointLimits, JointTarget};

#[derive(Copy, Clone, Debug)]
pub struct DriveJoint {
    pub body_a: usize,
    pub body_b: usize,
    pub anchor: Vec3,
    pub axis: Quat,
    pub rest_length: f32,
    pub limits: JointLimits,
    pub stiffness: f32,
    pub damping: f32,
    pub target: JointTarget,
}

impl DriveJoint {
    /// Clamp a requested target into the joint limits.
    #[must_use]
    pub fn clamp_target(&self, target: JointTarget) -> JointTarget {
        let limit = self.limits.linear;
        let position = target.position.clamp(Vec3::splat(-limit), Vec3::splat(limit));

        let (y, x, z) = target.rotation.to_euler(EulerRot::YXZ);
        let max_x = self.limits.angular_x.to_radians();
        let max_y = self.limits.angular_y.to_radians();
        let rotation = Quat::from_euler(EulerRot::YXZ, y.clamp(-max_y, max_y), x.clamp(-max_x, max_x), z);
        JointTarget { position, rotation }
    }

    /// World-space position the drive pulls `body_b` towards.
    #[must_use]
    pub fn target_point(&self, a: &RigidBody) -> Vec3 {
        let local = self.target.rotation * (Vec3::new(0.0, 0.0, self.rest_length) + self.target.position);
        a.state.transform_point(self.anchor + self.axis * local)
    }
}

/// Apply the spring-damper drive as equal and opposite impulses.
///
/// `stiffness` and `damping` act on the relative acceleration, so the drive
/// behaves the same whatever the body masses are.
pub fn solve_drive_joint(joint: &DriveJoint, a: &mut RigidBody, b: &mut RigidBody, dt: f32) {
    let error = joint.target_point(a) - b.state.position;
    let relative_velocity = b.state.linear_velocity - a.state.linear_velocity;
    let delta = (error * joint.stiffness - relative_velocity * joint.damping) * dt;

    let total_mass = a.mass + b.mass;
    b.state.linear_velocity += delta * (a.mass / total_mass);
    a.state.linear_velocity -= delta * (b.mass / total_mass);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BodyState, Material};

    fn leg() -> DriveJoint {
        DriveJoint {
            body_a: 0,
            body_b: 1,
            anchor: Vec3::ZERO,
            axis: Quat::from_rotation_x(std::f32::consts::FRAC_PI_2),
            rest_length: 1.0,
            limits: JointLimits {
                linear: 0.5,
                angular_x: 30.0,
                angular_y: 30.0,
            },
            stiffness: 400.0,
            damping: 40.0,
            target: JointTarget::default(),
        }
    }

    #[test]
    fn rest_target_hangs_below_anchor() {
        let body = RigidBody::new(BodyState::at(Vec3::new(0.0, 2.0, 0.0)), 0.5, 1.0, Material::default());
        let point = leg().target_point(&body);
        assert!((point - Vec3::new(0.0, 1.0, 0.0)).length() < 1e-5, "point={point:?}");
    }

    #[test]
    fn targets_are_clamped_to_limits() {
        let joint = leg();
        let clamped = joint.clamp_target(JointTarget {
            position: Vec3::new(0.0, 0.0, 3.0),
            rotation: Quat::from_rotation_x(80f32.to_radians()),
        });
        assert!((clamped.position.z - 0.5).abs() < 1e-6);
        let (_, x, _) = clamped.rotation.to_euler(EulerRot::YXZ);
        assert!((x.to_degrees() - 30.0).abs() < 1e-3);
    }
}
