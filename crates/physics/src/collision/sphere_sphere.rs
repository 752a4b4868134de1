//! Sphere-sphere collision detection and response

use super::{correction_depth, Contact};
use crate::types::{RigidBody, Vec3};

/// Detect collision between two sphere bodies. The normal points from `a` to `b`.
pub fn detect_sphere_sphere_collision(a: &RigidBody, b: &RigidBody) -> Option<Contact> {
    let delta = b.state.position - a.state.position;
    let distance_squared = delta.length_squared();
    let min_distance = a.radius + b.radius;

    if distance_squared < min_distance * min_distance {
        let distance = distance_squared.sqrt();

        // Handle case where spheres are at same position
        let normal = if distance > 0.0001 {
            delta / distance
        } else {
            Vec3::Y
        };

        Some(Contact::new(
            a.state.position + normal * a.radius,
            normal,
            min_distance - distance,
            &a.material,
            &b.material,
        ))
    } else {
        None
    }
}

/// Apply impulse-based collision response between two spheres
pub fn resolve_sphere_sphere_collision(a: &mut RigidBody, b: &mut RigidBody, contact: &Contact) {
    let inv_mass_a = 1.0 / a.mass;
    let inv_mass_b = 1.0 / b.mass;
    let inv_mass_sum = inv_mass_a + inv_mass_b;

    let relative_velocity = b.state.linear_velocity - a.state.linear_velocity;
    let velocity_along_normal = relative_velocity.dot(contact.normal);

    // Don't resolve if velocities are separating
    if velocity_along_normal < 0.0 {
        let j = -(1.0 + contact.restitution) * velocity_along_normal / inv_mass_sum;
        let impulse = contact.normal * j;
        a.state.linear_velocity -= impulse * inv_mass_a;
        b.state.linear_velocity += impulse * inv_mass_b;
    }

    let correction = contact.normal * (correction_depth(contact.depth) / inv_mass_sum);
    a.state.position -= correction * inv_mass_a;
    b.state.position += correction * inv_mass_b;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BodyState, Material};

    #[test]
    fn head_on_spheres_separate() {
        let mut a = RigidBody::new(BodyState::at(Vec3::ZERO), 0.5, 1.0, Material::default());
        let mut b = RigidBody::new(BodyState::at(Vec3::new(0.9, 0.0, 0.0)), 0.5, 1.0, Material::default());
        a.state.linear_velocity = Vec3::X;
        b.state.linear_velocity = -Vec3::X;

        let contact = detect_sphere_sphere_collision(&a, &b).unwrap();
        resolve_sphere_sphere_collision(&mut a, &mut b, &contact);

        assert!(a.state.linear_velocity.x < 0.0);
        assert!(b.state.linear_velocity.x > 0.0);
    }
}
