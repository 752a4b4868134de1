//! Sphere-plane collision detection and response

use super::{correction_depth, Contact};
use crate::types::{Plane, RigidBody, Vec3};

/// Detect collision between a sphere body and a static plane
pub fn detect_sphere_plane_collision(body: &RigidBody, plane: &Plane) -> Option<Contact> {
    // Signed distance from sphere center to plane
    let distance = body.state.position.dot(plane.normal) - plane.d;

    // Bodies fully behind the plane are on the closed side and ignored
    if distance < body.radius && distance > -body.radius {
        let contact_point = body.state.position - plane.normal * distance;
        let depth = body.radius - distance;

        Some(Contact::new(
            contact_point,
            plane.normal,
            depth,
            &body.material,
            &plane.material,
        ))
    } else {
        None
    }
}

/// Apply collision response against an immovable surface
pub fn resolve_static_contact(body: &mut RigidBody, contact: &Contact) {
    let velocity_along_normal = body.state.linear_velocity.dot(contact.normal);

    // Only resolve if moving into the surface
    if velocity_along_normal < 0.0 {
        let j = -(1.0 + contact.restitution) * velocity_along_normal;
        body.state.linear_velocity += contact.normal * j;
        apply_friction(body, contact, j);
    }

    body.state.position += contact.normal * correction_depth(contact.depth);
}

/// Apply friction impulse opposing the tangential velocity
fn apply_friction(body: &mut RigidBody, contact: &Contact, normal_impulse: f32) {
    let velocity = body.state.linear_velocity;
    let tangent_velocity = velocity - contact.normal * velocity.dot(contact.normal);

    let tangent_speed = tangent_velocity.length();
    if tangent_speed > 0.0001 {
        let tangent_direction: Vec3 = tangent_velocity / tangent_speed;
        let friction_impulse = contact.friction * normal_impulse.abs();

        // Clamped to not reverse motion
        body.state.linear_velocity -= tangent_direction * friction_impulse.min(tangent_speed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BodyState, Material};

    fn ground() -> Plane {
        Plane {
            normal: Vec3::Y,
            d: 0.0,
            material: Material::default(),
        }
    }

    #[test]
    fn resting_sphere_touches_ground() {
        let body = RigidBody::new(BodyState::at(Vec3::new(0.0, 0.45, 0.0)), 0.5, 1.0, Material::default());
        let contact = detect_sphere_plane_collision(&body, &ground()).unwrap();
        assert!((contact.depth - 0.05).abs() < 1e-6);
        assert_eq!(contact.normal, Vec3::Y);
    }

    #[test]
    fn falling_sphere_bounces_up() {
        let mut body = RigidBody::new(BodyState::at(Vec3::new(0.0, 0.4, 0.0)), 0.5, 1.0, Material::default());
        body.state.linear_velocity = Vec3::new(0.0, -2.0, 0.0);
        let contact = detect_sphere_plane_collision(&body, &ground()).unwrap();
        resolve_static_contact(&mut body, &contact);
        assert!(body.state.linear_velocity.y > 0.0);
        assert!(body.state.position.y > 0.4);
    }

    #[test]
    fn sphere_behind_plane_is_ignored() {
        let body = RigidBody::new(BodyState::at(Vec3::new(0.0, -3.0, 0.0)), 0.5, 1.0, Material::default());
        assert!(detect_sphere_plane_collision(&body, &ground()).is_none());
    }
}
