//! Sphere-box collision detection

use super::Contact;
use crate::types::{RigidBody, StaticBox, Vec3};

/// Detect collision between a sphere body and a static axis-aligned box
pub fn detect_sphere_box_collision(body: &RigidBody, box_body: &StaticBox) -> Option<Contact> {
    let center = body.state.position;
    // Find closest point on box to sphere center
    let closest = closest_point_on_box(center, box_body);

    let delta = center - closest;
    let distance_squared = delta.length_squared();

    if distance_squared < body.radius * body.radius {
        let distance = distance_squared.sqrt();

        let (normal, depth) = if distance > 0.0001 {
            (delta / distance, body.radius - distance)
        } else {
            // Sphere center is inside box, push out through the closest face
            let (normal, face_distance) = closest_face(center, box_body);
            (normal, body.radius + face_distance)
        };

        Some(Contact::new(
            center - normal * body.radius,
            normal,
            depth,
            &body.material,
            &box_body.material,
        ))
    } else {
        None
    }
}

/// Find the closest point on an axis-aligned box to a given point
pub(crate) fn closest_point_on_box(point: Vec3, box_body: &StaticBox) -> Vec3 {
    let min = box_body.center - box_body.half_extents;
    let max = box_body.center + box_body.half_extents;
    point.clamp(min, max)
}

/// Normal of the box face nearest to an interior point, and the distance to it
fn closest_face(point: Vec3, box_body: &StaticBox) -> (Vec3, f32) {
    let local = point - box_body.center;
    let distances = box_body.half_extents - local.abs();

    if distances.x < distances.y && distances.x < distances.z {
        (Vec3::new(sign(local.x), 0.0, 0.0), distances.x)
    } else if distances.y < distances.z {
        (Vec3::new(0.0, sign(local.y), 0.0), distances.y)
    } else {
        (Vec3::new(0.0, 0.0, sign(local.z)), distances.z)
    }
}

fn sign(v: f32) -> f32 {
    if v < 0.0 {
        -1.0
    } else {
        1.0
    }
}
